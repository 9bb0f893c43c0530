use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::company::Company;
use crate::filter::{Column, ColumnKind, FilterError};

/// `equity` serializes as its decimal string, e.g. `"0"` or `"0.05"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Decimal,
    pub company_handle: String,
}

/// A job with its owning company in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Decimal,
    pub company: Company,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.title.is_empty() {
            return Err(FilterError::InvalidValue {
                field: "title".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        if self.salary.is_some_and(|s| s < 0) {
            return Err(FilterError::Negative("salary"));
        }
        if self.equity.is_some_and(|e| e < Decimal::ZERO || e > Decimal::ONE) {
            return Err(FilterError::InvalidValue {
                field: "equity".to_string(),
                reason: "must be a decimal between 0 and 1".to_string(),
            });
        }
        Ok(())
    }

    /// Equity to store: defaults to zero, trailing zeros dropped.
    pub fn equity_or_default(&self) -> Decimal {
        self.equity.unwrap_or(Decimal::ZERO).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Id,
    Title,
    Salary,
    Equity,
    CompanyHandle,
}

impl Column for JobField {
    const ALL: &'static [Self] = &[
        JobField::Id,
        JobField::Title,
        JobField::Salary,
        JobField::Equity,
        JobField::CompanyHandle,
    ];

    fn name(&self) -> &'static str {
        match self {
            JobField::Id => "id",
            JobField::Title => "title",
            JobField::Salary => "salary",
            JobField::Equity => "equity",
            JobField::CompanyHandle => "companyHandle",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            JobField::Id => "id",
            JobField::Title => "title",
            JobField::Salary => "salary",
            JobField::Equity => "equity",
            JobField::CompanyHandle => "company_handle",
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            JobField::Id => ColumnKind::Count { nullable: false },
            JobField::Title | JobField::CompanyHandle => ColumnKind::Text { nullable: false },
            JobField::Salary => ColumnKind::Count { nullable: true },
            JobField::Equity => ColumnKind::Fraction,
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, JobField::Id | JobField::CompanyHandle)
    }
}

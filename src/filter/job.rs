use rust_decimal::Decimal;
use serde::Deserialize;

use super::company::bound;
use super::error::FilterError;
use super::types::{Criterion, FilterParam, Search};
use crate::database::models::JobField;

/// Raw job search input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub title_like: Option<String>,
    pub min_salary: Option<FilterParam>,
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        self.title_like.is_none() && self.min_salary.is_none() && self.has_equity.is_none()
    }

    pub fn normalize(&self) -> Result<Search<JobField>, FilterError> {
        if self.is_empty() {
            return Ok(Search::All);
        }

        // Validated the same way as the company employee bounds.
        let min_salary = bound(self.min_salary.as_ref(), "minSalary")?;

        let mut criteria = Vec::new();
        if let Some(title) = self.title_like.as_deref().filter(|s| !s.is_empty()) {
            criteria.push(Criterion::ilike(JobField::Title, title));
        }
        if let Some(min) = min_salary {
            criteria.push(Criterion::at_least(JobField::Salary, min));
        }
        if self.has_equity == Some(true) {
            criteria.push(Criterion::not_equal(JobField::Equity, Decimal::ZERO));
        }
        Ok(Search::Matching(criteria))
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::job::Job;
use crate::filter::{Column, ColumnKind, FilterError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with every job it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Input for creating a company.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    /// Matches `companies.handle VARCHAR(25)`.
    pub const MAX_HANDLE_LEN: usize = 25;

    pub fn validate(&self) -> Result<(), FilterError> {
        let slug = !self.handle.is_empty()
            && self
                .handle
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !slug {
            return Err(FilterError::InvalidValue {
                field: "handle".to_string(),
                reason: "must be a lowercase slug".to_string(),
            });
        }
        if self.handle.len() > Self::MAX_HANDLE_LEN {
            return Err(FilterError::InvalidValue {
                field: "handle".to_string(),
                reason: format!("must be at most {} characters", Self::MAX_HANDLE_LEN),
            });
        }
        if self.num_employees.is_some_and(|n| n < 0) {
            return Err(FilterError::Negative("numEmployees"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Handle,
    Name,
    Description,
    NumEmployees,
    LogoUrl,
}

impl Column for CompanyField {
    const ALL: &'static [Self] = &[
        CompanyField::Handle,
        CompanyField::Name,
        CompanyField::Description,
        CompanyField::NumEmployees,
        CompanyField::LogoUrl,
    ];

    fn name(&self) -> &'static str {
        match self {
            CompanyField::Handle => "handle",
            CompanyField::Name => "name",
            CompanyField::Description => "description",
            CompanyField::NumEmployees => "numEmployees",
            CompanyField::LogoUrl => "logoUrl",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            CompanyField::Handle => "handle",
            CompanyField::Name => "name",
            CompanyField::Description => "description",
            CompanyField::NumEmployees => "num_employees",
            CompanyField::LogoUrl => "logo_url",
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            CompanyField::Handle | CompanyField::Name | CompanyField::Description => {
                ColumnKind::Text { nullable: false }
            }
            CompanyField::NumEmployees => ColumnKind::Count { nullable: true },
            CompanyField::LogoUrl => ColumnKind::Text { nullable: true },
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, CompanyField::Handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_company(handle: &str, num_employees: Option<i32>) -> NewCompany {
        NewCompany {
            handle: handle.to_string(),
            name: "C1".to_string(),
            description: "Desc1".to_string(),
            num_employees,
            logo_url: None,
        }
    }

    #[test]
    fn field_lookup_by_api_name() {
        assert_eq!(CompanyField::from_name("numEmployees"), Some(CompanyField::NumEmployees));
        assert_eq!(CompanyField::from_name("logoUrl"), Some(CompanyField::LogoUrl));
        assert_eq!(CompanyField::from_name("logo_url"), None);
    }

    #[test]
    fn serializes_camel_case_with_jobs() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".to_string(),
                name: "C1".to_string(),
                description: "Desc1".to_string(),
                num_employees: Some(1),
                logo_url: Some("http://c1.img".to_string()),
            },
            jobs: vec![],
        };
        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "handle": "c1",
                "name": "C1",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": "http://c1.img",
                "jobs": []
            })
        );
    }

    #[test]
    fn validates_new_company() {
        assert!(new_company("c1", Some(1)).validate().is_ok());
        assert!(new_company("acme-co", None).validate().is_ok());
        assert!(new_company("", None).validate().is_err());
        assert!(new_company("Has Space", None).validate().is_err());
        assert_eq!(
            new_company("c1", Some(-1)).validate(),
            Err(FilterError::Negative("numEmployees"))
        );
    }

    #[test]
    fn rejects_handle_longer_than_column() {
        assert!(new_company(&"a".repeat(25), None).validate().is_ok());
        assert_eq!(
            new_company("abcdefghijklmnopqrstuvwxyz-0123", None).validate(),
            Err(FilterError::InvalidValue {
                field: "handle".to_string(),
                reason: "must be at most 25 characters".to_string(),
            })
        );
    }
}

use serde::Deserialize;

use super::error::FilterError;
use super::types::{Criterion, FilterParam, Search};
use crate::database::models::CompanyField;

/// Raw company search input, as received from query parameters or JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<FilterParam>,
    pub max_employees: Option<FilterParam>,
}

impl CompanyFilter {
    pub fn is_empty(&self) -> bool {
        self.name_like.is_none() && self.min_employees.is_none() && self.max_employees.is_none()
    }

    /// Validate the bounds and produce criteria in `nameLike, min, max` order.
    pub fn normalize(&self) -> Result<Search<CompanyField>, FilterError> {
        if self.is_empty() {
            return Ok(Search::All);
        }

        let min = bound(self.min_employees.as_ref(), "minEmployees")?;
        let max = bound(self.max_employees.as_ref(), "maxEmployees")?;
        if let (Some(min), Some(max)) = (min, max) {
            if max < min {
                return Err(FilterError::InvertedRange { min: "minEmployees", max: "maxEmployees" });
            }
        }

        let mut criteria = Vec::new();
        if let Some(name) = self.name_like.as_deref().filter(|s| !s.is_empty()) {
            criteria.push(Criterion::ilike(CompanyField::Name, name));
        }
        if let Some(min) = min {
            criteria.push(Criterion::at_least(CompanyField::NumEmployees, min));
        }
        if let Some(max) = max {
            criteria.push(Criterion::at_most(CompanyField::NumEmployees, max));
        }
        Ok(Search::Matching(criteria))
    }
}

/// Parses an optional non-negative integer bound.
pub(crate) fn bound(param: Option<&FilterParam>, field: &'static str) -> Result<Option<i64>, FilterError> {
    let Some(value) = param.map(|p| p.as_integer(field)).transpose()?.flatten() else {
        return Ok(None);
    };
    if value < 0 {
        return Err(FilterError::Negative(field));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{FilterOp, SqlValue};

    fn filter(name: Option<&str>, min: Option<FilterParam>, max: Option<FilterParam>) -> CompanyFilter {
        CompanyFilter {
            name_like: name.map(str::to_string),
            min_employees: min,
            max_employees: max,
        }
    }

    #[test]
    fn no_keys_means_fetch_all() {
        assert_eq!(CompanyFilter::default().normalize(), Ok(Search::All));
    }

    #[test]
    fn name_like_becomes_ilike() {
        let search = filter(Some("c1"), None, None).normalize().unwrap();
        let Search::Matching(criteria) = search else { panic!("expected criteria") };
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].field, CompanyField::Name);
        assert_eq!(criteria[0].operator, FilterOp::ILike);
        assert_eq!(criteria[0].value, SqlValue::from("c1"));
    }

    #[test]
    fn empty_name_like_is_ignored() {
        let search = filter(Some(""), None, None).normalize().unwrap();
        assert_eq!(search, Search::Matching(vec![]));
    }

    #[test]
    fn bounds_become_range_criteria() {
        let search = filter(None, Some("2".into()), Some(3.into())).normalize().unwrap();
        let Search::Matching(criteria) = search else { panic!("expected criteria") };
        assert_eq!(
            criteria,
            vec![
                Criterion::at_least(CompanyField::NumEmployees, 2_i64),
                Criterion::at_most(CompanyField::NumEmployees, 3_i64),
            ]
        );
    }

    #[test]
    fn equal_bounds_are_allowed() {
        assert!(filter(None, Some(5.into()), Some(5.into())).normalize().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = filter(None, Some(2.into()), Some(1.into())).normalize();
        assert_eq!(
            result,
            Err(FilterError::InvertedRange { min: "minEmployees", max: "maxEmployees" })
        );
    }

    #[test]
    fn non_integer_bound_is_rejected() {
        let result = filter(None, Some("aaa".into()), None).normalize();
        assert_eq!(result, Err(FilterError::NotAnInteger("minEmployees")));
        let result = filter(None, None, Some("1.5".into())).normalize();
        assert_eq!(result, Err(FilterError::NotAnInteger("maxEmployees")));
    }

    #[test]
    fn negative_bound_is_rejected() {
        let result = filter(None, Some((-1).into()), None).normalize();
        assert_eq!(result, Err(FilterError::Negative("minEmployees")));
        let result = filter(None, None, Some("-4".into())).normalize();
        assert_eq!(result, Err(FilterError::Negative("maxEmployees")));
    }

    #[test]
    fn blank_bound_counts_as_absent() {
        let search = filter(None, Some("".into()), None).normalize().unwrap();
        assert_eq!(search, Search::Matching(vec![]));
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let f: CompanyFilter = serde_json::from_value(serde_json::json!({
            "nameLike": "net",
            "minEmployees": 10,
            "maxEmployees": "20",
            "unrelated": true
        }))
        .unwrap();
        assert_eq!(f.name_like.as_deref(), Some("net"));
        assert_eq!(f.min_employees, Some(FilterParam::Int(10)));
        assert_eq!(f.max_employees, Some(FilterParam::Text("20".to_string())));
    }
}

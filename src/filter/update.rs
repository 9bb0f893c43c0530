use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_set::build_set_clause;
use super::types::{Column, SqlFragment, SqlValue};

/// Ordered set of column changes for one row.
///
/// Built from a loosely-typed JSON object: keys resolve to `C` by their API
/// name and values are coerced to the column's storage shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate<C: Column> {
    changes: Vec<(C, SqlValue)>,
}

impl<C: Column> PartialUpdate<C> {
    pub fn new(changes: Vec<(C, SqlValue)>) -> Self {
        Self { changes }
    }

    pub fn from_json(data: &Value) -> Result<Self, FilterError> {
        match data {
            Value::Object(map) => Self::from_map(map),
            _ => Err(FilterError::NotAnObject),
        }
    }

    pub fn from_map(data: &Map<String, Value>) -> Result<Self, FilterError> {
        // Read-only fields are reported before anything else is looked at.
        if let Some(field) = data
            .keys()
            .filter_map(|k| C::from_name(k))
            .find(|c| c.is_read_only())
        {
            return Err(FilterError::ReadOnlyField(field.name().to_string()));
        }

        let mut changes = Vec::with_capacity(data.len());
        for (key, value) in data {
            let field = C::from_name(key).ok_or_else(|| FilterError::UnknownField(key.clone()))?;
            changes.push((field, field.kind().coerce(field.name(), value)?));
        }
        Ok(Self { changes })
    }

    pub fn changes(&self) -> &[(C, SqlValue)] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn to_set_clause(&self) -> Result<SqlFragment, FilterError> {
        build_set_clause(&self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CompanyField, JobField};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn keeps_input_key_order() {
        let update = PartialUpdate::<CompanyField>::from_json(&json!({
            "logoUrl": null,
            "name": "C1 Renamed",
            "numEmployees": 7
        }))
        .unwrap();
        let fields: Vec<CompanyField> = update.changes().iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![CompanyField::LogoUrl, CompanyField::Name, CompanyField::NumEmployees]
        );

        let fragment = update.to_set_clause().unwrap();
        assert_eq!(fragment.clause, "\"logo_url\"=$1, \"name\"=$2, \"num_employees\"=$3");
        assert_eq!(
            fragment.values,
            vec![SqlValue::Null, SqlValue::from("C1 Renamed"), SqlValue::Int(7)]
        );
    }

    #[test]
    fn empty_object_fails_at_set_clause() {
        let update = PartialUpdate::<CompanyField>::from_json(&json!({})).unwrap();
        assert!(update.is_empty());
        assert_eq!(update.to_set_clause(), Err(FilterError::EmptyUpdate));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            PartialUpdate::<CompanyField>::from_json(&json!(["name"])),
            Err(FilterError::NotAnObject)
        );
        assert_eq!(
            PartialUpdate::<CompanyField>::from_json(&Value::Null),
            Err(FilterError::NotAnObject)
        );
    }

    #[test]
    fn job_key_fields_are_read_only() {
        assert_eq!(
            PartialUpdate::<JobField>::from_json(&json!({ "companyHandle": "c2" })),
            Err(FilterError::ReadOnlyField("companyHandle".to_string()))
        );
        assert_eq!(
            PartialUpdate::<JobField>::from_json(&json!({ "title": "t", "id": 9 })),
            Err(FilterError::ReadOnlyField("id".to_string()))
        );
    }

    #[test]
    fn company_handle_is_read_only() {
        assert_eq!(
            PartialUpdate::<CompanyField>::from_json(&json!({ "handle": "new" })),
            Err(FilterError::ReadOnlyField("handle".to_string()))
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert_eq!(
            PartialUpdate::<CompanyField>::from_json(&json!({ "num_employees": 3 })),
            Err(FilterError::UnknownField("num_employees".to_string()))
        );
    }

    #[test]
    fn values_are_coerced_to_column_types() {
        let update = PartialUpdate::<JobField>::from_json(&json!({
            "salary": null,
            "equity": "0.25"
        }))
        .unwrap();
        assert_eq!(
            update.changes(),
            &[
                (JobField::Salary, SqlValue::Null),
                (JobField::Equity, SqlValue::Decimal(Decimal::new(25, 2))),
            ]
        );
        assert!(PartialUpdate::<JobField>::from_json(&json!({ "salary": -1 })).is_err());
        assert!(PartialUpdate::<JobField>::from_json(&json!({ "title": null })).is_err());
    }
}

use super::types::{Column, Criterion, SqlFragment, SqlValue};

/// Renders criteria into an AND-joined WHERE body with positional placeholders.
pub struct FilterWhere {
    param_values: Vec<SqlValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Placeholders start at `starting_param_index + 1`.
    pub fn generate<C: Column>(criteria: &[Criterion<C>], starting_param_index: usize) -> SqlFragment {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(criteria)
    }

    /// Used by callers that still need a WHERE keyword when nothing filters.
    pub fn generate_empty() -> SqlFragment {
        SqlFragment { clause: "TRUE".to_string(), values: vec![] }
    }

    fn build<C: Column>(&mut self, criteria: &[Criterion<C>]) -> SqlFragment {
        let conditions: Vec<String> = criteria
            .iter()
            .map(|c| self.build_sql_condition(c))
            .collect();

        SqlFragment {
            clause: conditions.join(" AND "),
            values: std::mem::take(&mut self.param_values),
        }
    }

    fn build_sql_condition<C: Column>(&mut self, condition: &Criterion<C>) -> String {
        let value = if condition.operator.is_pattern() {
            condition.value.to_pattern()
        } else {
            condition.value.clone()
        };
        format!(
            "\"{}\" {} {}",
            condition.field.column(),
            condition.operator.to_sql(),
            self.param(value)
        )
    }

    fn param(&mut self, value: SqlValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// An empty criteria list yields an empty clause; the caller substitutes a tautology.
pub fn build_where_clause<C: Column>(criteria: &[Criterion<C>]) -> SqlFragment {
    FilterWhere::generate(criteria, 0)
}

/// Same as [`build_where_clause`], numbering placeholders after `offset` bound values.
pub fn build_where_clause_from<C: Column>(criteria: &[Criterion<C>], offset: usize) -> SqlFragment {
    FilterWhere::generate(criteria, offset)
}

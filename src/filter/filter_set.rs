use super::error::FilterError;
use super::types::{Column, SqlFragment, SqlValue};

/// Builds the body of an `UPDATE ... SET` from ordered `(field, value)` pairs.
///
/// Placeholders run `$1..$n` in input order. A caller binding further
/// parameters (the row key) starts at [`SqlFragment::next_param`].
pub fn build_set_clause<C: Column>(fields: &[(C, SqlValue)]) -> Result<SqlFragment, FilterError> {
    if fields.is_empty() {
        return Err(FilterError::EmptyUpdate);
    }

    let clause = fields
        .iter()
        .enumerate()
        .map(|(idx, (field, _))| format!("\"{}\"=${}", field.column(), idx + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let values = fields.iter().map(|(_, value)| value.clone()).collect();

    Ok(SqlFragment { clause, values })
}

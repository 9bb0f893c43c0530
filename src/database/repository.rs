use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgRow},
    FromRow, PgPool, Postgres,
};

use crate::database::manager::DatabaseError;
use crate::filter::{build_where_clause, Column, FilterOrder, FilterOrderInfo, FilterWhere, Search, SqlValue};

/// CRUD surface shared by the entity repositories.
#[async_trait]
pub trait Repository: Send + Sync {
    type Key: ?Sized + Send + Sync;
    type Record: Send;
    type Detail: Send;
    type NewRecord: Send;
    type Filter: Send + Sync;

    async fn create(&self, data: Self::NewRecord) -> Result<Self::Record, DatabaseError>;

    async fn find(&self, filter: &Self::Filter) -> Result<Vec<Self::Record>, DatabaseError>;

    async fn get(&self, key: &Self::Key) -> Result<Self::Detail, DatabaseError>;

    /// Apply a partial update given as a JSON object of API field names.
    async fn update(&self, key: &Self::Key, data: &Value) -> Result<Self::Record, DatabaseError>;

    async fn remove(&self, key: &Self::Key) -> Result<(), DatabaseError>;
}

/// Assemble `SELECT ... [WHERE ...] ORDER BY ...` for a normalized search.
pub(crate) fn search_sql<C: Column>(
    select: &str,
    search: Search<C>,
    order: &[FilterOrderInfo<C>],
) -> (String, Vec<SqlValue>) {
    let order_clause = FilterOrder::generate(order);
    match search {
        Search::All => (format!("{} {}", select, order_clause), vec![]),
        Search::Matching(criteria) => {
            let mut fragment = build_where_clause(&criteria);
            if fragment.is_empty() {
                fragment = FilterWhere::generate_empty();
            }
            (format!("{} WHERE {} {}", select, fragment.clause, order_clause), fragment.values)
        }
    }
}

pub(crate) async fn fetch_all_as<O>(pool: &PgPool, sql: &str, values: Vec<SqlValue>) -> Result<Vec<O>, DatabaseError>
where
    O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let started = Instant::now();
    let rows = bind_values(sqlx::query_as::<_, O>(sql), values)
        .fetch_all(pool)
        .await?;
    log_query(sql, started);
    Ok(rows)
}

pub(crate) async fn fetch_optional_as<O>(pool: &PgPool, sql: &str, values: Vec<SqlValue>) -> Result<Option<O>, DatabaseError>
where
    O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let started = Instant::now();
    let row = bind_values(sqlx::query_as::<_, O>(sql), values)
        .fetch_optional(pool)
        .await?;
    log_query(sql, started);
    Ok(row)
}

pub(crate) fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<SqlValue>,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for value in values {
        q = match value {
            // Sent as int8, which assignment-casts to the integer, numeric and text columns.
            SqlValue::Null => q.bind(None::<i64>),
            SqlValue::Bool(b) => q.bind(b),
            SqlValue::Int(i) => q.bind(i),
            SqlValue::Text(s) => q.bind(s),
            SqlValue::Decimal(d) => q.bind(d),
        };
    }
    q
}

/// Debug-log a finished statement and warn when it ran slow.
pub(crate) fn log_query(sql: &str, started: Instant) {
    let settings = &crate::config::config().database;
    let elapsed = started.elapsed();
    if settings.enable_query_logging {
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "SQL: {}", sql);
    }
    if settings.enable_slow_query_warning && elapsed.as_millis() as u64 > settings.slow_query_threshold_ms {
        tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", sql);
    }
}

/// Translate a constraint violation raised by a write into a caller error.
///
/// `by_constraint` receives the violated constraint's name and returns the
/// error to report, or `None` to leave the failure opaque.
pub(crate) fn map_write_error<F>(err: sqlx::Error, by_constraint: F) -> DatabaseError
where
    F: FnOnce(&str) -> Option<DatabaseError>,
{
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(mapped) = db_err.constraint().and_then(by_constraint) {
            return mapped;
        }
    }
    DatabaseError::Sqlx(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CompanyField, JobField};
    use crate::filter::Criterion;

    #[test]
    fn fetch_all_skips_where() {
        let (sql, values) = search_sql(
            "SELECT handle FROM companies",
            Search::<CompanyField>::All,
            &[FilterOrderInfo::asc(CompanyField::Name)],
        );
        assert_eq!(sql, "SELECT handle FROM companies ORDER BY \"name\" ASC");
        assert!(values.is_empty());
    }

    #[test]
    fn empty_criteria_use_tautology() {
        let (sql, values) = search_sql(
            "SELECT id FROM jobs",
            Search::<JobField>::Matching(vec![]),
            &[FilterOrderInfo::asc(JobField::Title)],
        );
        assert_eq!(sql, "SELECT id FROM jobs WHERE TRUE ORDER BY \"title\" ASC");
        assert!(values.is_empty());
    }

    #[test]
    fn criteria_render_where_clause() {
        let (sql, values) = search_sql(
            "SELECT id FROM jobs",
            Search::Matching(vec![Criterion::at_least(JobField::Salary, 5_i64)]),
            &[FilterOrderInfo::asc(JobField::Title)],
        );
        assert_eq!(sql, "SELECT id FROM jobs WHERE \"salary\" >= $1 ORDER BY \"title\" ASC");
        assert_eq!(values, vec![SqlValue::Int(5)]);
    }
}

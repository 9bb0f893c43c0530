use std::time::Instant;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::models::{Company, CompanyDetail, CompanyField, Job, NewCompany};
use crate::database::repository::{
    bind_values, fetch_all_as, log_query, map_write_error, search_sql, Repository,
};
use crate::filter::{CompanyFilter, FilterOrderInfo, PartialUpdate, SqlValue};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// One row of the company/jobs outer join. Job columns are NULL for a company without jobs.
#[derive(Debug, FromRow)]
struct CompanyJobRow {
    handle: String,
    name: String,
    description: String,
    num_employees: Option<i32>,
    logo_url: Option<String>,
    job_id: Option<i32>,
    job_title: Option<String>,
    job_salary: Option<i32>,
    job_equity: Option<Decimal>,
}

pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, handle: &str) -> Result<bool, DatabaseError> {
        company_exists(&self.pool, handle).await
    }
}

pub(crate) async fn company_exists(pool: &PgPool, handle: &str) -> Result<bool, DatabaseError> {
    let sql = "SELECT handle FROM companies WHERE handle = $1";
    let started = Instant::now();
    let found: Option<String> = sqlx::query_scalar(sql)
        .bind(handle)
        .fetch_optional(pool)
        .await?;
    log_query(sql, started);
    Ok(found.is_some())
}

/// Error for a violated `companies` constraint, naming the offending value.
fn company_constraint_error(constraint: &str, handle: &str, name: Option<&str>) -> Option<DatabaseError> {
    match constraint {
        "companies_pkey" => Some(DatabaseError::Duplicate(format!("company: {}", handle))),
        "companies_name_key" => Some(DatabaseError::Duplicate(match name {
            Some(name) => format!("company name: {}", name),
            None => "company name".to_string(),
        })),
        _ => None,
    }
}

/// Fold joined rows into one company carrying its jobs.
fn fold_company_rows(rows: Vec<CompanyJobRow>) -> Option<CompanyDetail> {
    let mut rows = rows.into_iter().peekable();
    let first = rows.peek()?;
    let company = Company {
        handle: first.handle.clone(),
        name: first.name.clone(),
        description: first.description.clone(),
        num_employees: first.num_employees,
        logo_url: first.logo_url.clone(),
    };

    let jobs = rows
        .filter_map(|row| {
            Some(Job {
                id: row.job_id?,
                title: row.job_title?,
                salary: row.job_salary,
                equity: row.job_equity.unwrap_or(Decimal::ZERO),
                company_handle: row.handle,
            })
        })
        .collect();

    Some(CompanyDetail { company, jobs })
}

#[async_trait]
impl Repository for CompanyRepository {
    type Key = str;
    type Record = Company;
    type Detail = CompanyDetail;
    type NewRecord = NewCompany;
    type Filter = CompanyFilter;

    async fn create(&self, data: NewCompany) -> Result<Company, DatabaseError> {
        data.validate()?;

        // Fast path for a friendly error; the unique constraint still guards concurrent inserts.
        if self.exists(&data.handle).await? {
            return Err(DatabaseError::Duplicate(format!("company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = COMPANY_COLUMNS
        );
        let started = Instant::now();
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, |c| company_constraint_error(c, &data.handle, Some(&data.name)))
            })?;
        log_query(&sql, started);

        info!("Created company {}", company.handle);
        Ok(company)
    }

    async fn find(&self, filter: &CompanyFilter) -> Result<Vec<Company>, DatabaseError> {
        let search = filter.normalize()?;
        let (sql, values) = search_sql(
            &format!("SELECT {} FROM companies", COMPANY_COLUMNS),
            search,
            &[FilterOrderInfo::asc(CompanyField::Name)],
        );
        fetch_all_as::<Company>(&self.pool, &sql, values).await
    }

    async fn get(&self, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let sql = r#"
            SELECT c.handle, c.name, c.description, c.num_employees, c.logo_url,
                   j.id AS job_id, j.title AS job_title, j.salary AS job_salary, j.equity AS job_equity
            FROM companies AS c
            LEFT JOIN jobs AS j ON j.company_handle = c.handle
            WHERE c.handle = $1
            ORDER BY j.id
        "#;
        let rows = fetch_all_as::<CompanyJobRow>(&self.pool, sql, vec![SqlValue::from(handle)]).await?;
        debug!("Company {} joined {} row(s)", handle, rows.len());

        fold_company_rows(rows).ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    async fn update(&self, handle: &str, data: &Value) -> Result<Company, DatabaseError> {
        let patch = PartialUpdate::<CompanyField>::from_json(data)?;
        let set = patch.to_set_clause()?;
        let new_name = patch.changes().iter().find_map(|(field, value)| match (field, value) {
            (CompanyField::Name, SqlValue::Text(name)) => Some(name.as_str()),
            _ => None,
        });

        let sql = format!(
            "UPDATE companies SET {} WHERE \"handle\" = ${} RETURNING {}",
            set.clause,
            set.next_param(),
            COMPANY_COLUMNS
        );
        let mut values = set.values;
        values.push(SqlValue::from(handle));

        let started = Instant::now();
        let updated = bind_values(sqlx::query_as::<_, Company>(&sql), values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, |c| company_constraint_error(c, handle, new_name)))?;
        log_query(&sql, started);

        updated.ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    async fn remove(&self, handle: &str) -> Result<(), DatabaseError> {
        let sql = "DELETE FROM companies WHERE handle = $1 RETURNING handle";
        let started = Instant::now();
        let deleted: Option<String> = sqlx::query_scalar(sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        log_query(sql, started);

        match deleted {
            Some(_) => {
                info!("Removed company {}", handle);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No company: {}", handle))),
        }
    }
}

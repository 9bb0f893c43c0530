use std::time::Instant;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::database::company::company_exists;
use crate::database::manager::DatabaseError;
use crate::database::models::{Company, Job, JobDetail, JobField, NewJob};
use crate::database::repository::{
    fetch_all_as, fetch_optional_as, log_query, map_write_error, search_sql, Repository,
};
use crate::filter::{FilterOrderInfo, JobFilter, PartialUpdate, SqlValue};

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, FromRow)]
struct JobCompanyRow {
    id: i32,
    title: String,
    salary: Option<i32>,
    equity: Decimal,
    handle: String,
    name: String,
    description: String,
    num_employees: Option<i32>,
    logo_url: Option<String>,
}

impl From<JobCompanyRow> for JobDetail {
    fn from(row: JobCompanyRow) -> Self {
        JobDetail {
            id: row.id,
            title: row.title,
            salary: row.salary,
            equity: row.equity,
            company: Company {
                handle: row.handle,
                name: row.name,
                description: row.description,
                num_employees: row.num_employees,
                logo_url: row.logo_url,
            },
        }
    }
}

pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for JobRepository {
    type Key = i32;
    type Record = Job;
    type Detail = JobDetail;
    type NewRecord = NewJob;
    type Filter = JobFilter;

    async fn create(&self, data: NewJob) -> Result<Job, DatabaseError> {
        data.validate()?;

        if !company_exists(&self.pool, &data.company_handle).await? {
            return Err(DatabaseError::InvalidInput(format!("No company: {}", data.company_handle)));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_COLUMNS
        );
        let started = Instant::now();
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity_or_default())
            .bind(&data.company_handle)
            .fetch_one(&self.pool)
            .await
            // The company may vanish between the check and the insert.
            .map_err(|e| {
                map_write_error(e, |c| {
                    (c == "jobs_company_handle_fkey")
                        .then(|| DatabaseError::InvalidInput(format!("No company: {}", data.company_handle)))
                })
            })?;
        log_query(&sql, started);

        info!("Created job {} for {}", job.id, job.company_handle);
        Ok(job)
    }

    async fn find(&self, filter: &JobFilter) -> Result<Vec<Job>, DatabaseError> {
        let search = filter.normalize()?;
        let (sql, values) = search_sql(
            &format!("SELECT {} FROM jobs", JOB_COLUMNS),
            search,
            &[FilterOrderInfo::asc(JobField::Title)],
        );
        fetch_all_as::<Job>(&self.pool, &sql, values).await
    }

    async fn get(&self, id: &i32) -> Result<JobDetail, DatabaseError> {
        let sql = r#"
            SELECT j.id, j.title, j.salary, j.equity,
                   c.handle, c.name, c.description, c.num_employees, c.logo_url
            FROM jobs AS j
            JOIN companies AS c ON c.handle = j.company_handle
            WHERE j.id = $1
        "#;
        fetch_optional_as::<JobCompanyRow>(&self.pool, sql, vec![SqlValue::from(*id)])
            .await?
            .map(JobDetail::from)
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    async fn update(&self, id: &i32, data: &Value) -> Result<Job, DatabaseError> {
        // Rejects `id` and `companyHandle` before any SQL is built.
        let patch = PartialUpdate::<JobField>::from_json(data)?;
        let set = patch.to_set_clause()?;

        let sql = format!(
            "UPDATE jobs SET {} WHERE \"id\" = ${} RETURNING {}",
            set.clause,
            set.next_param(),
            JOB_COLUMNS
        );
        let mut values = set.values;
        values.push(SqlValue::from(*id));

        fetch_optional_as::<Job>(&self.pool, &sql, values)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    async fn remove(&self, id: &i32) -> Result<(), DatabaseError> {
        let sql = "DELETE FROM jobs WHERE id = $1 RETURNING id";
        let started = Instant::now();
        let deleted: Option<i32> = sqlx::query_scalar(sql)
            .bind(*id)
            .fetch_optional(&self.pool)
            .await?;
        log_query(sql, started);

        match deleted {
            Some(_) => {
                info!("Removed job {}", id);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("No job: {}", id))),
        }
    }
}

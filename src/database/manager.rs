use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::filter::FilterError;

/// Errors raised by the data-access layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Duplicate {0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True for the caller-caused kinds (bad input, duplicates, bad filters).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::InvalidInput(_) | DatabaseError::Duplicate(_) | DatabaseError::Filter(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

/// Builds connection pools. Callers own the returned pool and pass it to
/// repositories explicitly.
pub struct DatabaseManager;

impl DatabaseManager {
    const DEFAULT_DB_NAME: &'static str = "jobly";
    const TEST_DB_NAME: &'static str = "jobly_test";

    /// Connect eagerly; fails if the database is unreachable.
    pub async fn connect(database_name: Option<&str>, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(database_name)?;
        let pool = Self::pool_options(config).connect(&connection_string).await?;
        info!("Created database pool for: {}", database_name.unwrap_or(Self::DEFAULT_DB_NAME));
        Ok(pool)
    }

    /// Create a pool that only opens connections when first used.
    pub fn connect_lazy(database_name: Option<&str>, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(database_name)?;
        let pool = Self::pool_options(config).connect_lazy(&connection_string)?;
        info!("Configured lazy database pool for: {}", database_name.unwrap_or(Self::DEFAULT_DB_NAME));
        Ok(pool)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Reads `DATABASE_URL`, optionally swapping the database in its path.
    fn build_connection_string(database_name: Option<&str>) -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        match database_name {
            Some(name) => Self::with_database(&base, name),
            None => {
                url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                Ok(base)
            }
        }
    }

    fn with_database(base: &str, database_name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_db_name(database_name) {
            return Err(DatabaseError::InvalidDatabaseName(database_name.to_string()));
        }
        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Accepts `jobly`, `jobly_test`, or `jobly_` followed by `[a-zA-Z0-9_]+`.
    fn is_valid_db_name(name: &str) -> bool {
        if name == Self::DEFAULT_DB_NAME || name == Self::TEST_DB_NAME {
            return true;
        }
        match name.strip_prefix("jobly_") {
            Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            None => false,
        }
    }
}

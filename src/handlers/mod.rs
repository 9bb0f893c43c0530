// Route table for the job board API.
//
// Handlers are thin: extract input, call the matching repository operation,
// and wrap the result in the success envelope. Errors convert through ApiError.
pub mod companies;
pub mod jobs;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::database::DatabaseManager;
use crate::middleware::DbPool;

/// All routes, with the storage pool attached.
pub fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(company_routes())
        .merge(job_routes())
        .layer(Extension(DbPool(pool)))
}

fn company_routes() -> Router {
    Router::new()
        .route("/companies", get(companies::find).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::remove),
        )
}

fn job_routes() -> Router {
    Router::new()
        .route("/jobs", get(jobs::find).post(jobs::create))
        .route(
            "/jobs/:id",
            get(jobs::get).patch(jobs::update).delete(jobs::remove),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Jobly API",
            "version": version,
            "endpoints": {
                "companies": "/companies[/:handle]",
                "jobs": "/jobs[/:id]",
                "health": "/health",
            }
        }
    }))
}

async fn health(Extension(DbPool(pool)): Extension<DbPool>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

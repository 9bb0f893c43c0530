use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Job, JobDetail, NewJob};
use crate::database::{JobRepository, Repository};
use crate::filter::JobFilter;
use crate::middleware::{ApiResponse, ApiResult, DbPool};

/// POST /jobs
pub async fn create(
    Extension(DbPool(pool)): Extension<DbPool>,
    body: Result<Json<NewJob>, JsonRejection>,
) -> ApiResult<Job> {
    let Json(data) = body?;
    let job = JobRepository::new(pool).create(data).await?;
    Ok(ApiResponse::created(job))
}

/// GET /jobs?titleLike=&minSalary=&hasEquity=
pub async fn find(
    Extension(DbPool(pool)): Extension<DbPool>,
    query: Result<Query<JobFilter>, QueryRejection>,
) -> ApiResult<Vec<Job>> {
    let Query(filter) = query?;
    let jobs = JobRepository::new(pool).find(&filter).await?;
    Ok(ApiResponse::success(jobs))
}

/// GET /jobs/:id
pub async fn get(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<JobDetail> {
    let Path(id) = path?;
    let job = JobRepository::new(pool).get(&id).await?;
    Ok(ApiResponse::success(job))
}

/// PATCH /jobs/:id
pub async fn update(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let Path(id) = path?;
    let Json(data) = body?;
    let job = JobRepository::new(pool).update(&id, &data).await?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:id
pub async fn remove(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = path?;
    JobRepository::new(pool).remove(&id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}

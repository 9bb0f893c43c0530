use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Company, CompanyDetail, NewCompany};
use crate::database::{CompanyRepository, Repository};
use crate::filter::CompanyFilter;
use crate::middleware::{ApiResponse, ApiResult, DbPool};

/// POST /companies
pub async fn create(
    Extension(DbPool(pool)): Extension<DbPool>,
    body: Result<Json<NewCompany>, JsonRejection>,
) -> ApiResult<Company> {
    let Json(data) = body?;
    let company = CompanyRepository::new(pool).create(data).await?;
    Ok(ApiResponse::created(company))
}

/// GET /companies?nameLike=&minEmployees=&maxEmployees=
pub async fn find(
    Extension(DbPool(pool)): Extension<DbPool>,
    query: Result<Query<CompanyFilter>, QueryRejection>,
) -> ApiResult<Vec<Company>> {
    let Query(filter) = query?;
    let companies = CompanyRepository::new(pool).find(&filter).await?;
    Ok(ApiResponse::success(companies))
}

/// GET /companies/:handle
pub async fn get(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<CompanyDetail> {
    let Path(handle) = path?;
    let company = CompanyRepository::new(pool).get(&handle).await?;
    Ok(ApiResponse::success(company))
}

/// PATCH /companies/:handle
pub async fn update(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Company> {
    let Path(handle) = path?;
    let Json(data) = body?;
    let company = CompanyRepository::new(pool).update(&handle, &data).await?;
    Ok(ApiResponse::success(company))
}

/// DELETE /companies/:handle
pub async fn remove(
    Extension(DbPool(pool)): Extension<DbPool>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let Path(handle) = path?;
    CompanyRepository::new(pool).remove(&handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}

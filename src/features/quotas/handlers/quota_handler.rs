use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::quotas::dtos::{
    CreateQuotaDto, DomainScopeQuery, ListQuotasQuery, QuotaResponseDto, SearchQuotasDto,
    StatQuotasDto, UpdateQuotaDto,
};
use crate::features::quotas::services::QuotaService;
use crate::shared::types::{ApiResponse, Meta};

/// Create a quota for a protocol within a domain
#[utoipa::path(
    post,
    path = "/notification/v1/quotas",
    request_body = CreateQuotaDto,
    responses(
        (status = 200, description = "Quota created", body = ApiResponse<QuotaResponseDto>),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "quotas"
)]
pub async fn create_quota(
    State(service): State<Arc<QuotaService>>,
    AppJson(dto): AppJson<CreateQuotaDto>,
) -> Result<Json<ApiResponse<QuotaResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let quota = service.create(dto).await?;
    Ok(Json(ApiResponse::success(Some(quota), None, None)))
}

/// Get a quota by id
#[utoipa::path(
    get,
    path = "/notification/v1/quota/{quota_id}",
    params(
        ("quota_id" = String, Path, description = "Quota ID"),
        DomainScopeQuery
    ),
    responses(
        (status = 200, description = "Quota found", body = ApiResponse<QuotaResponseDto>),
        (status = 404, description = "Quota not found in the domain")
    ),
    tag = "quotas"
)]
pub async fn get_quota(
    State(service): State<Arc<QuotaService>>,
    Path(quota_id): Path<String>,
    AppQuery(scope): AppQuery<DomainScopeQuery>,
) -> Result<Json<ApiResponse<QuotaResponseDto>>> {
    scope
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let quota = service.get(&quota_id, &scope.domain_id).await?;
    Ok(Json(ApiResponse::success(Some(quota), None, None)))
}

/// Replace the limit of a quota
#[utoipa::path(
    put,
    path = "/notification/v1/quota/{quota_id}",
    params(
        ("quota_id" = String, Path, description = "Quota ID")
    ),
    request_body = UpdateQuotaDto,
    responses(
        (status = 200, description = "Quota updated", body = ApiResponse<QuotaResponseDto>),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Quota not found in the domain")
    ),
    tag = "quotas"
)]
pub async fn update_quota(
    State(service): State<Arc<QuotaService>>,
    Path(quota_id): Path<String>,
    AppJson(dto): AppJson<UpdateQuotaDto>,
) -> Result<Json<ApiResponse<QuotaResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let quota = service.update(&quota_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(quota), None, None)))
}

/// Delete a quota; the domain default limit applies afterwards
#[utoipa::path(
    delete,
    path = "/notification/v1/quota/{quota_id}",
    params(
        ("quota_id" = String, Path, description = "Quota ID"),
        DomainScopeQuery
    ),
    responses(
        (status = 200, description = "Quota deleted"),
        (status = 404, description = "Quota not found in the domain")
    ),
    tag = "quotas"
)]
pub async fn delete_quota(
    State(service): State<Arc<QuotaService>>,
    Path(quota_id): Path<String>,
    AppQuery(scope): AppQuery<DomainScopeQuery>,
) -> Result<Json<ApiResponse<()>>> {
    scope
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.delete(&quota_id, &scope.domain_id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// List quotas in a domain
///
/// `meta.total` is the filtered-set size before pagination truncation.
#[utoipa::path(
    get,
    path = "/notification/v1/quotas",
    params(ListQuotasQuery),
    responses(
        (status = 200, description = "Quotas in the domain", body = ApiResponse<Vec<QuotaResponseDto>>),
        (status = 400, description = "Missing or malformed parameter")
    ),
    tag = "quotas"
)]
pub async fn list_quotas(
    State(service): State<Arc<QuotaService>>,
    AppQuery(query): AppQuery<ListQuotasQuery>,
) -> Result<Json<ApiResponse<Vec<QuotaResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (quotas, total) = service.list(query.into_params()).await?;
    Ok(Json(ApiResponse::success(
        Some(quotas),
        None,
        Some(Meta { total }),
    )))
}

/// List quotas via a search body
///
/// Equivalent to the GET list endpoint: identical filters produce identical
/// results on both access paths.
#[utoipa::path(
    post,
    path = "/notification/v1/quotas/search",
    request_body = SearchQuotasDto,
    responses(
        (status = 200, description = "Quotas in the domain", body = ApiResponse<Vec<QuotaResponseDto>>),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "quotas"
)]
pub async fn search_quotas(
    State(service): State<Arc<QuotaService>>,
    AppJson(dto): AppJson<SearchQuotasDto>,
) -> Result<Json<ApiResponse<Vec<QuotaResponseDto>>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (quotas, total) = service.list(dto.into_params()).await?;
    Ok(Json(ApiResponse::success(
        Some(quotas),
        None,
        Some(Meta { total }),
    )))
}

/// Aggregate quotas in a domain
///
/// The result shape is determined by the aggregation query, not fixed by
/// this contract.
#[utoipa::path(
    post,
    path = "/notification/v1/quotas/stat",
    request_body = StatQuotasDto,
    responses(
        (status = 200, description = "Aggregation result", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "quotas"
)]
pub async fn stat_quotas(
    State(service): State<Arc<QuotaService>>,
    AppJson(dto): AppJson<StatQuotasDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.stat(&dto.domain_id, &dto.query).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

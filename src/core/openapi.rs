use utoipa::{Modify, OpenApi};

use crate::features::quotas::{dtos as quotas_dtos, handlers as quotas_handlers};
use crate::shared::query;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Quotas
        quotas_handlers::quota_handler::create_quota,
        quotas_handlers::quota_handler::get_quota,
        quotas_handlers::quota_handler::update_quota,
        quotas_handlers::quota_handler::delete_quota,
        quotas_handlers::quota_handler::list_quotas,
        quotas_handlers::quota_handler::search_quotas,
        quotas_handlers::quota_handler::stat_quotas,
    ),
    components(
        schemas(
            // Shared
            Meta,
            query::Filter,
            query::FilterOperator,
            query::Sort,
            query::Page,
            query::SearchQuery,
            query::GroupKey,
            query::StatField,
            query::StatOperator,
            query::StatQuery,
            // Quotas
            quotas_dtos::CreateQuotaDto,
            quotas_dtos::UpdateQuotaDto,
            quotas_dtos::SearchQuotasDto,
            quotas_dtos::StatQuotasDto,
            quotas_dtos::QuotaResponseDto,
            ApiResponse<quotas_dtos::QuotaResponseDto>,
            ApiResponse<Vec<quotas_dtos::QuotaResponseDto>>,
            ApiResponse<serde_json::Value>,
        )
    ),
    tags(
        (name = "quotas", description = "Usage quotas for notification protocols"),
    ),
    info(
        title = "Herald API",
        version = "0.1.0",
        description = "Notification management API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

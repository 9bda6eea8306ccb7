use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::quotas::models::Quota;
use crate::shared::query::{Page, SearchQuery, Sort, StatQuery};
use crate::shared::validation::{DOMAIN_ID_REGEX, PROTOCOL_ID_REGEX, QUOTA_ID_REGEX};

/// Request DTO for creating a quota
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuotaDto {
    /// Protocol the quota applies to
    #[validate(regex(
        path = *PROTOCOL_ID_REGEX,
        message = "protocol_id must be in the form 'protocol-<12 hex chars>'"
    ))]
    pub protocol_id: String,

    /// Usage ceiling document; conventionally numeric `day` / `month`
    /// fields, an absent field meaning unlimited for that period
    pub limit: serde_json::Value,

    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,
}

/// Request DTO for replacing a quota's limit
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuotaDto {
    pub limit: serde_json::Value,

    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,
}

/// Tenant scope for get/delete operations
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct DomainScopeQuery {
    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,
}

/// Query params for the GET list endpoint
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct ListQuotasQuery {
    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,

    /// Filter on an exact quota id
    #[validate(regex(
        path = *QUOTA_ID_REGEX,
        message = "quota_id must be in the form 'quota-<12 hex chars>'"
    ))]
    pub quota_id: Option<String>,

    /// Filter on an exact protocol id
    #[validate(regex(
        path = *PROTOCOL_ID_REGEX,
        message = "protocol_id must be in the form 'protocol-<12 hex chars>'"
    ))]
    pub protocol_id: Option<String>,

    /// Page number (1-indexed). Omit both page params to get the full set.
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Items per page
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,

    /// Dot-path sort key (e.g. "created_at", "limit.day")
    pub sort_key: Option<String>,

    /// Sort descending (default: ascending)
    pub sort_desc: Option<bool>,
}

impl ListQuotasQuery {
    pub fn into_params(self) -> QuotaSearchParams {
        let page = if self.page.is_some() || self.page_size.is_some() {
            Some(Page {
                start: self.page,
                limit: self.page_size,
            })
        } else {
            None
        };

        let sort = self.sort_key.map(|key| Sort {
            key,
            desc: self.sort_desc.unwrap_or(false),
        });

        QuotaSearchParams {
            domain_id: self.domain_id,
            quota_id: self.quota_id,
            protocol_id: self.protocol_id,
            query: SearchQuery {
                filter: Vec::new(),
                sort,
                page,
            },
        }
    }
}

/// Request DTO for the POST search endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchQuotasDto {
    /// Generic filter/sort/page query
    pub query: Option<SearchQuery>,

    #[validate(regex(
        path = *QUOTA_ID_REGEX,
        message = "quota_id must be in the form 'quota-<12 hex chars>'"
    ))]
    pub quota_id: Option<String>,

    #[validate(regex(
        path = *PROTOCOL_ID_REGEX,
        message = "protocol_id must be in the form 'protocol-<12 hex chars>'"
    ))]
    pub protocol_id: Option<String>,

    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,
}

impl SearchQuotasDto {
    pub fn into_params(self) -> QuotaSearchParams {
        QuotaSearchParams {
            domain_id: self.domain_id,
            quota_id: self.quota_id,
            protocol_id: self.protocol_id,
            query: self.query.unwrap_or_default(),
        }
    }
}

/// Request DTO for the stat endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatQuotasDto {
    /// Aggregation query; determines the result shape
    pub query: StatQuery,

    #[validate(regex(
        path = *DOMAIN_ID_REGEX,
        message = "domain_id must be in the form 'domain-<12 hex chars>'"
    ))]
    pub domain_id: String,
}

/// Normalized search parameters shared by both list access paths
#[derive(Debug, Clone)]
pub struct QuotaSearchParams {
    pub domain_id: String,
    pub quota_id: Option<String>,
    pub protocol_id: Option<String>,
    pub query: SearchQuery,
}

/// Response DTO for a quota record
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuotaResponseDto {
    pub quota_id: String,
    pub protocol_id: String,
    pub domain_id: String,
    pub limit: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quota> for QuotaResponseDto {
    fn from(quota: Quota) -> Self {
        Self {
            quota_id: quota.quota_id,
            protocol_id: quota.protocol_id,
            domain_id: quota.domain_id,
            limit: quota.limit_doc.0,
            created_at: quota.created_at,
            updated_at: quota.updated_at,
        }
    }
}

use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::quotas::dtos::{
    CreateQuotaDto, QuotaResponseDto, QuotaSearchParams, UpdateQuotaDto,
};
use crate::features::quotas::models::Quota;
use crate::shared::constants::RESOURCE_ID_SUFFIX_LEN;
use crate::shared::query::StatQuery;

const QUOTA_COLUMNS: &str = "quota_id, protocol_id, domain_id, limit_doc, created_at, updated_at";

/// Validate a limit document before it is stored. The schema is open, but
/// the conventional period fields must be non-negative numbers when present.
fn validate_limit_doc(limit: &Value) -> Result<()> {
    let Some(doc) = limit.as_object() else {
        return Err(AppError::Validation(
            "limit must be a JSON object".to_string(),
        ));
    };

    for period in ["day", "month"] {
        if let Some(value) = doc.get(period) {
            match value.as_f64() {
                Some(n) if n >= 0.0 => {}
                _ => {
                    return Err(AppError::Validation(format!(
                        "limit.{} must be a non-negative number",
                        period
                    )))
                }
            }
        }
    }

    Ok(())
}

fn generate_quota_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("quota-{}", &hex[..RESOURCE_ID_SUFFIX_LEN])
}

/// Service for quota operations
pub struct QuotaService {
    pool: SqlitePool,
}

impl QuotaService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a quota for a protocol within a domain
    pub async fn create(&self, dto: CreateQuotaDto) -> Result<QuotaResponseDto> {
        validate_limit_doc(&dto.limit)?;

        let now = Utc::now();
        let quota = Quota {
            quota_id: generate_quota_id(),
            protocol_id: dto.protocol_id,
            domain_id: dto.domain_id,
            limit_doc: Json(dto.limit),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO quotas (quota_id, protocol_id, domain_id, limit_doc, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&quota.quota_id)
        .bind(&quota.protocol_id)
        .bind(&quota.domain_id)
        .bind(&quota.limit_doc)
        .bind(quota.created_at)
        .bind(quota.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quota: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(quota.into())
    }

    /// Get a quota by id within a domain
    pub async fn get(&self, quota_id: &str, domain_id: &str) -> Result<QuotaResponseDto> {
        let quota = sqlx::query_as::<_, Quota>(&format!(
            "SELECT {QUOTA_COLUMNS} FROM quotas WHERE quota_id = ? AND domain_id = ?"
        ))
        .bind(quota_id)
        .bind(domain_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get quota: {:?}", e);
            AppError::Database(e)
        })?;

        quota
            .map(|q| q.into())
            .ok_or_else(|| AppError::NotFound(format!("Quota '{}' not found", quota_id)))
    }

    /// Replace the limit document of a quota. `protocol_id` and `domain_id`
    /// are immutable; only the limit and the updated timestamp change.
    pub async fn update(&self, quota_id: &str, dto: UpdateQuotaDto) -> Result<QuotaResponseDto> {
        validate_limit_doc(&dto.limit)?;

        let quota = sqlx::query_as::<_, Quota>(&format!(
            r#"
            UPDATE quotas
            SET limit_doc = ?, updated_at = ?
            WHERE quota_id = ? AND domain_id = ?
            RETURNING {QUOTA_COLUMNS}
            "#
        ))
        .bind(Json(&dto.limit))
        .bind(Utc::now())
        .bind(quota_id)
        .bind(&dto.domain_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update quota: {:?}", e);
            AppError::Database(e)
        })?;

        quota
            .map(|q| q.into())
            .ok_or_else(|| AppError::NotFound(format!("Quota '{}' not found", quota_id)))
    }

    /// Delete a quota. The domain-level default limit applies afterwards.
    pub async fn delete(&self, quota_id: &str, domain_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM quotas WHERE quota_id = ? AND domain_id = ?")
            .bind(quota_id)
            .bind(domain_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete quota: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Quota '{}' not found",
                quota_id
            )));
        }

        Ok(())
    }

    /// List quotas in a domain. Fixed filters go to SQL; the generic query
    /// evaluates over the domain-scoped rows. The returned total is the
    /// filtered-set size before pagination.
    pub async fn list(&self, params: QuotaSearchParams) -> Result<(Vec<QuotaResponseDto>, i64)> {
        let rows = self
            .fetch_domain(
                &params.domain_id,
                params.quota_id.as_deref(),
                params.protocol_id.as_deref(),
            )
            .await?;

        let docs: Vec<Value> = rows.iter().map(Quota::to_document).collect();
        let (selected, total) = params.query.select(&docs);

        let quotas = selected
            .into_iter()
            .map(|i| rows[i].clone().into())
            .collect();

        Ok((quotas, total))
    }

    /// Aggregate quotas in a domain according to a caller-supplied query
    pub async fn stat(&self, domain_id: &str, query: &StatQuery) -> Result<Value> {
        let rows = self.fetch_domain(domain_id, None, None).await?;
        let docs: Vec<Value> = rows.iter().map(Quota::to_document).collect();
        query.execute(&docs)
    }

    async fn fetch_domain(
        &self,
        domain_id: &str,
        quota_id: Option<&str>,
        protocol_id: Option<&str>,
    ) -> Result<Vec<Quota>> {
        let mut sql = format!("SELECT {QUOTA_COLUMNS} FROM quotas WHERE domain_id = ?");
        if quota_id.is_some() {
            sql.push_str(" AND quota_id = ?");
        }
        if protocol_id.is_some() {
            sql.push_str(" AND protocol_id = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, quota_id DESC");

        let mut query = sqlx::query_as::<_, Quota>(&sql).bind(domain_id);
        if let Some(quota_id) = quota_id {
            query = query.bind(quota_id);
        }
        if let Some(protocol_id) = protocol_id {
            query = query.bind(protocol_id);
        }

        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to list quotas: {:?}", e);
            AppError::Database(e)
        })
    }
}

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::types::Json;

/// Quota record stored in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Quota {
    pub quota_id: String,
    pub protocol_id: String,
    pub domain_id: String,
    pub limit_doc: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quota {
    /// Serialized form used by the generic query/stat engine. Timestamps are
    /// RFC 3339 strings so they order correctly under string comparison.
    pub fn to_document(&self) -> Value {
        json!({
            "quota_id": self.quota_id,
            "protocol_id": self.protocol_id,
            "domain_id": self.domain_id,
            "limit": self.limit_doc.0,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

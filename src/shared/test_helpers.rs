#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum::Router;

#[cfg(test)]
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// In-memory database for tests. A single connection keeps every query on
/// the same in-memory instance.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

#[cfg(test)]
pub fn quota_router(pool: SqlitePool) -> Router {
    use crate::features::quotas::{routes, QuotaService};

    routes::routes(Arc::new(QuotaService::new(pool)))
}

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::quotas::{handlers, services::QuotaService};

pub fn routes(service: Arc<QuotaService>) -> Router {
    Router::new()
        .route(
            "/notification/v1/quotas",
            post(handlers::create_quota).get(handlers::list_quotas),
        )
        .route(
            "/notification/v1/quotas/search",
            post(handlers::search_quotas),
        )
        .route("/notification/v1/quotas/stat", post(handlers::stat_quotas))
        .route(
            "/notification/v1/quota/{quota_id}",
            get(handlers::get_quota)
                .put(handlers::update_quota)
                .delete(handlers::delete_quota),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::{create_test_pool, quota_router};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    const DOMAIN: &str = "domain-123456789012";
    const OTHER_DOMAIN: &str = "domain-210987654321";
    const PROTOCOL_A: &str = "protocol-aaaaaaaaaaaa";
    const PROTOCOL_B: &str = "protocol-bbbbbbbbbbbb";

    async fn test_server() -> TestServer {
        TestServer::new(quota_router(create_test_pool().await)).unwrap()
    }

    async fn create_quota(
        server: &TestServer,
        protocol_id: &str,
        domain_id: &str,
        limit: Value,
    ) -> Value {
        let response = server
            .post("/notification/v1/quotas")
            .json(&json!({
                "protocol_id": protocol_id,
                "limit": limit,
                "domain_id": domain_id,
            }))
            .await;
        response.assert_status(StatusCode::OK);
        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_create_quota_echoes_input() {
        let server = test_server().await;

        let quota = create_quota(
            &server,
            PROTOCOL_A,
            DOMAIN,
            json!({"day": 5.0, "month": 7.0}),
        )
        .await;

        assert_eq!(quota["protocol_id"], json!(PROTOCOL_A));
        assert_eq!(quota["domain_id"], json!(DOMAIN));
        assert_eq!(quota["limit"], json!({"day": 5.0, "month": 7.0}));
        let quota_id = quota["quota_id"].as_str().unwrap();
        assert!(quota_id.starts_with("quota-"));
        assert!(!quota_id["quota-".len()..].is_empty());
    }

    #[tokio::test]
    async fn test_create_quota_without_protocol_id_is_rejected() {
        let server = test_server().await;

        let response = server
            .post("/notification/v1/quotas")
            .json(&json!({
                "limit": {"day": 5.0},
                "domain_id": DOMAIN,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_create_quota_with_malformed_ids_is_rejected() {
        let server = test_server().await;

        let response = server
            .post("/notification/v1/quotas")
            .json(&json!({
                "protocol_id": "not-a-protocol",
                "limit": {"day": 5.0},
                "domain_id": DOMAIN,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/notification/v1/quotas")
            .json(&json!({
                "protocol_id": PROTOCOL_A,
                "limit": {"day": 5.0},
                "domain_id": "domain-XYZ",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_quota_roundtrip() {
        let server = test_server().await;

        let created = create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        let quota_id = created["quota_id"].as_str().unwrap();

        let response = server
            .get(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", DOMAIN)
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["data"], created);
    }

    #[tokio::test]
    async fn test_get_quota_requires_domain_scope() {
        let server = test_server().await;

        let created = create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        let quota_id = created["quota_id"].as_str().unwrap();

        // Missing domain_id
        let response = server
            .get(&format!("/notification/v1/quota/{}", quota_id))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Foreign domain: the quota is invisible
        let response = server
            .get(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", OTHER_DOMAIN)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_quota_replaces_limit() {
        let server = test_server().await;

        let created = create_quota(
            &server,
            PROTOCOL_A,
            DOMAIN,
            json!({"day": 5.0, "month": 7.0}),
        )
        .await;
        let quota_id = created["quota_id"].as_str().unwrap();

        let response = server
            .put(&format!("/notification/v1/quota/{}", quota_id))
            .json(&json!({
                "limit": {"day": 10.0, "month": 15.0},
                "domain_id": DOMAIN,
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let updated = response.json::<Value>()["data"].clone();
        assert_eq!(updated["quota_id"], created["quota_id"]);
        assert_eq!(updated["protocol_id"], created["protocol_id"]);
        assert_eq!(updated["domain_id"], created["domain_id"]);
        assert_eq!(updated["limit"], json!({"day": 10.0, "month": 15.0}));

        let response = server
            .get(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", DOMAIN)
            .await;
        assert_eq!(
            response.json::<Value>()["data"]["limit"],
            json!({"day": 10.0, "month": 15.0})
        );
    }

    #[tokio::test]
    async fn test_update_unknown_quota_is_not_found() {
        let server = test_server().await;

        let response = server
            .put("/notification/v1/quota/quota-000000000000")
            .json(&json!({
                "limit": {"day": 1.0},
                "domain_id": DOMAIN,
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let server = test_server().await;

        let created = create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        let quota_id = created["quota_id"].as_str().unwrap();

        let response = server
            .delete(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", DOMAIN)
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", DOMAIN)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Delete on an absent quota reports NotFound
        let response = server
            .delete(&format!("/notification/v1/quota/{}", quota_id))
            .add_query_param("domain_id", DOMAIN)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_quotas_returns_domain_set_with_total() {
        let server = test_server().await;

        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        create_quota(&server, PROTOCOL_B, DOMAIN, json!({"month": 30.0})).await;
        create_quota(&server, PROTOCOL_A, OTHER_DOMAIN, json!({"day": 1.0})).await;

        let response = server
            .get("/notification/v1/quotas")
            .add_query_param("domain_id", DOMAIN)
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        let quotas = body["data"].as_array().unwrap();
        assert_eq!(body["meta"]["total"], json!(2));
        assert_eq!(quotas.len(), 2);
        assert!(quotas.iter().all(|q| q["domain_id"] == json!(DOMAIN)));
    }

    #[tokio::test]
    async fn test_list_quotas_pagination_params() {
        let server = test_server().await;

        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        create_quota(&server, PROTOCOL_B, DOMAIN, json!({"day": 10.0})).await;

        let response = server
            .get("/notification/v1/quotas")
            .add_query_param("domain_id", DOMAIN)
            .add_query_param("page", "1")
            .add_query_param("page_size", "1")
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["total"], json!(2));

        // Sorting by a dot-path key inside the limit document
        let response = server
            .get("/notification/v1/quotas")
            .add_query_param("domain_id", DOMAIN)
            .add_query_param("sort_key", "limit.day")
            .add_query_param("sort_desc", "true")
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        let quotas = body["data"].as_array().unwrap();
        assert_eq!(quotas[0]["limit"]["day"], json!(10.0));
        assert_eq!(quotas[1]["limit"]["day"], json!(5.0));
    }

    #[tokio::test]
    async fn test_list_and_search_agree_for_identical_filters() {
        let server = test_server().await;

        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 10.0})).await;
        create_quota(&server, PROTOCOL_B, DOMAIN, json!({"month": 30.0})).await;

        let fetched = server
            .get("/notification/v1/quotas")
            .add_query_param("domain_id", DOMAIN)
            .add_query_param("protocol_id", PROTOCOL_A)
            .await;
        fetched.assert_status(StatusCode::OK);

        let searched = server
            .post("/notification/v1/quotas/search")
            .json(&json!({
                "protocol_id": PROTOCOL_A,
                "domain_id": DOMAIN,
            }))
            .await;
        searched.assert_status(StatusCode::OK);

        let fetched = fetched.json::<Value>();
        let searched = searched.json::<Value>();
        assert_eq!(fetched["data"], searched["data"]);
        assert_eq!(fetched["meta"], searched["meta"]);
        assert_eq!(fetched["meta"]["total"], json!(2));
    }

    #[tokio::test]
    async fn test_search_with_generic_query() {
        let server = test_server().await;

        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 10.0})).await;
        create_quota(&server, PROTOCOL_B, DOMAIN, json!({"day": 20.0})).await;

        let response = server
            .post("/notification/v1/quotas/search")
            .json(&json!({
                "domain_id": DOMAIN,
                "query": {
                    "filter": [
                        {"key": "limit.day", "value": 5.0, "operator": "gt"}
                    ],
                    "sort": {"key": "limit.day", "desc": true},
                    "page": {"start": 1, "limit": 1}
                }
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        let quotas = body["data"].as_array().unwrap();
        // Two match the filter; the page keeps only the largest.
        assert_eq!(body["meta"]["total"], json!(2));
        assert_eq!(quotas.len(), 1);
        assert_eq!(quotas[0]["limit"]["day"], json!(20.0));
    }

    #[tokio::test]
    async fn test_stat_quotas_group_count() {
        let server = test_server().await;

        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 5.0})).await;
        create_quota(&server, PROTOCOL_A, DOMAIN, json!({"day": 10.0})).await;
        create_quota(&server, PROTOCOL_B, DOMAIN, json!({"day": 1.0})).await;

        let response = server
            .post("/notification/v1/quotas/stat")
            .json(&json!({
                "domain_id": DOMAIN,
                "query": {
                    "group_by": [{"key": "protocol_id", "name": "protocol"}],
                    "fields": [
                        {"name": "quota_count", "operator": "count"},
                        {"key": "limit.day", "name": "day_total", "operator": "sum"}
                    ]
                }
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        let rows = body["data"]["results"].as_array().unwrap();
        assert_eq!(rows.len(), 2);

        let row_a = rows
            .iter()
            .find(|r| r["protocol"] == json!(PROTOCOL_A))
            .unwrap();
        assert_eq!(row_a["quota_count"], json!(2));
        assert_eq!(row_a["day_total"], json!(15.0));
    }

    #[tokio::test]
    async fn test_stat_quotas_requires_query() {
        let server = test_server().await;

        let response = server
            .post("/notification/v1/quotas/stat")
            .json(&json!({"domain_id": DOMAIN}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

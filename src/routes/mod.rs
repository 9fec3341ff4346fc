//! Router assembly for the bookmark backend.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Full backend: common routes at the root, resources under `/api`.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes())
        .nest("/api", entity_routes(state))
        .fallback(common::not_found)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(body_limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        app(AppState::new(MemoryStore::new()), 1024)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_then_list_categories() {
        let app = router();
        let resp = app
            .clone()
            .oneshot(request("POST", "/api/categories", Some(json!({"name": "Docs"}))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(json_body(resp).await, json!({"id": 1}));

        let resp = app
            .oneshot(request("GET", "/api/categories?page=0&pageSize=500", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            json!({"items": [{"id": 1, "name": "Docs"}], "total": 1, "page": 1, "pageSize": 100})
        );
    }

    #[tokio::test]
    async fn validation_errors_use_envelope() {
        let resp = router()
            .oneshot(request("POST", "/api/categories", Some(json!({"name": " "}))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(resp).await,
            json!({"error": {"code": "validation_error", "message": "name is required"}})
        );
    }

    #[tokio::test]
    async fn in_use_category_delete_is_conflict() {
        let app = router();
        app.clone()
            .oneshot(request("POST", "/api/categories", Some(json!({"name": "Docs"}))))
            .await
            .unwrap();
        let resp = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/sites",
                Some(json!({"name": "Rust", "url": "https://rust-lang.org", "categoryId": 1})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.oneshot(request("DELETE", "/api/categories/1", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(resp).await["error"]["code"], "conflict");
    }

    #[tokio::test]
    async fn update_and_read_site() {
        let app = router();
        app.clone()
            .oneshot(request("POST", "/api/categories", Some(json!({"name": "Docs"}))))
            .await
            .unwrap();
        app.clone()
            .oneshot(request(
                "POST",
                "/api/sites",
                Some(json!({"name": "Rust", "url": "https://rust-lang.org", "categoryId": 1})),
            ))
            .await
            .unwrap();
        let resp = app
            .clone()
            .oneshot(request(
                "PUT",
                "/api/sites/1",
                Some(json!({"name": "Rust book", "url": "https://doc.rust-lang.org/book", "categoryId": 1})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = app.oneshot(request("GET", "/api/sites/1", None)).await.unwrap();
        assert_eq!(
            json_body(resp).await,
            json!({"id": 1, "name": "Rust book", "url": "https://doc.rust-lang.org/book", "categoryId": 1, "categoryName": "Docs"})
        );
    }

    #[tokio::test]
    async fn unknown_resources_and_bad_ids() {
        let app = router();
        let resp = app.clone().oneshot(request("GET", "/api/tags", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = app.clone().oneshot(request("DELETE", "/api/sites/abc", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = app.clone().oneshot(request("GET", "/nowhere/at/all", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = app.oneshot(request("GET", "/health", None)).await.unwrap();
        assert_eq!(json_body(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let big = "x".repeat(4096);
        let resp = router()
            .oneshot(request("POST", "/api/categories", Some(json!({"name": big}))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(resp).await["error"]["code"], "payload_too_large");
    }

    #[tokio::test]
    async fn unreadable_bodies_use_envelope() {
        let app = router();
        let broken = Request::builder()
            .method("POST")
            .uri("/api/categories")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let resp = app.clone().oneshot(broken).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "bad_request");
        assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));

        let untyped = Request::builder()
            .method("PUT")
            .uri("/api/categories/1")
            .body(Body::from("{}"))
            .unwrap();
        let resp = app.clone().oneshot(untyped).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(resp).await["error"]["code"], "unsupported_media_type");

        let resp = app
            .oneshot(request("POST", "/api/categories", Some(json!(["not", "an", "object"]))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"]["message"], "body must be a JSON object");
    }
}

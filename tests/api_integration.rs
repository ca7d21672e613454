//! HTTP API integration tests
//!
//! Drives the router in-process with tower::ServiceExt::oneshot against the
//! in-memory object store. No network I/O.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use file_exchange_backend::storage::{MemoryStore, ObjectStore};
use file_exchange_backend::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "----file-exchange-test-boundary";

async fn app_with_limit(max_upload_size: usize) -> Router {
    let store = Arc::new(MemoryStore::new("file-exchange-service"));
    store.ensure_bucket().await.unwrap();
    create_router(Arc::new(AppState::new(store)), max_upload_size)
}

async fn test_app() -> Router {
    app_with_limit(10 * 1024 * 1024).await
}

fn share_request(api_key: &str, file_id: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/files/{}/share", file_id))
        .header("X-API-Key", api_key)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(api_key: &str, filename: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header("X-API-Key", api_key)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("file", filename, data)))
        .unwrap()
}

fn request(method: &str, uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-Key", api_key)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn upload(app: &Router, api_key: &str, filename: &str, data: &[u8]) -> Value {
    let (status, json) = send_json(app, upload_request(api_key, filename, data)).await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

#[tokio::test]
async fn test_upload_then_list_and_info() {
    let app = test_app().await;

    let created = upload(&app, "tenant1", "report.pdf", &[1u8; 1024]).await;
    assert_eq!(created["id"], "report.pdf");
    assert_eq!(created["filename"], "report.pdf");
    assert_eq!(created["size"], 1024);
    assert!(created["createdAt"].is_string());

    let (status, list) = send_json(&app, request("GET", "/api/v1/files", "tenant1")).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "report.pdf");
    assert_eq!(list[0]["filename"], "files/tenant1/report.pdf");
    assert_eq!(list[0]["size"], 1024);

    let (status, info) =
        send_json(&app, request("GET", "/api/v1/files/report.pdf", "tenant1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["id"], "report.pdf");
    assert_eq!(info["size"], 1024);
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let app = test_app().await;
    upload(&app, "tenant1", "report.pdf", b"pdf").await;

    let (status, body) =
        send_json(&app, request("GET", "/api/v1/files/missing.pdf", "tenant1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "file not found");
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(&app, upload_request("tenant1", "empty.txt", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send_json(&app, request("GET", "/api/v1/files", "tenant1")).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_without_file_part_is_rejected() {
    let app = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header("X-API-Key", "tenant1")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("attachment", "a.txt", b"abc")))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_api_key_is_400() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/api/v1/files")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("X-API-Key"));
}

#[tokio::test]
async fn test_tenants_do_not_see_each_other() {
    let app = test_app().await;
    upload(&app, "alice", "a.txt", b"alice data").await;
    upload(&app, "bob", "b.txt", b"bob").await;

    let (_, list) = send_json(&app, request("GET", "/api/v1/files", "bob")).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b.txt"]);

    let (status, _) = send(&app, request("GET", "/api/v1/files/a.txt", "bob")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reupload_overwrites_by_name() {
    let app = test_app().await;
    upload(&app, "t", "a.txt", b"first content").await;
    upload(&app, "t", "a.txt", b"second").await;

    let (_, list) = send_json(&app, request("GET", "/api/v1/files", "t")).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["size"], 6);
}

#[tokio::test]
async fn test_delete_twice_is_204() {
    let app = test_app().await;
    upload(&app, "t", "gone.txt", b"bye").await;

    for _ in 0..2 {
        let (status, body) = send(&app, request("DELETE", "/api/v1/files/gone.txt", "t")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    let (status, _) = send(&app, request("GET", "/api/v1/files/gone.txt", "t")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_defaults_to_one_hour() {
    let app = test_app().await;
    upload(&app, "t", "a.txt", b"share me").await;

    let (status, body) = send_json(&app, request("POST", "/api/v1/files/a.txt/share", "t")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiresIn"], 3600);
    assert!(body["url"].as_str().unwrap().contains("files/t/a.txt"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/files/a.txt/share")
        .header("X-API-Key", "t")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"expiresIn": null}"#))
        .unwrap();
    let (_, body) = send_json(&app, req).await;
    assert_eq!(body["expiresIn"], 3600);
}

#[tokio::test]
async fn test_share_uses_requested_expiry() {
    let app = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/files/a.txt/share")
        .header("X-API-Key", "t")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"expiresIn": 120}"#))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiresIn"], 120);
    assert!(body["url"].as_str().unwrap().ends_with("expires_in=120"));
}

#[tokio::test]
async fn test_share_rejects_malformed_body() {
    let app = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/files/a.txt/share")
        .header("X-API-Key", "t")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_sums_listing() {
    let app = test_app().await;

    let (status, empty) = send_json(&app, request("GET", "/api/v1/stats", "t")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["filesCount"], 0);
    assert_eq!(empty["totalSize"], 0);

    upload(&app, "t", "a.bin", &[0u8; 100]).await;
    upload(&app, "t", "b.bin", &[0u8; 23]).await;
    upload(&app, "other", "c.bin", &[0u8; 999]).await;

    let (_, stats) = send_json(&app, request("GET", "/api/v1/stats", "t")).await;
    assert_eq!(stats["filesCount"], 2);
    assert_eq!(stats["totalSize"], 123);
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["buildTime"].is_string());
}

#[tokio::test]
async fn test_upload_over_body_limit_is_413() {
    let app = app_with_limit(256).await;
    let (status, body) = send_json(&app, upload_request("t", "big.bin", &[7u8; 1024])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, list) = send_json(&app, request("GET", "/api/v1/files", "t")).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_share_out_of_range_expiry_is_500() {
    let app = test_app().await;
    upload(&app, "t", "a.txt", b"share me").await;

    let (status, body) = send_json(&app, share_request("t", "a.txt", r#"{"expiresIn": -5}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");

    let (status, _) = send(&app, share_request("t", "a.txt", r#"{"expiresIn": 999999999}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_before_bucket_exists_is_500() {
    let store = Arc::new(MemoryStore::new("file-exchange-service"));
    let app = create_router(Arc::new(AppState::new(store)), 1024);

    let (status, _) = send(&app, request("GET", "/api/v1/files", "t")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = send(&app, request("GET", "/api/v1/stats", "t")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_slash_in_api_key_is_its_own_tenant() {
    let app = test_app().await;
    upload(&app, "alice", "a.txt", b"alice data").await;
    upload(&app, "alice/sub", "b.txt", b"sub").await;

    let (_, list) = send_json(&app, request("GET", "/api/v1/files", "alice")).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a.txt"]);

    let (_, stats) = send_json(&app, request("GET", "/api/v1/stats", "alice")).await;
    assert_eq!(stats["filesCount"], 1);
    assert_eq!(stats["totalSize"], 10);
}

//! API root, trailing-slash redirects, fallback and request ids.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use library::Config;
use serde_json::json;

use common::{app, app_with, call, get, send};

#[tokio::test]
async fn test_api_root_lists_resources() {
    let response = get(&app(), "/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"books": "http://testserver/books/"}));
}

#[tokio::test]
async fn test_missing_trailing_slash_redirects() {
    let app = app();

    let response = get(&app, "/books").await;
    assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.header(header::LOCATION.as_str()), Some("/books/"));

    let response = get(&app, "/books/7?fields=title").await;
    assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION.as_str()),
        Some("/books/7/?fields=title")
    );

    let response = call(&app, Method::POST, "/books", Some(json!({}))).await;
    assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);

    let response = get(&app, "/docs").await;
    assert_eq!(response.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.header(header::LOCATION.as_str()), Some("/docs/"));
}

#[tokio::test]
async fn test_redirects_can_be_disabled() {
    let mut config = Config::default();
    config.server.append_slash = false;
    let app = app_with(config);

    assert_eq!(get(&app, "/books").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/books/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = get(&app(), "/authors/").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.json(),
        json!({"code": "NOT_FOUND", "message": "Not found."})
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/books/")
        .header("x-request-id", "req-books-list")
        .body(Body::empty())
        .unwrap();

    let response = send(&app(), request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-request-id"), Some("req-books-list"));
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() {
    let app = app();

    for uri in ["/books/", "/books/99/", "/nowhere"] {
        let response = get(&app, uri).await;
        let id = response.header("x-request-id").expect("request id");
        assert!(!id.is_empty(), "{uri}");
    }
}

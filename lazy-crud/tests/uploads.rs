//! Integration tests for the upload action and public file serving

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, body_text, setup, setup_with};
use lazy_crud::config::LazyConfig;

const BOUNDARY: &str = "lazy-test-boundary";

fn multipart(field: &str, filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/users/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_is_stored_and_served() {
    let app = setup().await;

    let response = app.send(multipart("file", "Hello.TXT", "hello world")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let url = body_json(response).await.as_str().unwrap().to_string();
    assert!(url.starts_with("/storage/"), "{url}");
    assert!(url.ends_with(".txt"), "{url}");

    let stored = app.uploads.path().join("public").join(url.trim_start_matches("/storage/"));
    assert!(stored.is_file());

    let response = app
        .send(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "hello world");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup().await;

    let response = app.send(multipart("avatar", "a.txt", "hello")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_upload_over_limit() {
    let mut config = LazyConfig::default();
    config.uploads.max_bytes = 4;
    let app = setup_with(config).await;

    let response = app.send(multipart("file", "a.txt", "hello world")).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(std::fs::read_dir(app.uploads.path().join("public")).is_err());
}

//! Integration tests for the CRUD actions

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, body_text, setup, setup_with};
use lazy_crud::config::{LazyConfig, ResponseMode};
use serde_json::json;

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_show() {
    let app = setup().await;

    let (status, body) = app.get_json("/users/1").await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Ann");

    let (status, html) = app.get_html("/users/1").await;
    assert_eq!(status, 200);
    assert_eq!(html, "<h1>Ann</h1>");
}

#[tokio::test]
async fn test_show_missing_rows() {
    let app = setup().await;
    // trashed
    assert_eq!(app.get_json("/users/4").await.0, 404);
    assert_eq!(app.get_json("/users/99").await.0, 404);
    assert_eq!(app.get_json("/users/abc").await.0, 404);
}

#[tokio::test]
async fn test_create_form() {
    let app = setup().await;

    let (status, body) = app.get_json("/users/create").await;
    assert_eq!(status, 200);
    assert_eq!(body["fields"], json!(["name", "email", "age"]));

    let (status, html) = app.get_html("/users/create").await;
    assert_eq!(status, 200);
    assert_eq!(html, "<form action=\"/users\"><input name=\"name\" value=\"\"></form>");
}

#[tokio::test]
async fn test_store_json() {
    let app = setup().await;

    let (status, body) = app
        .send_json(
            "POST",
            "/users",
            json!({"name": "Eve", "email": "eve@example.com", "age": 22}),
        )
        .await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["name"], "Eve");
    assert_eq!(body["age"], 22);
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());

    let id = body["id"].as_i64().unwrap();
    let (status, body) = app.get_json(&format!("/users/{id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["email"], "eve@example.com");
}

#[tokio::test]
async fn test_store_ignores_managed_columns() {
    let app = setup().await;
    let (status, body) = app
        .send_json(
            "POST",
            "/users",
            json!({"name": "Eve", "id": 1, "deleted_at": "2020-01-01 00:00:00"}),
        )
        .await;
    assert_eq!(status, 201);
    assert_ne!(body["id"], 1);
    assert!(body["deleted_at"].is_null());
}

#[tokio::test]
async fn test_store_validation_json() {
    let app = setup().await;

    let (status, body) = app
        .send_json("POST", "/users", json!({"name": "X", "email": "nope"}))
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["errors"]["name"], json!(["name is too short"]));
    assert_eq!(body["errors"]["email"], json!(["email is invalid"]));

    assert_eq!(app.names("/users").await.len(), 3);
}

#[tokio::test]
async fn test_store_malformed_body() {
    let app = setup().await;
    let (status, _) = app.send_json("POST", "/users", json!({"email": "a@b.c"})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_store_form_redirects_with_flash() {
    let app = setup().await;

    let response = app.send(form("POST", "/users", "name=Eve&_token=abc")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("lazy_flash=saved"));

    let response = app
        .send(
            Request::builder()
                .uri("/users")
                .header(header::COOKIE, "lazy_flash=saved")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));
    let html = body_text(response).await;
    assert!(html.starts_with("<p class=\"flash\">Saved successfully.</p>"), "{html}");
    assert!(html.contains("<li>Eve</li>"));
}

#[tokio::test]
async fn test_store_form_validation_rerenders_create() {
    let app = setup().await;

    let response = app.send(form("POST", "/users", "name=X")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("<span class=\"error\">name is too short</span>"), "{html}");
    assert!(html.contains("value=\"X\""), "{html}");
}

#[tokio::test]
async fn test_htmx_requests_get_hx_redirect() {
    let app = setup().await;

    let mut request = form("POST", "/users", "name=Eve");
    request
        .headers_mut()
        .insert("hx-request", "true".parse().unwrap());
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-redirect"], "/users");
}

#[tokio::test]
async fn test_edit() {
    let app = setup().await;

    let (status, html) = app.get_html("/users/1/edit").await;
    assert_eq!(status, 200);
    assert_eq!(html, "<h1>Edit Ann</h1>");

    assert_eq!(app.get_html("/users/4/edit").await.0, 404);
}

#[tokio::test]
async fn test_update_json() {
    let app = setup().await;

    let (status, body) = app.send_json("PUT", "/users/1", json!({"name": "Annie"})).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["name"], "Annie");
    assert_eq!(body["age"], 31);
    assert!(body["updated_at"].is_string());
    assert!(body["created_at"].is_null());

    let (status, body) = app
        .send_json("PATCH", "/users/2", json!({"name": "Bobby", "age": 18}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["age"], 18);
}

#[tokio::test]
async fn test_update_missing_or_invalid() {
    let app = setup().await;

    let (status, _) = app.send_json("PUT", "/users/4", json!({"name": "Deedee"})).await;
    assert_eq!(status, 404);

    let (status, body) = app.send_json("PUT", "/users/1", json!({"name": "A"})).await;
    assert_eq!(status, 422);
    assert_eq!(body["errors"]["name"], json!(["name is too short"]));
}

#[tokio::test]
async fn test_update_form() {
    let app = setup().await;

    let response = app.send(form("POST", "/users/1", "name=Annie&_method=PUT")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("lazy_flash=updated"));
    assert_eq!(app.get_json("/users/1").await.1["name"], "Annie");

    let response = app.send(form("POST", "/users/1", "name=A")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Edit Annie</h1>"), "{html}");
    assert!(html.contains("name is too short"), "{html}");
}

#[tokio::test]
async fn test_destroy_and_restore() {
    let app = setup().await;

    let (status, body) = app.send_json("DELETE", "/users/1", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Deleted successfully.");
    assert_eq!(app.get_json("/users/1").await.0, 404);
    assert_eq!(app.names("/users?deleted_at-null=not").await, vec!["Dee", "Ann"]);

    // restoring a live row finds nothing
    let (status, _) = app.send_json("POST", "/users/2/restore", json!({})).await;
    assert_eq!(status, 404);

    let (status, body) = app.send_json("POST", "/users/1/restore", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Restored successfully.");
    assert_eq!(app.get_json("/users/1").await.1["name"], "Ann");
}

#[tokio::test]
async fn test_destroy_form_route() {
    let app = setup().await;

    let response = app.send(form("POST", "/users/2/destroy", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("lazy_flash=deleted"));
    assert_eq!(app.names("/users").await, vec!["Cid", "Ann"]);
}

#[tokio::test]
async fn test_hard_delete_without_soft_delete_column() {
    let app = setup().await;

    let (status, _) = app.send_json("DELETE", "/tags/1", json!({})).await;
    assert_eq!(status, 200);
    let (_, body) = app.get_json("/tags").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.send_json("POST", "/tags/2/restore", json!({})).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("soft deletes"));
}

#[tokio::test]
async fn test_json_response_mode() {
    let mut config = LazyConfig::default();
    config.response = ResponseMode::Json;
    let app = setup_with(config).await;

    let response = app
        .send(Request::builder().uri("/users/1").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Ann");
}

#[tokio::test]
async fn test_xhr_gets_json_in_auto_mode() {
    let app = setup().await;
    let response = app
        .send(
            Request::builder()
                .uri("/users/1")
                .header("x-requested-with", "XMLHttpRequest")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(body_json(response).await["name"], "Ann");
}

#[tokio::test]
async fn test_router_prefix() {
    let mut config = LazyConfig::default();
    config.router_prefix = "/admin".into();
    let app = setup_with(config).await;

    assert_eq!(app.names("/admin/users").await, vec!["Cid", "Bob", "Ann"]);
    assert_eq!(app.get_json("/users").await.0, 404);

    let response = app.send(form("POST", "/admin/users", "name=Eve")).await;
    assert_eq!(response.headers()[header::LOCATION], "/admin/users");
}

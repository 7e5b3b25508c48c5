//! Image upload validation. These stop at the validation layer, so no object
//! store needs to be running.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::app;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn upload(
    token: Option<&str>,
    content_type: Option<&str>,
    body: &[u8],
) -> (StatusCode, serde_json::Value) {
    let app = app().await;

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/media/upload")
        .header("host", "localhost");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }

    let response = app
        .router_clone()
        .oneshot(builder.body(Body::from(body.to_vec())).unwrap())
        .await
        .expect("oneshot failed");

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn upload_requires_auth() {
    let _ = app().await;
    let (status, _) = upload(None, Some("image/png"), b"fake").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn upload_requires_content_type() {
    let app = app().await;
    let user = app.create_user("media_no_ct").await;

    let (status, body) = upload(Some(&user.token), None, b"fake").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"].as_str().unwrap(), "missing content-type header");
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn upload_rejects_empty_body() {
    let app = app().await;
    let user = app.create_user("media_empty").await;

    let (status, _) = upload(Some(&user.token), Some("image/png"), b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn upload_rejects_unknown_image_types() {
    let app = app().await;
    let user = app.create_user("media_bad_type").await;

    for content_type in ["text/plain", "application/pdf", "image/svg+xml"] {
        let (status, _) = upload(Some(&user.token), Some(content_type), b"fake").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}", content_type);
    }
}

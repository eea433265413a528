//! Request body extraction for `store` and `update`
//!
//! Blank form fields are treated as absent, so an empty number input or an
//! unchecked box falls back to the field's serde default.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::LazyError;

/// A JSON or form-encoded body, chosen by `Content-Type`
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| {
            let media = media.trim();
            media == "application/json" || media.ends_with("+json")
        })
}

/// Urlencoded body without `key=` and bare `key` pairs
fn without_blank_fields(body: &[u8]) -> Vec<u8> {
    let pairs: Vec<&[u8]> = body
        .split(|byte| *byte == b'&')
        .filter(|pair| {
            pair.iter()
                .position(|byte| *byte == b'=')
                .is_some_and(|eq| eq + 1 < pair.len())
        })
        .collect();
    pairs.join(&b'&')
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = LazyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| LazyError::bad_request(rejection.body_text()))?;
            Ok(Self(value))
        } else {
            let method = req.method().clone();
            let uri = req.uri().clone();
            let mut headers = req.headers().clone();
            headers.remove(CONTENT_LENGTH);

            let body = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| LazyError::bad_request(rejection.body_text()))?;
            let mut filtered = Request::new(Body::from(without_blank_fields(&body)));
            *filtered.method_mut() = method;
            *filtered.uri_mut() = uri;
            *filtered.headers_mut() = headers;

            let Form(value) = Form::<T>::from_request(filtered, state)
                .await
                .map_err(|rejection| LazyError::bad_request(rejection.body_text()))?;
            Ok(Self(value))
        }
    }
}

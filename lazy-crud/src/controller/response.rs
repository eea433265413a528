//! Response negotiation, redirects and flash messages

use axum::{
    http::{
        header::{ACCEPT, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_htmx::HxRedirect;
use serde_json::Value;

use crate::config::ResponseMode;

/// Cookie carrying the flash message key across a redirect
pub const FLASH_COOKIE: &str = "lazy_flash";

/// Whether a request should be answered with JSON
///
/// `auto` answers JSON when the preferred `Accept` type is JSON, or for an
/// `XMLHttpRequest` that does not ask for HTML. HTMX requests always get HTML.
#[must_use]
pub fn wants_json(mode: ResponseMode, headers: &HeaderMap, is_htmx: bool) -> bool {
    match mode {
        ResponseMode::Html => false,
        ResponseMode::Json => true,
        ResponseMode::Auto => {
            if is_htmx {
                return false;
            }
            let accept = headers
                .get(ACCEPT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if preferred_media_type(accept).is_some_and(|media| media.ends_with("json")) {
                return true;
            }
            let xhr = headers
                .get("x-requested-with")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
            xhr && !accept.contains("text/html")
        }
    }
}

/// Media type with the highest quality in an `Accept` header; first wins ties
fn preferred_media_type(accept: &str) -> Option<String> {
    let mut best: Option<(String, f32)> = None;
    for range in accept.split(',') {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        if media.is_empty() {
            continue;
        }
        let quality = parts
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);
        if best.as_ref().is_none_or(|(_, q)| quality > *q) {
            best = Some((media, quality));
        }
    }
    best.map(|(media, _)| media)
}

/// Rendered HTML with a status
pub fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

/// JSON with a status
pub fn json(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Redirect after a write, carrying a flash message key
///
/// HTMX requests get an `HX-Redirect` header, others `303 See Other`.
pub fn redirect(url: &str, is_htmx: bool, flash: Option<&str>) -> Response {
    let mut response = if is_htmx {
        (HxRedirect(url.to_string()), StatusCode::OK).into_response()
    } else {
        Redirect::to(url).into_response()
    };
    if let Some(key) = flash {
        let cookie = format!("{FLASH_COOKIE}={key}; Path=/; Max-Age=60; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Flash message key sent back by the browser, if any
#[must_use]
pub fn flash_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == FLASH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Expire the flash cookie on a response
pub fn clear_flash(response: &mut Response) {
    let cookie = format!("{FLASH_COOKIE}=; Path=/; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

//! Content negotiation (§4.8): `Accept` header or `?Accept=` override,
//! `application/json` or `text/html`, `406` for anything else.

use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Html,
}

pub fn negotiate(headers: &HeaderMap, accept_override: Option<&str>) -> Result<MediaType, Error> {
    let header_value = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");
    let candidates: Vec<&str> = match accept_override {
        Some(o) => vec![o],
        None => header_value.split(',').map(str::trim).collect(),
    };

    for candidate in candidates {
        if candidate.starts_with("application/json") || candidate == "*/*" {
            return Ok(MediaType::Json);
        }
        if candidate.starts_with("text/html") {
            return Ok(MediaType::Html);
        }
    }
    Err(Error::NotAcceptable)
}

/// Minimal Tera-free rendering: JSON is the real payload, HTML is a
/// `Debug`-derived dump wrapped in a page — good enough for a human
/// glancing at the endpoint in a browser, not a design surface.
pub trait ToHtml {
    fn to_html(&self) -> String;
}

impl<T: std::fmt::Debug> ToHtml for T {
    fn to_html(&self) -> String {
        format!("<!doctype html><pre>{:#?}</pre>", self)
    }
}

pub fn respond<T: Serialize + ToHtml>(media: MediaType, value: &T) -> Response {
    match media {
        MediaType::Json => Json(value).into_response(),
        MediaType::Html => Html(value.to_html()).into_response(),
    }
}

//! Error types for the todo API.
//!
//! # Design
//! `NotFound` gets a dedicated variant because it carries no message of its
//! own and maps straight to 404. `InvalidInput` holds the human-readable
//! reason the request was rejected. `Internal` exists for the catch-all
//! path; its detail is included in the response body only outside
//! production mode. Every variant is recoverable and nothing in the
//! handling path is allowed to crash the process.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config;

/// Errors produced by the store and handlers, translated to status codes
/// at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A malformed or out-of-range request field — 400.
    InvalidInput(String),

    /// The referenced todo does not exist — 404.
    NotFound,

    /// An unexpected failure in the handling path — 500.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            ApiError::NotFound => write!(f, "todo not found"),
            ApiError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": msg })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": "Todo not found" })),
            )
                .into_response(),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(internal_body(&detail, config::is_production())),
            )
                .into_response(),
        }
    }
}

/// Body of the 500 envelope. The `error` detail field is exposed only
/// outside production mode.
fn internal_body(detail: &str, production: bool) -> serde_json::Value {
    let mut body = json!({ "success": false, "message": "Internal server error" });
    if !production {
        body["error"] = json!(detail);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_invalid_input_reason() {
        let err = ApiError::InvalidInput("text too long".to_string());
        assert_eq!(err.to_string(), "invalid input: text too long");
    }

    #[test]
    fn not_found_displays_without_detail() {
        assert_eq!(ApiError::NotFound.to_string(), "todo not found");
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let resp = ApiError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_maps_to_500() {
        let resp = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_body_includes_detail_in_development() {
        let body = internal_body("boom", false);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["error"], "boom");
    }

    #[test]
    fn internal_body_omits_detail_in_production() {
        let body = internal_body("boom", true);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("error").is_none());
    }
}

//! Responses produced by the gateway itself.
//!
//! # Responsibilities
//! - Turn a redirect decision into a `302 Found`
//! - Map gate and upstream failures to status codes
//!
//! # Design Decisions
//! - A target that is not a valid header value is a configuration error
//! - Error bodies are short plain text; details go to the log

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::GateError;

/// Redirect the visitor to `target`.
pub fn redirect_to(target: &str) -> Response {
    match HeaderValue::from_str(target) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!(target = %target, "Redirect target is not a valid Location header");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response()
        }
    }
}

/// The gate could not be evaluated.
pub fn gate_error(error: &GateError) -> Response {
    let body = match error {
        GateError::MissingRedirectTarget => "Force-login redirect target is not configured",
        GateError::Collaborator { .. } => "Force-login configuration unavailable",
    };
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

/// The storefront could not be reached.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

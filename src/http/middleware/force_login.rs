//! Force-login middleware.
//! Redirects anonymous visitors unless the path is whitelisted.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::config::ForceLoginConfig;
use crate::gate::Decision;
use crate::http::request::RequestIdExt;
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::{ConfigSnapshot, UriContext};

pub async fn force_login_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let config = state.config.load_full();

    // 1. Gate switched off: passthrough mode.
    if !config.gate.enabled {
        return next.run(req).await;
    }

    let request_id = req.request_id().unwrap_or("unknown").to_string();

    // 2. Logged-in customers are not gated. A marker that does not carry
    // the shared token never reaches the storefront.
    if is_authenticated(req.headers(), &config.gate) {
        metrics::record_decision("bypass", start);
        return next.run(req).await;
    }
    if !config.gate.authenticated_header.is_empty() {
        req.headers_mut()
            .remove(config.gate.authenticated_header.as_str());
    }

    // 3. Evaluate against one config snapshot.
    let store_code = store_code(req.headers(), &config.gate);
    let snapshot = ConfigSnapshot::new(config.clone(), store_code.as_deref());
    let context = UriContext::new(req.uri());
    let result = state
        .gate
        .evaluate(&context, &snapshot, &snapshot, &snapshot, &snapshot.scope());

    let outcome = match &result {
        Ok(decision) => decision.outcome(),
        Err(_) => "error",
    };
    metrics::record_decision(outcome, start);

    match result {
        Ok(Decision::Allow) => {
            tracing::debug!(
                request_id = %request_id,
                path = %req.uri().path(),
                store = %snapshot.store_code(),
                "Force-login allowed request"
            );
            next.run(req).await
        }
        Ok(Decision::RedirectTo(target)) => {
            tracing::debug!(
                request_id = %request_id,
                path = %req.uri().path(),
                store = %snapshot.store_code(),
                target = %target,
                "Force-login redirect"
            );
            response::redirect_to(&target)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %req.uri().path(),
                store = %snapshot.store_code(),
                error = %e,
                "Force-login evaluation failed"
            );
            response::gate_error(&e)
        }
    }
}

/// True when the trusted proxy vouched for the visitor. Both the header
/// name and the shared token must be configured.
fn is_authenticated(headers: &HeaderMap, gate: &ForceLoginConfig) -> bool {
    if gate.authenticated_header.is_empty() || gate.authenticated_token.is_empty() {
        return false;
    }
    headers
        .get(gate.authenticated_header.as_str())
        .map(|v| v.as_bytes() == gate.authenticated_token.as_bytes())
        .unwrap_or(false)
}

fn store_code(headers: &HeaderMap, gate: &ForceLoginConfig) -> Option<String> {
    let header = gate.store_header.as_deref()?;
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

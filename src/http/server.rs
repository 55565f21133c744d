//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (tracing, request ID, timeout, force-login)
//! - Swap in reloaded configuration
//! - Forward allowed requests to the upstream storefront

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{uri::Scheme, Request, Uri, Version},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::gate::RedirectGate;
use crate::http::middleware::force_login_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response;
use crate::observability::metrics;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GateConfig>>,
    pub gate: RedirectGate,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the force-login gateway.
pub struct GateServer {
    router: Router,
    config: Arc<ArcSwap<GateConfig>>,
}

impl GateServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        let request_secs = config.timeouts.request_secs;
        let config = Arc::new(ArcSwap::from_pointee(config));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: config.clone(),
            gate: RedirectGate::new(),
            client,
        };

        let router = Self::build_router(request_secs, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_secs: u64, state: AppState) -> Router {
        Router::new()
            .fallback(forward_handler)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                force_login_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live configuration snapshot.
    pub fn config(&self) -> Arc<ArcSwap<GateConfig>> {
        self.config.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the live snapshot;
    /// the server stops once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let live = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                live.store(Arc::new(new_config));
                tracing::info!("Configuration swapped");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward an allowed request to the storefront.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let upstream = state.config.load().upstream.address.clone();

    let (mut parts, body) = request.into_parts();
    parts.uri = match upstream_uri(&parts.uri, &upstream) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Invalid upstream URI");
            metrics::record_upstream(502);
            return response::bad_gateway();
        }
    };
    parts.version = Version::HTTP_11;

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(upstream_response) => {
            metrics::record_upstream(upstream_response.status().as_u16());
            let (parts, body) = upstream_response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Upstream error");
            metrics::record_upstream(502);
            response::bad_gateway()
        }
    }
}

/// Point `original` at the upstream, keeping path and query.
fn upstream_uri(original: &Uri, upstream: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(upstream)
        .path_and_query(path_and_query)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_uri_keeps_path_and_query() {
        let original: Uri = "/checkout/cart?step=2".parse().unwrap();
        let uri = upstream_uri(&original, "127.0.0.1:3000").unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:3000/checkout/cart?step=2");
    }

    #[test]
    fn test_upstream_uri_rejects_bad_authority() {
        let original: Uri = "/".parse().unwrap();
        assert!(upstream_uri(&original, "not a host").is_err());
    }
}

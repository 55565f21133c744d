//! End-to-end behaviour of the force-login middleware in front of a storefront.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use force_login::config::{parse_config, GateConfig};
use force_login::http::GateServer;
use tower::ServiceExt;

mod common;

fn config(upstream: SocketAddr) -> GateConfig {
    parse_config(&format!(
        r#"
        [upstream]
        address = "{upstream}"

        [gate]
        redirect_url = "/login"
        backend_frontname = "backend"
        store_header = "x-store-code"
        authenticated_header = "x-customer-authenticated"
        authenticated_token = "s3cr3t"

        [[gate.whitelist]]
        label = "Checkout"
        url_rule = "checkout"

        [[gate.whitelist]]
        label = "CMS"
        url_rule = "cms"

        [[gate.whitelist]]
        label = "Impressum"
        url_rule = "/impressum"
        store_id = 2

        [stores.german]
        id = 2
        redirect_url = "/de/login"
        "#
    ))
    .unwrap()
}

async fn router() -> Router {
    let upstream = common::start_mock_storefront().await;
    GateServer::new(config(upstream)).router()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_whitelisted_path_reaches_storefront() {
    let app = router().await;

    let response = app.oneshot(get("/checkout/cart?step=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_string(response).await, "GET /checkout/cart?step=2 HTTP/1.1");
}

#[tokio::test]
async fn test_unlisted_path_redirected() {
    let app = router().await;

    let response = app.oneshot(get("/account/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_dot_segments_matched_as_sent() {
    let app = router().await;

    let response = app
        .oneshot(get("/checkout/../account/orders"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_not_redirected() {
    let app = router().await;

    let response = app.oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_frontname_exempt() {
    let app = router().await;

    let response = app.clone().oneshot(get("/backend/sales/order")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/admin/sales/order")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_case_insensitive_and_loose_matching() {
    let app = router().await;

    let response = app.clone().oneshot(get("/CHECKOUT/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // `cms` is matched anywhere in the path, not only as a leading segment.
    let response = app.oneshot(get("/catalog/cms-widgets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn get_with_marker(path: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-customer-authenticated", value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_authenticated_customer_bypasses_gate() {
    let app = router().await;

    let response = app
        .oneshot(get_with_marker("/account/orders", "s3cr3t"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forged_marker_is_redirected() {
    let app = router().await;

    let response = app
        .oneshot(get_with_marker("/account/orders", "1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_forged_marker_not_forwarded() {
    let app = router().await;

    let response = app
        .oneshot(get_with_marker("/checkout", "1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "GET /checkout HTTP/1.1");
}

#[tokio::test]
async fn test_default_config_ignores_authenticated_header() {
    let upstream = common::start_mock_storefront().await;
    let mut config = GateConfig::default();
    config.upstream.address = upstream.to_string();
    let app = GateServer::new(config).router();

    let response = app
        .oneshot(get_with_marker("/sales/order/history", "1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/customer/account/login"));
}

#[tokio::test]
async fn test_store_scope() {
    let app = router().await;

    let german = |path: &str| {
        Request::builder()
            .uri(path)
            .header("x-store-code", "german")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(german("/account")).await.unwrap();
    assert_eq!(location(&response), Some("/de/login"));

    let response = app.clone().oneshot(german("/impressum")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Store-bound entries do not leak into the default store.
    let response = app.oneshot(get("/impressum")).await.unwrap();
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_default_redirect_url_fallback() {
    let upstream = common::start_mock_storefront().await;
    let mut config = config(upstream);
    config.gate.redirect_url = String::new();
    config.gate.default_redirect_url = "/please-login".into();
    let app = GateServer::new(config).router();

    let response = app.oneshot(get("/secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/please-login"));
}

#[tokio::test]
async fn test_missing_target_fails_loudly() {
    let upstream = common::start_mock_storefront().await;
    let mut config = config(upstream);
    config.gate.redirect_url = String::new();
    config.gate.default_redirect_url = String::new();
    let app = GateServer::new(config).router();

    let response = app.oneshot(get("/checkout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_disabled_gate_passes_everything() {
    let upstream = common::start_mock_storefront().await;
    let mut config = config(upstream);
    config.gate.enabled = false;
    let app = GateServer::new(config).router();

    let response = app.oneshot(get("/account/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_storefront_is_bad_gateway() {
    let upstream = common::unused_addr().await;
    let app = GateServer::new(config(upstream)).router();

    let response = app.clone().oneshot(get("/checkout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // Redirects never touch the storefront.
    let response = app.oneshot(get("/account")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the force-login gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Storefront the gateway forwards allowed requests to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Force-login settings (default scope).
    pub gate: ForceLoginConfig,

    /// Store-scoped overrides, keyed by store code.
    pub stores: BTreeMap<String, StoreConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream storefront.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Force-login behaviour in the default scope.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForceLoginConfig {
    /// Apply the gate at all. Disabled means every request passes.
    pub enabled: bool,

    /// `force_customer_login/url_config/redirect_url`.
    pub redirect_url: String,

    /// `force_customer_login/default_redirect_url`, used when
    /// `redirect_url` is empty.
    pub default_redirect_url: String,

    /// Admin route front name (always whitelisted as `/<frontname>`).
    pub backend_frontname: String,

    /// Header a trusted session proxy sets for logged-in customers.
    /// Empty disables the bypass. The gateway must only be reachable
    /// through that proxy, and the proxy must strip the header from
    /// client requests, or any visitor can skip the gate.
    pub authenticated_header: String,

    /// Shared secret the proxy puts in `authenticated_header`. The bypass
    /// applies only when the header value equals it exactly.
    pub authenticated_token: String,

    /// Optional header selecting the store code per request.
    pub store_header: Option<String>,

    /// Store code used when no store header is present.
    pub default_store: String,

    /// Allow-list entries. Defaults to the built-in customer account routes.
    pub whitelist: Vec<WhitelistEntry>,
}

impl Default for ForceLoginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redirect_url: String::new(),
            default_redirect_url: "/customer/account/login".to_string(),
            backend_frontname: "admin".to_string(),
            authenticated_header: String::new(),
            authenticated_token: String::new(),
            store_header: None,
            default_store: "default".to_string(),
            whitelist: default_whitelist(),
        }
    }
}

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WhitelistEntry {
    /// Human-readable name.
    #[serde(default)]
    pub label: String,

    /// Rule matched against the request path.
    pub url_rule: String,

    /// False for entries shipped with the gateway.
    #[serde(default = "default_editable")]
    pub editable: bool,

    /// 0 applies to every store, otherwise only to the store with this id.
    #[serde(default)]
    pub store_id: u32,
}

impl WhitelistEntry {
    fn builtin(label: &str, url_rule: &str) -> Self {
        Self {
            label: label.to_string(),
            url_rule: url_rule.to_string(),
            editable: false,
            store_id: 0,
        }
    }
}

fn default_editable() -> bool {
    true
}

/// Entries every storefront needs for anonymous visitors to reach login.
pub fn default_whitelist() -> Vec<WhitelistEntry> {
    vec![
        WhitelistEntry::builtin("Customer Account Login", "/customer/account/login"),
        WhitelistEntry::builtin("Customer Account Logout", "/customer/account/logout"),
        WhitelistEntry::builtin("Customer Account Logout Success", "/customer/account/logoutSuccess"),
        WhitelistEntry::builtin("Customer Account Create", "/customer/account/create"),
        WhitelistEntry::builtin("Customer Account Create Password", "/customer/account/createPost"),
        WhitelistEntry::builtin("Customer Account Login Post", "/customer/account/loginPost"),
        WhitelistEntry::builtin("Customer Account Forgot Password", "/customer/account/forgotpassword"),
        WhitelistEntry::builtin("Customer Account Forgot Password Post", "/customer/account/forgotpasswordpost"),
        WhitelistEntry::builtin("Customer Account Reset Password", "/customer/account/resetpassword"),
        WhitelistEntry::builtin("Customer Account Reset Password Post", "/customer/account/resetpasswordpost"),
        WhitelistEntry::builtin("Customer Section Load", "/customer/section/load"),
        WhitelistEntry::builtin("Contact Us", "/contact"),
        WhitelistEntry::builtin("Help", "/help"),
        WhitelistEntry::builtin("Sitemap.xml", "/sitemap.xml"),
        WhitelistEntry::builtin("Robots.txt", "/robots.txt"),
    ]
}

/// Store-scoped overrides. Unset fields inherit the default scope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Numeric store id referenced by `WhitelistEntry::store_id`.
    pub id: u32,

    pub redirect_url: Option<String>,

    pub default_redirect_url: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

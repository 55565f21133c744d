//! Configuration collaborators consumed by the gate.
//!
//! # Data Flow
//! ```text
//! GateConfig snapshot (Arc, swapped on reload)
//!     → snapshot.rs  (ConfigStore + WhitelistSource + DeploymentConfig)
//!     → gate::evaluate (reads target, rules, admin front name)
//!
//! Incoming request
//!     → request.rs   (RequestContext: path component only)
//!     → gate::evaluate
//! ```
//!
//! # Design Decisions
//! - The gate sees traits, never the config file
//! - Every lookup can fail; failures are fatal for the request
//! - Store scope falls back to the default scope

pub mod request;
pub mod snapshot;

pub use request::{PathContext, RequestContext, UriContext, UrlContext};
pub use snapshot::ConfigSnapshot;

use crate::error::GateError;

/// Store-scoped redirect target.
pub const REDIRECT_URL: &str = "force_customer_login/url_config/redirect_url";

/// Fallback redirect target when `REDIRECT_URL` is empty.
pub const DEFAULT_REDIRECT_URL: &str = "force_customer_login/default_redirect_url";

/// Configuration scope of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Default,
    Store(String),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Default => write!(f, "default"),
            Scope::Store(code) => write!(f, "store:{}", code),
        }
    }
}

/// Scoped key/value configuration storage.
pub trait ConfigStore: Send + Sync {
    /// Returns the value for `key` in `scope`, or an empty string if unset.
    fn get_string(&self, key: &str, scope: &Scope) -> Result<String, GateError>;
}

/// Source of the current allow-list.
pub trait WhitelistSource: Send + Sync {
    /// One URL rule per entry.
    fn list_rules(&self) -> Result<Vec<String>, GateError>;
}

/// Deployment-level settings.
pub trait DeploymentConfig: Send + Sync {
    /// The admin route front name, without a leading slash.
    fn backend_front_name(&self) -> Result<String, GateError>;
}

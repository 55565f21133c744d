//! Force-login gateway.
//!
//! Redirects anonymous storefront visitors to the login page unless the
//! requested path is whitelisted or belongs to the admin backend.

pub mod check;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{Decision, RedirectGate};
pub use http::GateServer;
pub use lifecycle::Shutdown;

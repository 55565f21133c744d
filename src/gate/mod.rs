//! Force-login gate.
//!
//! # Data Flow
//! ```text
//! RequestContext (current path)
//! ConfigStore    (redirect_url → default_redirect_url)
//! WhitelistSource (url rules)        → redirect_gate.rs → Decision
//! DeploymentConfig (admin front name)
//!     rule.rs compiles each rule into `(?i)^.*<rule>/?.*$`
//! ```
//!
//! # Design Decisions
//! - Stateless: safe to share across request tasks without locking
//! - Loose containment matching is intentional; see `rule.rs`
//! - Fail closed on unknown paths and invalid rules

pub mod decision;
pub mod redirect_gate;
pub mod rule;

pub use decision::Decision;
pub use redirect_gate::{resolve_redirect_target, RedirectGate};
pub use rule::{CompiledRule, WhitelistRule};

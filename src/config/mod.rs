//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc<ArcSwap<GateConfig>> with the force-login middleware
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the Arc<GateConfig> snapshot
//!     → next request observes the new whitelist and targets
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ForceLoginConfig, GateConfig, ListenerConfig, ObservabilityConfig, StoreConfig,
    UpstreamConfig, WhitelistEntry,
};
pub use watcher::ConfigWatcher;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway and gate produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (decision counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID is attached to every decision log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

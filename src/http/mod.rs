//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (assign request ID)
//!     → middleware/force_login.rs (allow or 302 to the login page)
//!     → server.rs forward_handler (proxy to the storefront)
//!     → response.rs (gateway-generated responses)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, GateServer};

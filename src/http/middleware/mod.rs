//! Request middleware.

pub mod force_login;

pub use force_login::force_login_middleware;

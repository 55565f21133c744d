//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (whitelist entries reference declared stores)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Refuse configs that cannot produce a redirect target
//! - Compile every whitelist rule so a bad pattern fails the load, not a request
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::gate::WhitelistRule;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroTimeout,

    #[error("gate.backend_frontname must be a non-empty name without '/', got {0:?}")]
    InvalidFrontName(String),

    #[error("{scope}: redirect_url and default_redirect_url are both empty")]
    NoRedirectTarget { scope: String },

    #[error("gate.whitelist[{index}]: url_rule is empty")]
    EmptyRule { index: usize },

    #[error("gate.whitelist[{index}]: url_rule {rule:?} does not compile: {reason}")]
    InvalidRule {
        index: usize,
        rule: String,
        reason: String,
    },

    #[error("gate.whitelist[{index}]: store_id {store_id} does not match any declared store")]
    UnknownStore { index: usize, store_id: u32 },

    #[error("gate.authenticated_header is set but gate.authenticated_token is empty")]
    MissingAuthenticatedToken,

    #[error("stores.{code}: id must be greater than 0")]
    ZeroStoreId { code: String },

    #[error("observability.log_format must be \"pretty\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
}

/// Check a parsed config for semantic errors.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let frontname = &config.gate.backend_frontname;
    if frontname.trim().is_empty() || frontname.contains('/') {
        errors.push(ValidationError::InvalidFrontName(frontname.clone()));
    }

    let gate = &config.gate;
    if gate.redirect_url.is_empty() && gate.default_redirect_url.is_empty() {
        errors.push(ValidationError::NoRedirectTarget {
            scope: "gate".to_string(),
        });
    }

    if !gate.authenticated_header.is_empty() && gate.authenticated_token.is_empty() {
        errors.push(ValidationError::MissingAuthenticatedToken);
    }

    let mut store_ids = HashSet::new();
    for (code, store) in &config.stores {
        if store.id == 0 {
            errors.push(ValidationError::ZeroStoreId { code: code.clone() });
        }
        store_ids.insert(store.id);

        // An explicit empty override is as bad as an empty default.
        let redirect = store.redirect_url.as_deref().unwrap_or(&gate.redirect_url);
        let fallback = store
            .default_redirect_url
            .as_deref()
            .unwrap_or(&gate.default_redirect_url);
        if redirect.is_empty() && fallback.is_empty() {
            errors.push(ValidationError::NoRedirectTarget {
                scope: format!("stores.{}", code),
            });
        }
    }

    for (index, entry) in gate.whitelist.iter().enumerate() {
        if entry.url_rule.is_empty() {
            errors.push(ValidationError::EmptyRule { index });
        } else if let Err(e) = WhitelistRule::new(entry.url_rule.as_str()).compile() {
            errors.push(ValidationError::InvalidRule {
                index,
                rule: entry.url_rule.clone(),
                reason: e.to_string(),
            });
        }
        if entry.store_id != 0 && !store_ids.contains(&entry.store_id) {
            errors.push(ValidationError::UnknownStore {
                index,
                store_id: entry.store_id,
            });
        }
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::InvalidLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

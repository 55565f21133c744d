//! Collaborators backed by one loaded `GateConfig`.

use std::sync::Arc;

use crate::config::schema::{GateConfig, StoreConfig};
use crate::error::GateError;
use crate::store::{
    ConfigStore, DeploymentConfig, Scope, WhitelistSource, DEFAULT_REDIRECT_URL, REDIRECT_URL,
};

/// A read-only view of the configuration for one store.
///
/// Holds its own `Arc`, so a reload that happens mid-request does not
/// change what this evaluation sees.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    config: Arc<GateConfig>,
    store_code: String,
}

impl ConfigSnapshot {
    pub fn new(config: Arc<GateConfig>, store_code: Option<&str>) -> Self {
        let store_code = store_code
            .filter(|code| !code.is_empty())
            .unwrap_or(config.gate.default_store.as_str())
            .to_string();
        Self { config, store_code }
    }

    pub fn store_code(&self) -> &str {
        &self.store_code
    }

    /// Scope the evaluation reads store-scoped values in.
    pub fn scope(&self) -> Scope {
        Scope::Store(self.store_code.clone())
    }

    fn store(&self, code: &str) -> Option<&StoreConfig> {
        self.config.stores.get(code)
    }

    /// Id of the current store, 0 when the store is not declared.
    fn store_id(&self) -> u32 {
        self.store(&self.store_code).map(|s| s.id).unwrap_or(0)
    }
}

impl ConfigStore for ConfigSnapshot {
    fn get_string(&self, key: &str, scope: &Scope) -> Result<String, GateError> {
        let gate = &self.config.gate;
        let store = match scope {
            Scope::Default => None,
            Scope::Store(code) => self.store(code),
        };

        let value = match key {
            REDIRECT_URL => store
                .and_then(|s| s.redirect_url.as_deref())
                .unwrap_or(&gate.redirect_url),
            DEFAULT_REDIRECT_URL => store
                .and_then(|s| s.default_redirect_url.as_deref())
                .unwrap_or(&gate.default_redirect_url),
            _ => "",
        };
        Ok(value.to_string())
    }
}

impl WhitelistSource for ConfigSnapshot {
    fn list_rules(&self) -> Result<Vec<String>, GateError> {
        let store_id = self.store_id();
        Ok(self
            .config
            .gate
            .whitelist
            .iter()
            .filter(|entry| entry.store_id == 0 || entry.store_id == store_id)
            .map(|entry| entry.url_rule.clone())
            .collect())
    }
}

impl DeploymentConfig for ConfigSnapshot {
    fn backend_front_name(&self) -> Result<String, GateError> {
        let frontname = self.config.gate.backend_frontname.trim();
        if frontname.is_empty() {
            return Err(GateError::collaborator(
                "deployment config",
                "backend front name is not set",
            ));
        }
        Ok(frontname.to_string())
    }
}

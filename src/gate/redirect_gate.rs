//! The force-login decision.
//!
//! # Responsibilities
//! - Decide allow vs redirect for one request path
//! - Resolve the redirect target with its fallback
//! - Glue configuration collaborators to the decision
//!
//! # Design Decisions
//! - Pure function of its inputs: no caching across calls
//! - The admin front name is always part of the allow-list
//! - Anything that cannot be evaluated is an error, never an allow

use crate::error::GateError;
use crate::gate::decision::Decision;
use crate::gate::rule::WhitelistRule;
use crate::store::{
    ConfigStore, DeploymentConfig, RequestContext, Scope, WhitelistSource, DEFAULT_REDIRECT_URL,
    REDIRECT_URL,
};

/// Stateless force-login gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectGate;

impl RedirectGate {
    pub fn new() -> Self {
        Self
    }

    /// Decide what to do with `current_path`.
    ///
    /// `None` stands for a path that could not be determined; it matches no
    /// rule and is redirected.
    pub fn decide<S: AsRef<str>>(
        &self,
        current_path: Option<&str>,
        redirect_target: &str,
        rules: &[S],
        admin_prefix: &str,
    ) -> Result<Decision, GateError> {
        if redirect_target.is_empty() {
            return Err(GateError::MissingRedirectTarget);
        }
        // `/` alone would exempt every path.
        if admin_prefix.trim().is_empty() {
            return Err(GateError::collaborator(
                "deployment config",
                "backend front name is empty",
            ));
        }

        let Some(path) = current_path else {
            return Ok(Decision::RedirectTo(redirect_target.to_string()));
        };

        // Already on the target page.
        if path == redirect_target {
            return Ok(Decision::Allow);
        }

        let admin_rule = WhitelistRule::new(format!("/{}", admin_prefix));
        let matched = rules
            .iter()
            .map(|rule| WhitelistRule::new(rule.as_ref()))
            .chain(std::iter::once(admin_rule))
            .find(|rule| rule.matches(path));

        match matched {
            Some(rule) => {
                tracing::trace!(path = %path, rule = %rule.as_str(), "Path whitelisted");
                Ok(Decision::Allow)
            }
            None => Ok(Decision::RedirectTo(redirect_target.to_string())),
        }
    }

    /// Evaluate the current request against the configured collaborators.
    pub fn evaluate(
        &self,
        request: &dyn RequestContext,
        config: &dyn ConfigStore,
        whitelist: &dyn WhitelistSource,
        deployment: &dyn DeploymentConfig,
        scope: &Scope,
    ) -> Result<Decision, GateError> {
        let target = resolve_redirect_target(config, scope)?;
        let path = request.current_path();

        // Nothing else to look up when the visitor is already there.
        if path == Some(target.as_str()) {
            return Ok(Decision::Allow);
        }

        let rules = whitelist.list_rules()?;
        let admin_prefix = deployment.backend_front_name()?;
        self.decide(path, &target, rules.as_slice(), &admin_prefix)
    }
}

/// `redirect_url`, else `default_redirect_url`, else an error.
pub fn resolve_redirect_target(
    config: &dyn ConfigStore,
    scope: &Scope,
) -> Result<String, GateError> {
    let url = config.get_string(REDIRECT_URL, scope)?;
    if !url.is_empty() {
        return Ok(url);
    }

    let url = config.get_string(DEFAULT_REDIRECT_URL, scope)?;
    if !url.is_empty() {
        return Ok(url);
    }

    Err(GateError::MissingRedirectTarget)
}

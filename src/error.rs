//! Error types for gate evaluation.

use thiserror::Error;

/// Errors that abort a single force-login evaluation.
///
/// None of these degrade into an allow: the middleware turns every variant
/// into a 500 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Neither `redirect_url` nor `default_redirect_url` yields a target.
    #[error("no redirect target configured (redirect_url and default_redirect_url are both empty)")]
    MissingRedirectTarget,

    /// A configuration collaborator could not answer.
    #[error("{source_name} unavailable: {reason}")]
    Collaborator {
        source_name: &'static str,
        reason: String,
    },
}

impl GateError {
    pub fn collaborator(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            source_name,
            reason: reason.into(),
        }
    }
}

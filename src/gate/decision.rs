//! Outcome of one force-login evaluation.

use serde::Serialize;

/// What the caller should do with the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "target", rename_all = "snake_case")]
pub enum Decision {
    /// Let the request through unchanged.
    Allow,
    /// Send the visitor to the given path and stop processing.
    RedirectTo(String),
}

impl Decision {
    /// Metric / log label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::RedirectTo(_) => "redirect",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::RedirectTo(target) => write!(f, "redirect {}", target),
        }
    }
}

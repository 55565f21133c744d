//! Offline evaluation of a URL against a configuration.
//!
//! Runs exactly the evaluation the middleware runs, minus the
//! authenticated-customer bypass.

use std::sync::Arc;

use serde::Serialize;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{Decision, RedirectGate};
use crate::store::{ConfigSnapshot, PathContext, RequestContext, UrlContext};

/// Result of one offline check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub input: String,
    pub path: Option<String>,
    pub store: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Evaluate `input` (absolute URL or bare path) for `store`.
pub fn check(
    config: Arc<GateConfig>,
    input: &str,
    store: Option<&str>,
) -> Result<CheckReport, GateError> {
    let context: Box<dyn RequestContext> = if input.contains("://") {
        Box::new(UrlContext::parse(input))
    } else {
        Box::new(PathContext::parse(input))
    };

    let snapshot = ConfigSnapshot::new(config, store);
    let decision = RedirectGate::new().evaluate(
        context.as_ref(),
        &snapshot,
        &snapshot,
        &snapshot,
        &snapshot.scope(),
    )?;

    Ok(CheckReport {
        input: input.to_string(),
        path: context.current_path().map(str::to_string),
        store: snapshot.store_code().to_string(),
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config() -> Arc<GateConfig> {
        Arc::new(
            parse_config(
                r#"
                [gate]
                redirect_url = "/login"
                backend_frontname = "backend"

                [[gate.whitelist]]
                url_rule = "checkout"

                [[gate.whitelist]]
                url_rule = "cms"
                "#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_check_url_and_path() {
        let report = check(config(), "https://shop.test/checkout/cart?step=1", None).unwrap();
        assert_eq!(report.path.as_deref(), Some("/checkout/cart"));
        assert_eq!(report.store, "default");
        assert_eq!(report.decision, Decision::Allow);

        let report = check(config(), "/account/orders", None).unwrap();
        assert_eq!(report.decision, Decision::RedirectTo("/login".into()));

        let report = check(config(), "/backend/sales/order", None).unwrap();
        assert_eq!(report.decision, Decision::Allow);
    }

    #[test]
    fn test_check_sees_raw_path() {
        // The middleware matches `/checkout/../account/orders` as sent, so
        // the offline check must too.
        let report = check(config(), "http://shop.test/checkout/../account/orders", None).unwrap();
        assert_eq!(report.path.as_deref(), Some("/checkout/../account/orders"));
        assert_eq!(report.decision, Decision::Allow);
    }

    #[test]
    fn test_check_unparsable_input() {
        let report = check(config(), "checkout", None).unwrap();
        assert_eq!(report.path, None);
        assert_eq!(report.decision, Decision::RedirectTo("/login".into()));
    }

    #[test]
    fn test_report_json() {
        let report = check(config(), "/secret", Some("default")).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["decision"], "redirect_to");
        assert_eq!(json["target"], "/login");
        assert_eq!(json["path"], "/secret");
    }
}

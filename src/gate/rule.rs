//! Whitelist rule matching.
//!
//! # Responsibilities
//! - Turn a raw whitelist string into a case-insensitive pattern
//! - Match the pattern against a request path
//!
//! # Design Decisions
//! - A rule is a regex fragment, not a literal: `/cms/.+` is legal
//! - Matching is containment, not prefix: `^.*<rule>/?.*$`
//! - A rule that fails to compile never matches (fail closed)

use regex::{Regex, RegexBuilder};

/// Delimiter that whitelist rules are historically wrapped in. Rule
/// authors escape nothing, so literal occurrences are escaped here.
const RULE_DELIMITER: char = '#';

/// A single allow-list entry as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistRule {
    raw: String,
}

impl WhitelistRule {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The rule as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Source of the anchored containment pattern for this rule.
    pub fn pattern(&self) -> String {
        format!("^.*{}/?.*$", quote_rule(&self.raw))
    }

    /// Compile the rule into a case-insensitive matcher.
    pub fn compile(&self) -> Result<CompiledRule, regex::Error> {
        let regex = RegexBuilder::new(&self.pattern())
            .case_insensitive(true)
            .build()?;
        Ok(CompiledRule { regex })
    }

    /// Compile and match in one step. Compilation failure counts as no match.
    pub fn matches(&self, path: &str) -> bool {
        match self.compile() {
            Ok(compiled) => compiled.matches(path),
            Err(e) => {
                tracing::warn!(rule = %self.raw, error = %e, "Ignoring invalid whitelist rule");
                false
            }
        }
    }
}

/// A whitelist rule ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    regex: Regex,
}

impl CompiledRule {
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Escape every literal delimiter in a rule.
pub fn quote_rule(rule: &str) -> String {
    rule.replace(RULE_DELIMITER, &format!("\\{}", RULE_DELIMITER))
}

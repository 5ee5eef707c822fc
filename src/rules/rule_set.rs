//! Ordered collapse rules plus the always-expand exclusions.

use super::rule::{Rule, RuleKind};
use crate::trace::Frame;
use crate::utils::config::BUILTIN_COLLAPSE_RULES;
use crate::utils::error::RuleError;
use log::debug;
use std::sync::Arc;

/// Registered rules in insertion order
///
/// Collapse rules are tried first-match-wins. A frame that matches any
/// always-expand rule is never collapsed.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

impl RuleSet {
    /// A rule set with nothing registered
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// A rule set preloaded with [`BUILTIN_COLLAPSE_RULES`]
    pub fn with_builtin_rules() -> Self {
        let mut set = Self::empty();
        for (name, matchers) in BUILTIN_COLLAPSE_RULES {
            // Built-in table entries are never empty
            if let Ok(rule) = Rule::new(*name, matchers.iter().copied(), RuleKind::Collapse) {
                set.rules.push(Arc::new(rule));
            }
        }
        set
    }

    /// Append a collapse rule after every rule registered so far
    ///
    /// Names are not unique; registering a name twice adds a second, independent rule.
    pub fn add_collapse_rule<I, S>(&mut self, name: impl Into<String>, matchers: I) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Rule::new(name, matchers, RuleKind::Collapse)?);
        Ok(())
    }

    /// Register frames that must always be printed
    pub fn add_always_expand_rule<I, S>(&mut self, name: impl Into<String>, matchers: I) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Rule::new(name, matchers, RuleKind::AlwaysExpand)?);
        Ok(())
    }

    fn push(&mut self, rule: Rule) {
        debug!("Registering {:?} rule '{}' with {} matchers", rule.kind(), rule.name(), rule.matchers().len());
        self.rules.push(Arc::new(rule));
    }

    /// First collapse rule matching the frame, unless an always-expand rule matches too
    pub fn match_frame(&self, frame: &Frame) -> Option<&Arc<Rule>> {
        self.match_canonical(&frame.to_string())
    }

    /// Same as [`match_frame`](Self::match_frame) on already rendered canonical text
    pub fn match_canonical(&self, canonical: &str) -> Option<&Arc<Rule>> {
        let rule = self.collapse_rules().find(|rule| rule.matches(canonical))?;
        if self.expand_rules().any(|expand| expand.matches(canonical)) {
            return None;
        }
        Some(rule)
    }

    pub fn collapse_rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter().filter(|rule| rule.kind() == RuleKind::Collapse)
    }

    pub fn expand_rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter().filter(|rule| rule.kind() == RuleKind::AlwaysExpand)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

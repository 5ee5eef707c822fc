//! A named substring rule.

use crate::utils::error::RuleError;

/// What a matching rule does to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Consecutive matching frames fold into one labeled line
    Collapse,
    /// Matching frames are always printed, whatever else they match
    AlwaysExpand,
}

/// A rule matches a frame when any matcher occurs in the frame's canonical text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    matchers: Vec<String>,
    kind: RuleKind,
}

impl Rule {
    /// Create a rule, rejecting empty matcher lists and blank matchers
    ///
    /// # Errors
    /// * `RuleError::EmptyMatchers` - No matchers given
    /// * `RuleError::BlankMatcher` - A matcher is empty or whitespace, which would match every frame
    pub fn new<I, S>(name: impl Into<String>, matchers: I, kind: RuleKind) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut collected: Vec<String> = Vec::new();
        for matcher in matchers {
            let matcher = matcher.into();
            if matcher.trim().is_empty() {
                return Err(RuleError::BlankMatcher { rule: name });
            }
            if !collected.contains(&matcher) {
                collected.push(matcher);
            }
        }
        if collected.is_empty() {
            return Err(RuleError::EmptyMatchers { rule: name });
        }
        Ok(Self {
            name,
            matchers: collected,
            kind,
        })
    }

    /// Label printed for a collapsed run
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matchers(&self) -> &[String] {
        &self.matchers
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_left_expanded(&self) -> bool {
        self.kind == RuleKind::AlwaysExpand
    }

    /// Check a frame's canonical text against every matcher
    pub fn matches(&self, canonical: &str) -> bool {
        self.matchers.iter().any(|matcher| canonical.contains(matcher.as_str()))
    }
}

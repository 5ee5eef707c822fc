//! Error types for the entire library.
//!
//! We use `thiserror` for every error the library can return. Rendering
//! itself never fails; only rule registration, configuration loading and
//! printed-trace parsing return these.

use thiserror::Error;

/// Errors raised while registering a collapse or always-expand rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule '{rule}' has no matchers")]
    EmptyMatchers { rule: String },

    #[error("Rule '{rule}' contains a blank matcher")]
    BlankMatcher { rule: String },
}

/// Errors that can occur while parsing a printed stack trace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Printed trace is empty")]
    EmptyInput,

    #[error("Expected an exception description, found: {0}")]
    MissingHeader(String),

    #[error("Invalid frame on line {line}: {text}")]
    InvalidFrame { line: usize, text: String },
}

/// Errors that can occur while loading compacter settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Settings TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Invalid rule in settings: {0}")]
    Rule(#[from] RuleError),
}

//! Configuration and constants for the compacter.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```toml
//! [compacter]
//! cache_capacity = 200
//! check_interval_secs = 30
//!
//! [[collapse]]
//! name = "-- Netty"
//! matchers = ["io.netty."]
//!
//! [[expand]]
//! name = "Internal"
//! matchers = ["com.app.internal."]
//! ```

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of distinct fingerprints tracked before the cache is cleared
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// How often the disable flag is re-read
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Width after which packed collapsed labels wrap onto a new line
pub const MAX_PACKED_LINE_WIDTH: usize = 130;

/// Environment variable that turns compaction off while it is set
pub const DEFAULT_DISABLE_ENV_VAR: &str = "STACKTRACE_COMPACTER_OFF";

// Sentinels returned instead of a rendered trace
pub const NO_EXCEPTION: &str = "No exception provided";
pub const NO_STACK_TRACE: &str = "No stack trace provided";
pub const EMPTY_STACK_TRACE: &str = "No stack trace element provided";

/// Rules registered in every new rule set, in matching order
pub const BUILTIN_COLLAPSE_RULES: &[(&str, &[&str])] = &[
    (
        "-- Reflection",
        &["java.lang.reflect.", "sun.reflect.", "jdk.internal.reflect."],
    ),
    (
        "-- Tomcat",
        &["org.apache.catalina.", "org.apache.coyote.", "org.apache.tomcat."],
    ),
    ("-- Websphere", &["com.ibm.ws.", "com.ibm.websphere."]),
    ("-- Spring", &["org.springframework."]),
    ("-- Freemarker", &["freemarker."]),
    ("-- Jackson", &["com.fasterxml.jackson."]),
    ("-- ActiveMQ", &["org.apache.activemq."]),
    ("-- Hibernate", &["org.hibernate."]),
    ("-- DB driver (MS SQL)", &["com.microsoft.sqlserver."]),
    ("-- DB driver (MySQL)", &["com.mysql."]),
    ("-- DB driver (Oracle)", &["oracle.jdbc."]),
    ("-- JUnit", &["org.junit."]),
    ("-- Mockito", &["org.mockito."]),
    ("-- IntelliJ IDEA", &["com.intellij."]),
];

/// Tunables for one compacter context
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompacterConfig {
    /// Distinct fingerprints kept before the dedup cache is cleared
    pub cache_capacity: usize,

    /// Seconds between reads of the disable flag
    pub check_interval_secs: u64,

    /// Packed label line width
    pub max_line_width: usize,

    /// Environment variable consulted by the default disable source
    pub disable_env_var: String,
}

impl Default for CompacterConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            check_interval_secs: DEFAULT_CHECK_INTERVAL.as_secs(),
            max_line_width: MAX_PACKED_LINE_WIDTH,
            disable_env_var: DEFAULT_DISABLE_ENV_VAR.to_string(),
        }
    }
}

impl CompacterConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Reject values that would make the gate or cache meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.check_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "check_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.max_line_width == 0 {
            return Err(ConfigError::InvalidValue(
                "max_line_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A named rule as written in a settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleEntry {
    pub name: String,
    pub matchers: Vec<String>,
}

/// Complete settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompacterSettings {
    #[serde(default)]
    pub compacter: CompacterConfig,

    /// Collapse rules appended after the built-in ones
    #[serde(default)]
    pub collapse: Vec<RuleEntry>,

    /// Always-expand rules
    #[serde(default)]
    pub expand: Vec<RuleEntry>,
}

impl CompacterSettings {
    /// Parse and validate settings from a TOML document
    ///
    /// # Errors
    /// * `ConfigError::Toml` - If the document is not valid TOML for this shape
    /// * `ConfigError::InvalidValue` - If a tunable is out of range
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: CompacterSettings = toml::from_str(contents)?;
        settings.compacter.validate()?;
        Ok(settings)
    }
}

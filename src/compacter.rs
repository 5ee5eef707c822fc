//! The shared diagnostics context.
//!
//! A [`StackTraceCompacter`] owns everything that outlives a single call:
//! the kill switch, the registered rules and the occurrence counts. It is
//! `Send + Sync` and meant to be shared by every logging call site, either as
//! an instance the application constructs or through [`StackTraceCompacter::shared`].

use crate::collapse::Trace;
use crate::dedup::Deduplicator;
use crate::gate::{DisableSource, EnvDisableFlag, RateGate};
use crate::render::{render_full, sentinel_for, Renderer};
use crate::rules::RuleSet;
use crate::trace::{parse_printed_trace, Throwable};
use crate::utils::config::{CompacterConfig, CompacterSettings, NO_EXCEPTION};
use crate::utils::error::{ConfigError, RuleError};
use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct StackTraceCompacter {
    config: CompacterConfig,
    gate: RateGate,
    rules: RwLock<RuleSet>,
    dedup: Deduplicator,
    renderer: Renderer,
}

impl Default for StackTraceCompacter {
    fn default() -> Self {
        Self::new()
    }
}

impl StackTraceCompacter {
    /// Built-in rules, default tunables, disabled by `STACKTRACE_COMPACTER_OFF`
    pub fn new() -> Self {
        let config = CompacterConfig::default();
        let source = EnvDisableFlag::new(config.disable_env_var.clone());
        Self::with_config(config, source)
    }

    /// Built-in rules with explicit tunables and disable source
    ///
    /// The config is not validated here; [`from_settings`](Self::from_settings)
    /// does that. Out-of-range values are clamped instead: a `cache_capacity`
    /// of 0 tracks one body, a `check_interval_secs` of 0 re-reads the disable
    /// source on every call, and a `max_line_width` of 0 puts each collapsed
    /// label on its own line.
    pub fn with_config(config: CompacterConfig, source: impl DisableSource + 'static) -> Self {
        if let Err(err) = config.validate() {
            warn!("Using clamped compacter config: {}", err);
        }
        Self {
            gate: RateGate::new(config.check_interval(), source),
            rules: RwLock::new(RuleSet::with_builtin_rules()),
            dedup: Deduplicator::new(config.cache_capacity),
            renderer: Renderer::new(config.max_line_width),
            config,
        }
    }

    /// Build a context from loaded settings
    ///
    /// User collapse rules are appended after the built-in ones, in file order.
    ///
    /// # Errors
    /// * `ConfigError::InvalidValue` - A tunable is out of range
    /// * `ConfigError::Rule` - A rule has no usable matchers
    pub fn from_settings(settings: &CompacterSettings) -> Result<Self, ConfigError> {
        settings.compacter.validate()?;
        let source = EnvDisableFlag::new(settings.compacter.disable_env_var.clone());
        let compacter = Self::with_config(settings.compacter.clone(), source);
        for entry in &settings.collapse {
            compacter.add_collapse_rule(entry.name.as_str(), entry.matchers.iter().map(String::as_str))?;
        }
        for entry in &settings.expand {
            compacter.add_always_expand_rule(entry.name.as_str(), entry.matchers.iter().map(String::as_str))?;
        }
        Ok(compacter)
    }

    /// Process-wide instance, created on first use
    ///
    /// Repeated traces rendered through it collapse into counted one-liners
    /// across every call site.
    pub fn shared() -> &'static StackTraceCompacter {
        static SHARED: OnceLock<StackTraceCompacter> = OnceLock::new();
        SHARED.get_or_init(StackTraceCompacter::new)
    }

    /// Append a collapse rule; affects subsequent compactions only
    pub fn add_collapse_rule<I, S>(&self, name: impl Into<String>, matchers: I) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.write().add_collapse_rule(name, matchers)
    }

    /// Register frames that must never be collapsed
    pub fn add_always_expand_rule<I, S>(&self, name: impl Into<String>, matchers: I) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.write().add_always_expand_rule(name, matchers)
    }

    /// Snapshot of the registered rules
    pub fn rules(&self) -> RuleSet {
        self.rules.read().clone()
    }

    /// Compact a raised error
    ///
    /// **Public** - main entry point
    ///
    /// # Returns
    /// * A sentinel for a missing error or missing/empty frames
    /// * The full uncompacted trace while the kill switch is off
    /// * `Here's a compacted exception ('<id>')` and the body on first sight
    /// * `Exception ('<id>') has been thrown #N times: ...` on repeats
    pub fn compact(&self, throwable: Option<&dyn Throwable>) -> String {
        let Some(throwable) = throwable else {
            return NO_EXCEPTION.to_string();
        };
        if !self.gate_open() {
            return render_full(throwable);
        }
        self.compact_collapsed(throwable)
    }

    /// Compact an error that is known to be present
    pub fn compact_error(&self, throwable: &dyn Throwable) -> String {
        self.compact(Some(throwable))
    }

    /// Parse a printed trace and compact it
    ///
    /// While the kill switch is off the text is returned exactly as given.
    /// Text that does not parse as a stack trace is returned unchanged.
    pub fn compact_text(&self, text: &str) -> String {
        if !self.gate_open() {
            return text.to_string();
        }
        match parse_printed_trace(text) {
            Ok(raised) => self.compact_collapsed(&raised),
            Err(err) => {
                warn!("Returning printed trace unchanged: {}", err);
                text.to_string()
            }
        }
    }

    /// Poll the kill switch, clearing the counts when it has just turned off
    fn gate_open(&self) -> bool {
        let poll = self.gate.poll();
        if poll.just_disabled() {
            self.dedup.clear();
        }
        poll.enabled
    }

    fn compact_collapsed(&self, throwable: &dyn Throwable) -> String {
        let trace = {
            let rules = self.rules.read();
            Trace::build(throwable, &rules)
        };
        if let Some(sentinel) = sentinel_for(&trace.body) {
            return sentinel.to_string();
        }

        let body = self.renderer.render_body(&trace);
        let count = self.dedup.record(&body);
        debug!(
            "Compacted '{}' into {} groups with {} causes, seen {} times",
            trace.description,
            trace.groups().len(),
            trace.causes().count(),
            count
        );

        self.renderer.render_with_header(&body, &trace.description, count)
    }

    /// Forget every occurrence count
    pub fn reset(&self) {
        self.dedup.clear();
    }

    /// Times a body with this fingerprint has been compacted
    pub fn occurrences(&self, fingerprint: u64) -> Option<usize> {
        self.dedup.count(fingerprint)
    }

    /// Distinct bodies currently tracked
    pub fn tracked_traces(&self) -> usize {
        self.dedup.len()
    }

    pub fn config(&self) -> &CompacterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Frame, RaisedError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn enabled_compacter() -> StackTraceCompacter {
        StackTraceCompacter::with_config(CompacterConfig::default(), || false)
    }

    fn sample_error() -> RaisedError {
        RaisedError::new("java.lang.Exception").with_frames(vec![
            Frame::at("com.app.Service", "handle", "Service.java", 10),
            Frame::new("sun.reflect.GeneratedMethodAccessor1", "invoke"),
        ])
    }

    #[test]
    fn test_missing_error_sentinel() {
        assert_eq!(enabled_compacter().compact(None), NO_EXCEPTION);
    }

    #[test]
    fn test_repeat_is_counted() {
        let compacter = enabled_compacter();
        let first = compacter.compact_error(&sample_error());
        let second = compacter.compact_error(&sample_error());

        assert!(first.starts_with("Here's a compacted exception ('"));
        assert!(second.starts_with("Exception ('"));
        assert!(second.contains("has been thrown #2 times: java.lang.Exception"));
        assert_eq!(compacter.tracked_traces(), 1);
    }

    #[test]
    fn test_reset_forgets_counts() {
        let compacter = enabled_compacter();
        compacter.compact_error(&sample_error());
        compacter.reset();
        let again = compacter.compact_error(&sample_error());
        assert!(again.starts_with("Here's a compacted exception"));
    }

    #[test]
    fn test_disabled_gate_bypasses_and_clears() {
        let disabled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&disabled);
        let config = CompacterConfig {
            check_interval_secs: 1,
            ..CompacterConfig::default()
        };
        let compacter = StackTraceCompacter::with_config(config, move || flag.load(Ordering::SeqCst));

        compacter.compact_error(&sample_error());
        assert_eq!(compacter.tracked_traces(), 1);

        // Source is read again only after the interval
        disabled.store(true, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let raw = compacter.compact_error(&sample_error());
        assert_eq!(
            raw,
            "java.lang.Exception\n\tat com.app.Service.handle(Service.java:10)\n\tat sun.reflect.GeneratedMethodAccessor1.invoke(Unknown Source)\n"
        );
        assert_eq!(compacter.tracked_traces(), 0);
    }

    #[test]
    fn test_zero_tunables_are_clamped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = CompacterConfig {
            cache_capacity: 0,
            check_interval_secs: 0,
            ..CompacterConfig::default()
        };
        let compacter = StackTraceCompacter::with_config(config, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        compacter.compact_error(&sample_error());
        let second = compacter.compact_error(&sample_error());
        assert!(second.contains("has been thrown #2 times"));
        assert_eq!(compacter.tracked_traces(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compact_text_falls_back_to_input() {
        let compacter = enabled_compacter();
        let text = "java.lang.Exception\n\tat nonsense\n";
        assert_eq!(compacter.compact_text(text), text);
        assert_eq!(compacter.tracked_traces(), 0);
    }

    #[test]
    fn test_from_settings_registers_rules() {
        let settings = CompacterSettings::from_toml_str(
            r#"
            [[collapse]]
            name = "-- Netty"
            matchers = ["io.netty."]

            [[expand]]
            name = "Internal"
            matchers = ["com.app.internal."]
            "#,
        )
        .unwrap();
        let compacter = StackTraceCompacter::from_settings(&settings).unwrap();
        let rules = compacter.rules();

        assert_eq!(rules.collapse_rules().last().unwrap().name(), "-- Netty");
        assert_eq!(rules.expand_rules().count(), 1);
    }

    #[test]
    fn test_from_settings_rejects_empty_rule() {
        let settings = CompacterSettings::from_toml_str("[[collapse]]\nname = \"-- None\"\nmatchers = []\n").unwrap();
        let result = StackTraceCompacter::from_settings(&settings);
        assert!(matches!(result, Err(ConfigError::Rule(RuleError::EmptyMatchers { .. }))));
    }
}

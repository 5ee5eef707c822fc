//! Time-gated switch deciding whether compaction runs at all.
//!
//! The external disable flag is read at most once per interval. Between
//! reads the last answer is reused, so a flipped flag is picked up within one
//! interval rather than immediately.

use log::{info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::time::{Duration, Instant};

/// External boolean consulted by the gate
pub trait DisableSource: Send + Sync {
    /// True when compaction must be turned off
    fn is_disabled(&self) -> bool;
}

impl<F> DisableSource for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_disabled(&self) -> bool {
        self()
    }
}

/// Compaction is disabled while the named environment variable is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDisableFlag {
    var: String,
}

impl EnvDisableFlag {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl DisableSource for EnvDisableFlag {
    fn is_disabled(&self) -> bool {
        std::env::var_os(&self.var).is_some()
    }
}

/// Result of one gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePoll {
    /// Compaction should run
    pub enabled: bool,
    /// The source was read during this check
    pub reevaluated: bool,
}

impl GatePoll {
    /// The source was just read and said "disabled"
    pub fn just_disabled(&self) -> bool {
        self.reevaluated && !self.enabled
    }
}

#[derive(Debug)]
struct GateState {
    last_check: Option<Instant>,
    enabled: bool,
}

pub struct RateGate {
    interval: Duration,
    source: Box<dyn DisableSource>,
    state: Mutex<GateState>,
}

impl fmt::Debug for RateGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGate")
            .field("interval", &self.interval)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl RateGate {
    /// Create a gate; the source is first read on the first poll
    pub fn new(interval: Duration, source: impl DisableSource + 'static) -> Self {
        Self {
            interval,
            source: Box::new(source),
            state: Mutex::new(GateState {
                last_check: None,
                enabled: true,
            }),
        }
    }

    /// Check the gate now
    pub fn poll(&self) -> GatePoll {
        self.poll_at(Instant::now())
    }

    /// Check the gate as of `now`
    pub fn poll_at(&self, now: Instant) -> GatePoll {
        let mut state = self.state.lock();
        let due = state
            .last_check
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            return GatePoll {
                enabled: state.enabled,
                reevaluated: false,
            };
        }

        state.last_check = Some(now);
        let enabled = !self.source.is_disabled();
        if enabled != state.enabled {
            if enabled {
                info!("Stack trace compaction re-enabled");
            } else {
                warn!("Stack trace compaction disabled by external flag");
            }
        }
        state.enabled = enabled;

        GatePoll {
            enabled,
            reevaluated: true,
        }
    }

    pub fn should_compact(&self) -> bool {
        self.poll().enabled
    }

    /// Last computed answer, without consulting the source
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

//! The kill switch that can turn compaction off process-wide.

pub mod rate_gate;

pub use rate_gate::{DisableSource, EnvDisableFlag, GatePoll, RateGate};

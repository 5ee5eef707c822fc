//! Stacktrace Compacter
//!
//! Compresses framework-noisy exception stack traces into a compact,
//! human-readable form and suppresses repeated rendering of identical traces.
//!
//! ## Getting Started
//!
//! ```
//! use stacktrace_compacter::{Frame, RaisedError, StackTraceCompacter};
//!
//! let compacter = StackTraceCompacter::new();
//! compacter
//!     .add_always_expand_rule("Internal", ["com.app.internal."])
//!     .unwrap();
//!
//! let err = RaisedError::new("java.lang.IllegalStateException")
//!     .with_message("boom")
//!     .with_frames(vec![
//!         Frame::at("com.app.Service", "handle", "Service.java", 42),
//!         Frame::at("org.apache.catalina.core.StandardWrapperValve", "invoke", "StandardWrapperValve.java", 198),
//!         Frame::at("org.apache.coyote.AbstractProcessorLight", "process", "AbstractProcessorLight.java", 66),
//!     ]);
//!
//! let text = compacter.compact_error(&err);
//! assert!(text.contains("-- Tomcat\t<2 lines>"));
//! ```
//!
//! Printed traces taken from log files can be compacted directly with
//! [`StackTraceCompacter::compact_text`].

pub mod collapse;
pub mod compacter;
pub mod dedup;
pub mod gate;
pub mod render;
pub mod rules;
pub mod trace;
pub mod utils;

// Public API exports
pub use collapse::{collapse, CollapsedGroup, Trace, TraceBody};
pub use compacter::StackTraceCompacter;
pub use dedup::{fingerprint, Deduplicator};
pub use gate::{DisableSource, EnvDisableFlag, GatePoll, RateGate};
pub use render::{render_full, Renderer};
pub use rules::{Rule, RuleKind, RuleSet};
pub use trace::{parse_printed_trace, Frame, RaisedError, Throwable};
pub use utils::config::{CompacterConfig, CompacterSettings, RuleEntry};
pub use utils::error::{ConfigError, ParseError, RuleError};

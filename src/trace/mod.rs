//! Input model: frames, raised errors, and printed-trace parsing.
//!
//! This module handles:
//! - The canonical text of a frame (what rules match against)
//! - The `Throwable` interface the compacter consumes
//! - Reading printed traces from log text

pub mod frame;
pub mod parser;
pub mod throwable;

// Re-export main types
pub use frame::Frame;
pub use parser::parse_printed_trace;
pub use throwable::{identity, RaisedError, Throwable};

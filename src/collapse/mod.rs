//! Reduction of raw frames into collapsed groups.
//!
//! This module transforms a throwable into:
//! - Collapsed groups, one per raw frame or per run of same-rule frames
//! - A trace chain covering every distinct cause

pub mod collapser;
pub mod trace;

// Re-export main types and functions
pub use collapser::{collapse, is_fully_merged, CollapsedGroup};
pub use trace::{Trace, TraceBody};

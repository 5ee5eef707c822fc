//! Final text output.

pub mod renderer;

pub use renderer::{compacted_header, render_full, repeated_header, sentinel_for, Renderer};

//! Text rendering of collapsed traces.
//!
//! Output for a first occurrence:
//! ```text
//! Here's a compacted exception ('1234567890')
//! java.lang.IllegalArgumentException: Note
//!     at com.app.Service.handle(Service.java:42)
//!     at     -- Reflection    <3 lines>    -- Spring    <5 lines>
//!     at com.app.Main.main(Main.java:7)
//! Caused by:
//! Here's a compacted exception ('987654321')
//! java.lang.IllegalStateException: keep off this
//!     at com.app.Repository.load(Repository.java:17)
//! ```
//!
//! Repeats of the same body print a single counted line instead.

use crate::collapse::{CollapsedGroup, Trace, TraceBody};
use crate::dedup::fingerprint;
use crate::trace::{identity, Throwable};
use crate::utils::config::{EMPTY_STACK_TRACE, MAX_PACKED_LINE_WIDTH, NO_STACK_TRACE};

const DEFAULT_LENGTH: usize = 512;
const FRAME_PREFIX: &str = "\n\tat ";
const CAUSED_BY: &str = "\nCaused by: \n";

/// Width `\tat ` occupies on a packed line
const FRAME_PREFIX_WIDTH: usize = 4;

/// Sentinel shown instead of a body that has no frames
pub fn sentinel_for(body: &TraceBody) -> Option<&'static str> {
    match body {
        TraceBody::NoStackTrace => Some(NO_STACK_TRACE),
        TraceBody::EmptyStackTrace => Some(EMPTY_STACK_TRACE),
        TraceBody::Groups(_) => None,
    }
}

/// Header line of a first occurrence
pub fn compacted_header(fingerprint: u64) -> String {
    format!("Here's a compacted exception ('{}')", fingerprint)
}

/// One-liner replacing the body of a repeated trace
pub fn repeated_header(fingerprint: u64, count: usize, description: &str) -> String {
    format!(
        "Exception ('{}') has been thrown #{} times: {}",
        fingerprint, count, description
    )
}

/// Renders collapsed traces, packing runs of collapsed labels onto shared lines
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    max_line_width: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(MAX_PACKED_LINE_WIDTH)
    }
}

impl Renderer {
    pub fn new(max_line_width: usize) -> Self {
        Self { max_line_width }
    }

    /// Render a trace, optionally with the occurrence header
    ///
    /// # Arguments
    /// * `trace` - Collapsed chain
    /// * `dedup_count` - How often this body has been seen, including now
    /// * `generate_header` - Prefix the header (top-level rendering)
    ///
    /// # Returns
    /// A sentinel when the trace has no frames, the counted one-liner when
    /// `dedup_count > 1`, the full body otherwise
    pub fn render(&self, trace: &Trace, dedup_count: usize, generate_header: bool) -> String {
        if let Some(sentinel) = sentinel_for(&trace.body) {
            return sentinel.to_string();
        }
        let body = self.render_body(trace);
        if !generate_header {
            return body;
        }
        self.render_with_header(&body, &trace.description, dedup_count)
    }

    /// Wrap an already rendered body in its header
    pub fn render_with_header(&self, body: &str, description: &str, dedup_count: usize) -> String {
        let fingerprint = fingerprint(body);
        if dedup_count > 1 {
            return format!("{}\n", repeated_header(fingerprint, dedup_count, description));
        }
        format!("{}\n{}\n", compacted_header(fingerprint), body)
    }

    /// Description, groups, then one section per cause
    ///
    /// This is the text the fingerprint is computed from.
    pub fn render_body(&self, trace: &Trace) -> String {
        let mut out = String::with_capacity(DEFAULT_LENGTH);
        self.render_own(trace, &mut out);

        for cause in trace.causes() {
            out.push_str(CAUSED_BY);
            match sentinel_for(&cause.body) {
                Some(sentinel) => out.push_str(sentinel),
                None => {
                    let mut own = String::with_capacity(DEFAULT_LENGTH);
                    self.render_own(cause, &mut own);
                    out.push_str(&compacted_header(fingerprint(&own)));
                    out.push('\n');
                    out.push_str(&own);
                }
            }
        }
        out
    }

    /// Description and groups of one trace, without causes
    fn render_own(&self, trace: &Trace, out: &mut String) {
        out.push_str(&trace.description);

        // Width of the open packed line, 0 when none is open
        let mut line_width = 0;
        for group in trace.groups() {
            if let CollapsedGroup::Raw(frame) = group {
                out.push_str(FRAME_PREFIX);
                out.push_str(&frame.to_string());
                line_width = 0;
                continue;
            }

            let label = group.to_string();
            let label_width = label.chars().count();
            if line_width > 0 && line_width + label_width > self.max_line_width {
                line_width = 0;
            }
            if line_width == 0 {
                out.push_str(FRAME_PREFIX);
                line_width = FRAME_PREFIX_WIDTH;
            }
            out.push_str(&label);
            line_width += label_width;
        }
    }
}

/// Uncompacted printed form of a whole chain, used while compaction is off
///
/// A cause seen before prints `Caused by: [CIRCULAR REFERENCE: ...]` and ends the output.
pub fn render_full(throwable: &dyn Throwable) -> String {
    let mut out = String::with_capacity(DEFAULT_LENGTH);
    write_raw(throwable, &mut out);

    let mut visited = vec![identity(throwable)];
    let mut next = throwable.cause();
    while let Some(cause) = next {
        if visited.contains(&identity(cause)) {
            out.push_str("\nCaused by: [CIRCULAR REFERENCE: ");
            out.push_str(&cause.description());
            out.push(']');
            break;
        }
        visited.push(identity(cause));
        out.push_str("\nCaused by: ");
        write_raw(cause, &mut out);
        next = cause.cause();
    }
    out.push('\n');
    out
}

fn write_raw(throwable: &dyn Throwable, out: &mut String) {
    out.push_str(&throwable.description());
    for frame in throwable.frames().unwrap_or_default() {
        out.push_str(FRAME_PREFIX);
        out.push_str(&frame.to_string());
    }
}

//! Parser for printed JVM-style stack traces.
//!
//! Turns text as it appears in log files back into a [`RaisedError`] chain:
//!
//! ```text
//! java.lang.IllegalArgumentException: Note
//!     at com.app.Service.handle(Service.java:42)
//!     at sun.reflect.GeneratedMethodAccessor12.invoke(Unknown Source)
//! Caused by: java.lang.IllegalStateException: keep off this
//!     at com.app.Repository.load(Repository.java:17)
//!     ... 1 more
//! ```

use super::frame::Frame;
use super::throwable::RaisedError;
use crate::utils::error::ParseError;
use log::{debug, trace};

const CAUSED_BY: &str = "Caused by: ";
const SUPPRESSED: &str = "Suppressed: ";
const CIRCULAR_REFERENCE: &str = "[CIRCULAR REFERENCE";

/// Parse a printed stack trace into an owned error chain
///
/// **Public** - main entry point for text input
///
/// # Arguments
/// * `text` - Printed trace, header line first
///
/// # Returns
/// The outermost error with its causes attached
///
/// # Errors
/// * `ParseError::EmptyInput` - No non-blank lines
/// * `ParseError::MissingHeader` - First line is already a frame
/// * `ParseError::InvalidFrame` - A frame or an unexpected line could not be read
pub fn parse_printed_trace(text: &str) -> Result<RaisedError, ParseError> {
    let mut sections: Vec<RaisedError> = Vec::new();
    let mut skipping_suppressed = false;

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indented = trimmed.len() != line.len();

        if sections.is_empty() {
            if trimmed.starts_with("at ") {
                return Err(ParseError::MissingHeader(trimmed.to_string()));
            }
            sections.push(parse_description(trimmed));
            continue;
        }

        if !indented {
            if let Some(rest) = trimmed.strip_prefix(CAUSED_BY) {
                if rest.starts_with(CIRCULAR_REFERENCE) {
                    trace!("Circular reference marker on line {}", index + 1);
                    break;
                }
                skipping_suppressed = false;
                sections.push(parse_description(rest));
                continue;
            }
        }

        if skipping_suppressed {
            continue;
        }

        if indented && (trimmed.starts_with(SUPPRESSED) || trimmed.starts_with(CAUSED_BY)) {
            skipping_suppressed = true;
            continue;
        }

        if let Some(frame_text) = trimmed.strip_prefix("at ") {
            let frame = parse_frame(frame_text).ok_or_else(|| ParseError::InvalidFrame {
                line: index + 1,
                text: trimmed.to_string(),
            })?;
            push_frame(&mut sections, frame);
            continue;
        }

        if let Some(count) = parse_elided_count(trimmed) {
            copy_enclosing_tail(&mut sections, count);
            continue;
        }

        // Multi-line messages continue the description until the first frame
        if let Some(current) = sections.last_mut() {
            if current.frames.as_ref().map_or(true, |frames| frames.is_empty()) {
                let message = current.message.get_or_insert_with(String::new);
                message.push('\n');
                message.push_str(line);
                continue;
            }
        }

        return Err(ParseError::InvalidFrame {
            line: index + 1,
            text: trimmed.to_string(),
        });
    }

    debug!("Parsed printed trace with {} sections", sections.len());

    let mut chain = sections.pop().ok_or(ParseError::EmptyInput)?;
    while let Some(outer) = sections.pop() {
        chain = outer.with_cause(chain);
    }
    Ok(chain)
}

/// Split `type: message` into its parts
fn parse_description(text: &str) -> RaisedError {
    match text.split_once(": ") {
        Some((type_name, message)) => RaisedError::new(type_name.trim()).with_message(message),
        None => RaisedError::new(text.trim_end_matches(':').trim()),
    }
}

/// Parse the text after `at ` into a frame
///
/// Trailing packaging hints such as `~[app.jar:?]` are dropped.
fn parse_frame(text: &str) -> Option<Frame> {
    let open = text.find('(')?;
    let close = open + text[open..].find(')')?;
    let (owning_type, method) = text[..open].rsplit_once('.')?;
    if owning_type.is_empty() || method.is_empty() {
        return None;
    }
    let frame = Frame::new(owning_type, method);

    let location = &text[open + 1..close];
    let frame = match location {
        "Native Method" => frame.native(),
        "Unknown Source" | "" => frame,
        _ => match location.rsplit_once(':') {
            Some((file, line)) => match line.parse::<u32>() {
                Ok(line) => frame.with_location(file, Some(line)),
                Err(_) => frame.with_location(location, None),
            },
            None => frame.with_location(location, None),
        },
    };
    Some(frame)
}

/// Read `... N more`, or logback's `... N common frames omitted`
fn parse_elided_count(text: &str) -> Option<usize> {
    let rest = text.strip_prefix("... ")?;
    rest.strip_suffix(" more")
        .or_else(|| rest.strip_suffix(" common frames omitted"))?
        .trim()
        .parse()
        .ok()
}

fn push_frame(sections: &mut [RaisedError], frame: Frame) {
    if let Some(current) = sections.last_mut() {
        current.push_frame(frame);
    }
}

/// `... N more` means the last N frames equal those of the enclosing trace
fn copy_enclosing_tail(sections: &mut [RaisedError], count: usize) {
    let len = sections.len();
    if len < 2 {
        return;
    }
    let (enclosing, current) = sections.split_at_mut(len - 1);
    let tail: Vec<Frame> = enclosing[len - 2]
        .frames
        .as_deref()
        .map(|frames| {
            let start = frames.len().saturating_sub(count);
            frames[start..].to_vec()
        })
        .unwrap_or_default();
    for frame in tail {
        current[0].push_frame(frame);
    }
}

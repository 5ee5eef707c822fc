//! The raised-error interface the compacter consumes.
//!
//! Callers either implement [`Throwable`] for their own error model or build
//! a [`RaisedError`] (directly or through the printed-trace parser).

use super::frame::Frame;

/// A raised error: description, frames and an optional cause
///
/// Cause chains may be cyclic. The compacter tracks visited causes by their
/// address, so an implementation may return `Some(self)` from `cause`.
pub trait Throwable {
    /// Single-line description, e.g. `java.lang.IllegalStateException: boom`
    fn description(&self) -> String;

    /// Captured frames, innermost first; `None` when no trace was captured
    fn frames(&self) -> Option<&[Frame]>;

    /// The error this one was raised from
    fn cause(&self) -> Option<&dyn Throwable>;
}

/// Address of a throwable, used to detect revisited causes
pub fn identity(throwable: &dyn Throwable) -> *const () {
    throwable as *const dyn Throwable as *const ()
}

/// Owned, acyclic error model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedError {
    pub type_name: String,
    pub message: Option<String>,
    pub frames: Option<Vec<Frame>>,
    pub cause: Option<Box<RaisedError>>,
}

impl RaisedError {
    /// Create an error of the given type with an empty frame list
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: None,
            frames: Some(Vec::new()),
            cause: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Mark the error as having no captured stack trace at all
    pub fn without_frames(mut self) -> Self {
        self.frames = None;
        self
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.get_or_insert_with(Vec::new).push(frame);
    }

    pub fn with_cause(mut self, cause: RaisedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl Throwable for RaisedError {
    fn description(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {}", self.type_name, message),
            None => self.type_name.clone(),
        }
    }

    fn frames(&self) -> Option<&[Frame]> {
        self.frames.as_deref()
    }

    fn cause(&self) -> Option<&dyn Throwable> {
        self.cause.as_deref().map(|cause| cause as &dyn Throwable)
    }
}

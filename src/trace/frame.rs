//! A single call-site entry of a stack trace.

use std::fmt;

/// One stack frame as reported by the caller's runtime
///
/// Frames are immutable once built. Their `Display` output is the canonical
/// text rules match against: `type.method(File.java:12)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Declaring type, e.g. `org.apache.catalina.core.StandardWrapperValve`
    pub owning_type: String,

    /// Method name
    pub method: String,

    /// Source file, if known
    pub file: Option<String>,

    /// Line number, if known
    pub line: Option<u32>,

    /// Frame belongs to native code
    pub native: bool,
}

impl Frame {
    /// Create a frame with no location information
    pub fn new(owning_type: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            owning_type: owning_type.into(),
            method: method.into(),
            file: None,
            line: None,
            native: false,
        }
    }

    /// Create a frame with file and line
    pub fn at(
        owning_type: impl Into<String>,
        method: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self::new(owning_type, method).with_location(file, Some(line))
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.owning_type, self.method)?;
        match (&self.file, self.line) {
            _ if self.native => f.write_str("Native Method")?,
            (Some(file), Some(line)) => write!(f, "{}:{}", file, line)?,
            (Some(file), None) => f.write_str(file)?,
            (None, _) => f.write_str("Unknown Source")?,
        }
        f.write_str(")")
    }
}

//! Normalized fault record.
//!
//! Recoverable error signals, native errors and panics all become a
//! [`Fault`] before they reach the handler chain. The [`FaultKind`] tag keeps
//! track of where the record came from, so downstream consumers never have
//! to inspect the payload type.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::error::Error;
use std::fmt;
use std::panic::PanicHookInfo;

/// Origin of a fault record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    /// Synthesized from a recoverable error signal.
    Converted,
    /// A genuine error value or panic.
    Native,
}

/// Source location a fault originated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl Location {
    /// Create a location from a file path and line.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&std::panic::Location<'_>> for Location {
    fn from(loc: &std::panic::Location<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A detected fault flowing through the dispatch pipeline.
///
/// Severity is fixed when the record is built. Handlers that want to change
/// what the rest of the chain sees return a *replacement* record; use
/// [`Fault::with_message`] to keep the original classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Fault {
    severity: Severity,
    message: String,
    location: Option<Location>,
    kind: FaultKind,
}

assert_impl_all!(Fault: Send, Sync, Clone, Error);

impl Fault {
    /// Build a `Converted` fault from a recoverable error signal.
    pub fn converted(
        severity: Severity,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
            kind: FaultKind::Converted,
        }
    }

    /// Build a `Native` fault. Native faults are classified as `ERROR`.
    pub fn native(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity: Severity::ERROR,
            message: message.into(),
            location,
            kind: FaultKind::Native,
        }
    }

    /// Build a `Native` fault from an error value and its `source()` chain.
    pub fn from_error(err: &(dyn Error + 'static), location: Option<Location>) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::native(message, location)
    }

    /// Build a `Native` fault from a panic.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self::native(message, info.location().map(Location::from))
    }

    /// Replacement record with a new message; severity, location and kind are kept.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Shorthand for `kind() == FaultKind::Converted`.
    pub fn is_converted(&self) -> bool {
        self.kind == FaultKind::Converted
    }
}

//! Prelude module for common re-exports.
//!
//! ```rust
//! use fault_common::prelude::*;
//! ```

// ─── Classification ─────────────────────────────────────────────────
pub use crate::severity::{Severity, is_fatal, is_reportable};

// ─── Fault Record ───────────────────────────────────────────────────
pub use crate::fault::{Fault, FaultKind, Location};

// ─── Contracts ──────────────────────────────────────────────────────
pub use crate::handler::{Handler, PageRenderer};
pub use crate::host::{Host, ResponseStatus};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, DispatchConfig, ErrorPageKind, FaultConfig, HostConfig, LogLevel,
    SharedConfig,
};

//! Fault Common Library
//!
//! Shared vocabulary for the fault interception pipeline: the normalized
//! fault record, severity masks, and the contracts that pluggable handlers
//! and the hosting process implement.
//!
//! # Module Structure
//!
//! - [`severity`] - Severity bitflags and the reportable/fatal classifier
//! - [`fault`] - Normalized fault record (`Fault`, `FaultKind`, `Location`)
//! - [`handler`] - `Handler` and `PageRenderer` contracts
//! - [`host`] - `Host` contract (live reporting mask, last fault, termination)
//! - [`config`] - TOML configuration loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use fault_common::prelude::*;
//!
//! let fault = Fault::converted(Severity::WARNING, "disk almost full", None);
//! assert!(is_reportable(fault.severity(), Severity::all()));
//! assert!(!is_fatal(fault.severity(), Severity::FATAL_DEFAULT));
//! ```

pub mod config;
pub mod fault;
pub mod handler;
pub mod host;
pub mod prelude;
pub mod severity;

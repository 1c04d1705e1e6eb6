//! # Host Trait
//!
//! Everything the dispatcher needs from the surrounding process: the live
//! reporting mask, the display setting, the last fault that escaped normal
//! handling, response status, page output and termination.
//!
//! `fault_dispatch::host::ProcessHost` is the production implementation.
//! Tests implement this trait with recording doubles so that `terminate`
//! can be observed instead of exiting.

use crate::fault::Fault;
use crate::severity::Severity;

/// User-visible response status emitted while a fault is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseStatus {
    /// Normal operation.
    #[default]
    Ok,
    /// A fault is being handled.
    InternalFailure,
}

impl ResponseStatus {
    /// HTTP-style status code.
    pub const fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::InternalFailure => 500,
        }
    }
}

/// Process-side collaborator of the dispatcher.
pub trait Host: Send + Sync {
    /// Severities currently eligible for handling. Read on every fault, never cached.
    fn reportable_mask(&self) -> Severity;

    /// Whether faults are displayed by default. Read once when a dispatcher is built.
    fn display_errors(&self) -> bool;

    /// Most recent fault that bypassed synchronous handling, if any.
    fn last_fault(&self) -> Option<Fault>;

    /// Remember a fault that bypassed synchronous handling so the shutdown
    /// check can still see it. Hosts without a last-fault slot ignore it.
    fn record_fault(&self, _fault: Fault) {}

    /// Record the response status for the current unit of work.
    fn set_response_status(&self, status: ResponseStatus);

    /// Write a rendered fault page to the user-facing output.
    fn emit(&self, page: &str);

    /// End the process.
    ///
    /// Production hosts do not return. Test hosts record the call and return.
    fn terminate(&self);
}

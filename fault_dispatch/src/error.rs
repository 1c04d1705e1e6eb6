//! Error types for dispatch and registration.

use fault_common::fault::Fault;
use thiserror::Error;

/// Errors surfaced by the dispatcher entry points.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Throw mode is on: the recoverable fault was raised to the caller
    /// instead of being dispatched. The fatal check did not run.
    #[error("fault raised as error: {0}")]
    Raised(#[source] Fault),
}

impl DispatchError {
    /// The fault carried by this error.
    pub fn fault(&self) -> &Fault {
        match self {
            Self::Raised(fault) => fault,
        }
    }

    pub fn into_fault(self) -> Fault {
        match self {
            Self::Raised(fault) => fault,
        }
    }
}

/// Errors from process-wide hook registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// Another dispatcher is already installed in this process.
    #[error("a fault dispatcher is already registered in this process")]
    AlreadyRegistered,
}

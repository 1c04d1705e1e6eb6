//! # Fault Dispatch
//!
//! Interception-and-dispatch pipeline for process faults.
//!
//! Three entry points feed a single [`Dispatcher`]:
//!
//! - recoverable error signals ([`Dispatcher::handle_recoverable`]),
//! - uncaught faults and panics ([`Dispatcher::handle_uncaught`]),
//! - the shutdown-time fatal check ([`Dispatcher::handle_shutdown`]).
//!
//! Each fault is classified against the host's live reporting mask, threaded
//! through the [`HandlerChain`] (last registered runs first) and, when its
//! severity is fatal, the process is terminated once the chain completes.
//!
//! # Module Structure
//!
//! - [`chain`] - Ordered handler collection with reverse-order fold
//! - [`dispatcher`] - The three entry points and termination policy
//! - [`error`] - `DispatchError`, `HookError`
//! - [`hooks`] - Scoped process-wide registration (panic hook install/restore)
//! - [`host`] - `ProcessHost`, the production `Host`
//! - [`handlers`] - Log and capture handlers
//! - [`render`] - Error page renderers
//!
//! # Architecture
//!
//! ```text
//!  report() ──────┐
//!  panic hook ────┼──► Dispatcher ──► classify ──► HandlerChain (LIFO fold)
//!  shutdown() ────┘        │                              │
//!                          │                              ▼
//!                          └──── Host ◄── page / status / terminate
//! ```

pub mod chain;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod host;
pub mod render;

pub use crate::chain::HandlerChain;
pub use crate::dispatcher::{DispatchState, Dispatcher, Visibility};
pub use crate::error::{DispatchError, HookError};
pub use crate::hooks::{DispatcherLock, HookGuard, SharedDispatcher, register};
pub use crate::host::ProcessHost;

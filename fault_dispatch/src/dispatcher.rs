//! Fault dispatcher.
//!
//! Receives faults from three entry points, normalizes them into a
//! [`Fault`], classifies them and threads them through the [`HandlerChain`].
//!
//! ## Decision Table
//!
//! | reportable | throw mode | fatal | outcome                                   |
//! |------------|------------|-------|-------------------------------------------|
//! | no         | -          | no    | `Ok(true)`, no handler runs               |
//! | no         | -          | yes   | terminate, no handler runs                |
//! | yes        | on         | -     | `Err(Raised)`, no handler, no fatal check |
//! | yes        | off        | no    | chain runs, `Ok(true)`                    |
//! | yes        | off        | yes   | chain runs, then terminate                |
//!
//! The throw-mode row skips the fatal check: the raised fault is expected to
//! come back through the shutdown path if it ends the process.
//!
//! ## State Machine
//!
//! `Idle → Dispatching → Idle` for every entry point call, or
//! `Dispatching → Terminated` once a fatal fault is confirmed. `Terminated`
//! is final; later calls are ignored and `Host::terminate` runs at most once.
//! A handler panic unwinding out of the chain puts the dispatcher back to
//! `Idle`.

use crate::chain::HandlerChain;
use crate::error::DispatchError;
use crate::render;
use fault_common::config::DispatchConfig;
use fault_common::fault::{Fault, Location};
use fault_common::handler::{Handler, PageRenderer};
use fault_common::host::{Host, ResponseStatus};
use fault_common::severity::{Severity, is_fatal, is_reportable};
use static_assertions::assert_impl_all;
use std::sync::Arc;
use tracing::{debug, error};

/// Lifecycle state of a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching,
    Terminated,
}

/// Puts a dispatcher back to `Idle` when the chain unwinds.
struct UnwindReset<'a>(&'a mut DispatchState);

impl Drop for UnwindReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            *self.0 = DispatchState::Idle;
        }
    }
}

/// Whether the host's default fault reporting should still happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Native default reporting stands (e.g. the previous panic hook prints).
    Default,
    /// A fault page was emitted in its place.
    Suppressed,
}

/// Orchestrates classification, handler dispatch and termination.
pub struct Dispatcher {
    host: Arc<dyn Host>,
    chain: HandlerChain,
    silence_all: bool,
    throw_as_exception: bool,
    fatal_mask: Severity,
    error_page: Option<Arc<dyn PageRenderer>>,
    state: DispatchState,
}

assert_impl_all!(Dispatcher: Send);

impl Dispatcher {
    /// Create a dispatcher with the default fatal mask.
    ///
    /// Starts silenced when the host does not display errors.
    pub fn new(host: Arc<dyn Host>) -> Self {
        let silence_all = !host.display_errors();
        Self {
            host,
            chain: HandlerChain::new(),
            silence_all,
            throw_as_exception: false,
            fatal_mask: Severity::FATAL_DEFAULT,
            error_page: None,
            state: DispatchState::Idle,
        }
    }

    /// Create a dispatcher and push `handlers` in iteration order.
    pub fn with_handlers(
        host: Arc<dyn Host>,
        handlers: impl IntoIterator<Item = Arc<dyn Handler>>,
    ) -> Self {
        let mut dispatcher = Self::new(host);
        for handler in handlers {
            dispatcher.push_handler(handler);
        }
        dispatcher
    }

    /// Create a dispatcher from the `[dispatch]` config section.
    pub fn from_config(host: Arc<dyn Host>, config: &DispatchConfig) -> Self {
        let mut dispatcher = Self::new(host);
        if let Some(silence) = config.silence_all {
            dispatcher.silence_all = silence;
        }
        dispatcher.throw_as_exception = config.throw_as_exception;
        dispatcher.fatal_mask = config.fatal_mask;
        dispatcher.error_page = render::page_for(config.error_page);
        dispatcher
    }

    // ─── Handler Chain ──────────────────────────────────────────────

    pub fn push_handler(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.chain.push(handler);
        self
    }

    pub fn pop_handler(&mut self) -> Option<Arc<dyn Handler>> {
        self.chain.pop()
    }

    /// Registered handlers in registration order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        self.chain.list()
    }

    pub fn clear_handlers(&mut self) -> &mut Self {
        self.chain.clear();
        self
    }

    // ─── Policy ─────────────────────────────────────────────────────

    pub fn silence_all_errors(&mut self, silence: bool) {
        self.silence_all = silence;
    }

    pub fn is_silenced(&self) -> bool {
        self.silence_all
    }

    /// Raise recoverable faults to the caller instead of dispatching them.
    pub fn treat_errors_as_exceptions(&mut self, throw: bool) {
        self.throw_as_exception = throw;
    }

    pub fn throws_as_exceptions(&self) -> bool {
        self.throw_as_exception
    }

    pub fn set_error_page(&mut self, page: Option<Arc<dyn PageRenderer>>) {
        self.error_page = page;
    }

    pub fn fatal_mask(&self) -> Severity {
        self.fatal_mask
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    // ─── Entry Points ───────────────────────────────────────────────

    /// Recoverable error entry point.
    ///
    /// Returns `Ok(true)` when the fault was handled (or deliberately
    /// ignored) and the native default behaviour should be suppressed.
    ///
    /// # Errors
    ///
    /// `DispatchError::Raised` when throw mode is on and the severity is
    /// reportable. No handler runs and the fatal check is skipped.
    pub fn handle_recoverable(
        &mut self,
        severity: Severity,
        message: &str,
        location: Option<Location>,
    ) -> Result<bool, DispatchError> {
        if self.state == DispatchState::Terminated {
            debug!(%severity, "dispatcher terminated, fault ignored");
            return Ok(true);
        }

        if !is_reportable(severity, self.host.reportable_mask()) {
            debug!(%severity, "fault below reporting mask");
            if is_fatal(severity, self.fatal_mask) {
                self.terminate(severity);
            }
            return Ok(true);
        }

        let fault = Fault::converted(severity, message, location);

        if self.throw_as_exception {
            debug!(%severity, "raising fault to caller");
            return Err(DispatchError::Raised(fault));
        }

        self.state = DispatchState::Dispatching;
        self.dispatch(fault);

        if is_fatal(severity, self.fatal_mask) {
            self.terminate(severity);
        } else {
            self.state = DispatchState::Idle;
        }
        Ok(true)
    }

    /// Uncaught fault entry point.
    pub fn handle_uncaught(&mut self, fault: Fault) -> Visibility {
        if self.state == DispatchState::Terminated {
            debug!("dispatcher terminated, fault ignored");
            return Visibility::Default;
        }

        self.state = DispatchState::Dispatching;
        let visibility = self.dispatch(fault);
        self.state = DispatchState::Idle;
        visibility
    }

    /// Shutdown-time fatal check.
    ///
    /// Disables throw mode for good: raising is not possible this late.
    /// Re-dispatches the host's last fault if it is fatal.
    pub fn handle_shutdown(&mut self) -> Result<(), DispatchError> {
        self.throw_as_exception = false;

        let Some(last) = self.host.last_fault() else {
            return Ok(());
        };
        if is_fatal(last.severity(), self.fatal_mask) {
            debug!(severity = %last.severity(), "fatal fault found at shutdown");
            self.handle_recoverable(last.severity(), last.message(), last.location().cloned())?;
        }
        Ok(())
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn dispatch(&mut self, fault: Fault) -> Visibility {
        self.host.set_response_status(ResponseStatus::InternalFailure);

        let fault = {
            let _reset = UnwindReset(&mut self.state);
            self.chain.run(fault)
        };

        if self.silence_all && !fault.is_converted() {
            if let Some(page) = &self.error_page {
                self.host.emit(&page.render(&fault));
                return Visibility::Suppressed;
            }
        }
        Visibility::Default
    }

    fn terminate(&mut self, severity: Severity) {
        error!(%severity, "fatal fault, terminating process");
        self.state = DispatchState::Terminated;
        self.host.terminate();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chain", &self.chain)
            .field("silence_all", &self.silence_all)
            .field("throw_as_exception", &self.throw_as_exception)
            .field("fatal_mask", &self.fatal_mask)
            .field("error_page", &self.error_page.is_some())
            .field("state", &self.state)
            .finish()
    }
}

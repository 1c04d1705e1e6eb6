//! Process-wide registration.
//!
//! [`register`] installs a dispatcher as the process's fault hooks and
//! returns a [`HookGuard`]. The guard is the registration: dropping it (or
//! calling [`HookGuard::deregister`]) restores the panic hook that was
//! active before. Only one guard may exist per process.
//!
//! | Entry point  | Wiring                                                  |
//! |--------------|---------------------------------------------------------|
//! | recoverable  | [`HookGuard::report`] / [`HookGuard::report_at`]        |
//! | uncaught     | panic hook or [`HookGuard::uncaught`] → `handle_uncaught` |
//! | shutdown     | [`HookGuard::shutdown`], called before exit             |
//!
//! ## Re-entrancy
//!
//! A fault raised on the thread that is currently dispatching (typically a
//! handler that panics) never re-enters the dispatcher. Panics go straight
//! to the previous hook and are recorded as the host's last fault for the
//! shutdown check; reported faults return `Ok(false)` so the caller falls
//! back to its default behaviour. Faults from other threads wait on the
//! dispatcher lock and are dispatched in turn.
//!
//! Every way of locking the dispatcher, including [`SharedDispatcher::lock`],
//! marks the thread as dispatching for as long as the lock is held.

use crate::dispatcher::{Dispatcher, Visibility};
use crate::error::{DispatchError, HookError};
use fault_common::fault::{Fault, Location};
use fault_common::host::Host;
use fault_common::severity::Severity;
use parking_lot::{Mutex, MutexGuard};
use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

type PanicHook = dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static;

static REGISTERED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static IN_DISPATCH: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as dispatching until dropped.
struct DispatchScope;

impl DispatchScope {
    fn enter() -> Option<Self> {
        if IN_DISPATCH.get() {
            return None;
        }
        IN_DISPATCH.set(true);
        Some(Self)
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        IN_DISPATCH.set(false);
    }
}

/// Dispatcher shared between the application, the guard and the panic hook.
#[derive(Clone)]
pub struct SharedDispatcher {
    inner: Arc<Mutex<Dispatcher>>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dispatcher)),
        }
    }

    /// Lock the dispatcher.
    ///
    /// A panic on this thread while the lock is held goes to the previous
    /// hook instead of waiting for the lock. Must not be called from a
    /// handler of the same dispatcher.
    pub fn lock(&self) -> DispatcherLock<'_> {
        let guard = self.inner.lock();
        DispatcherLock {
            guard,
            _scope: DispatchScope::enter(),
        }
    }

    fn downgrade(&self) -> Weak<Mutex<Dispatcher>> {
        Arc::downgrade(&self.inner)
    }
}

impl std::fmt::Debug for SharedDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(dispatcher) => f.debug_tuple("SharedDispatcher").field(&*dispatcher).finish(),
            None => f.write_str("SharedDispatcher(<locked>)"),
        }
    }
}

/// Exclusive access to a [`SharedDispatcher`].
pub struct DispatcherLock<'a> {
    guard: MutexGuard<'a, Dispatcher>,
    _scope: Option<DispatchScope>,
}

impl Deref for DispatcherLock<'_> {
    type Target = Dispatcher;

    fn deref(&self) -> &Dispatcher {
        &self.guard
    }
}

impl DerefMut for DispatcherLock<'_> {
    fn deref_mut(&mut self) -> &mut Dispatcher {
        &mut self.guard
    }
}

/// State captured by the installed panic hook.
struct Installed {
    dispatcher: Weak<Mutex<Dispatcher>>,
    host: Arc<dyn Host>,
    active: Arc<AtomicBool>,
    previous: Arc<PanicHook>,
}

/// Install `dispatcher` as the process's fault hooks.
///
/// # Errors
///
/// `HookError::AlreadyRegistered` while another guard is alive.
pub fn register(dispatcher: SharedDispatcher) -> Result<HookGuard, HookError> {
    if REGISTERED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(HookError::AlreadyRegistered);
    }

    let previous: Arc<PanicHook> = Arc::from(panic::take_hook());
    let active = Arc::new(AtomicBool::new(true));
    let installed = Installed {
        dispatcher: dispatcher.downgrade(),
        host: Arc::clone(dispatcher.inner.lock().host()),
        active: Arc::clone(&active),
        previous: Arc::clone(&previous),
    };
    panic::set_hook(Box::new(move |info| on_panic(&installed, info)));

    info!("fault dispatcher registered");
    Ok(HookGuard {
        dispatcher,
        previous: Some(previous),
        active,
    })
}

fn on_panic(installed: &Installed, info: &PanicHookInfo<'_>) {
    let previous = &*installed.previous;
    if !installed.active.load(Ordering::SeqCst) {
        previous(info);
        return;
    }
    let Some(dispatcher) = installed.dispatcher.upgrade() else {
        previous(info);
        return;
    };
    let Some(_scope) = DispatchScope::enter() else {
        warn!("panic while dispatching a fault, passing to previous hook");
        installed.host.record_fault(Fault::from_panic(info));
        previous(info);
        return;
    };

    let visibility = dispatcher.lock().handle_uncaught(Fault::from_panic(info));
    if visibility == Visibility::Default {
        previous(info);
    }
}

/// Scoped registration of a dispatcher. Restores the previous hooks on drop.
pub struct HookGuard {
    dispatcher: SharedDispatcher,
    previous: Option<Arc<PanicHook>>,
    active: Arc<AtomicBool>,
}

impl HookGuard {
    pub fn dispatcher(&self) -> &SharedDispatcher {
        &self.dispatcher
    }

    /// Report a recoverable fault at the caller's location.
    #[track_caller]
    pub fn report(
        &self,
        severity: Severity,
        message: impl AsRef<str>,
    ) -> Result<bool, DispatchError> {
        let location = Location::from(panic::Location::caller());
        self.report_at(severity, message.as_ref(), Some(location))
    }

    /// Report a recoverable fault with an explicit location.
    ///
    /// Returns `Ok(false)` without dispatching when called from a handler
    /// of the same dispatcher.
    pub fn report_at(
        &self,
        severity: Severity,
        message: &str,
        location: Option<Location>,
    ) -> Result<bool, DispatchError> {
        let Some(_scope) = DispatchScope::enter() else {
            warn!(%severity, "fault reported while dispatching, left to default handling");
            return Ok(false);
        };
        self.dispatcher
            .inner
            .lock()
            .handle_recoverable(severity, message, location)
    }

    /// Dispatch a fault nobody caught, such as an error that reached `main`.
    ///
    /// Returns `Visibility::Default` without dispatching when called from a
    /// handler of the same dispatcher.
    pub fn uncaught(&self, fault: Fault) -> Visibility {
        let Some(_scope) = DispatchScope::enter() else {
            warn!("uncaught fault while dispatching, left to default handling");
            return Visibility::Default;
        };
        self.dispatcher.inner.lock().handle_uncaught(fault)
    }

    /// Run the shutdown-time fatal check.
    pub fn shutdown(&self) -> Result<(), DispatchError> {
        let Some(_scope) = DispatchScope::enter() else {
            warn!("shutdown requested while dispatching, skipped");
            return Ok(());
        };
        self.dispatcher.inner.lock().handle_shutdown()
    }

    /// Restore the previous hooks. Same as dropping the guard.
    pub fn deregister(self) {
        drop(self);
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        // set_hook panics on a panicking thread; our hook stays installed
        // but forwards everything to `previous` once inactive.
        if !std::thread::panicking() {
            if let Some(previous) = self.previous.take() {
                panic::set_hook(Box::new(move |info| previous(info)));
            }
        }
        REGISTERED.store(false, Ordering::SeqCst);
        info!("fault dispatcher deregistered");
    }
}

impl std::fmt::Debug for HookGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookGuard")
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

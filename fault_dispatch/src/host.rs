//! Production host.
//!
//! Holds the live reporting mask in an atomic so it can be changed from any
//! thread between faults, keeps the last fault that escaped synchronous
//! handling for the shutdown check, and exits the process on termination.

use fault_common::config::HostConfig;
use fault_common::fault::Fault;
use fault_common::host::{Host, ResponseStatus};
use fault_common::severity::Severity;
use parking_lot::Mutex;
use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, warn};

/// `Host` backed by the current process.
#[derive(Debug)]
pub struct ProcessHost {
    reporting: AtomicU32,
    display_errors: AtomicBool,
    failed: AtomicBool,
    last_fault: Mutex<Option<Fault>>,
    exit_code: i32,
}

impl ProcessHost {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            reporting: AtomicU32::new(config.reporting.bits()),
            display_errors: AtomicBool::new(config.display_errors),
            failed: AtomicBool::new(false),
            last_fault: Mutex::new(None),
            exit_code: config.exit_code,
        }
    }

    /// Replace the live reporting mask. Returns the previous mask.
    pub fn set_reporting(&self, mask: Severity) -> Severity {
        let previous = self.reporting.swap(mask.bits(), Ordering::SeqCst);
        Severity::from_bits_truncate(previous)
    }

    /// Change the display setting. Affects dispatchers built afterwards.
    pub fn set_display_errors(&self, display: bool) {
        self.display_errors.store(display, Ordering::SeqCst);
    }

    /// Drop the recorded fault.
    pub fn clear_last_fault(&self) -> Option<Fault> {
        self.last_fault.lock().take()
    }

    /// Last status set through [`Host::set_response_status`].
    pub fn response_status(&self) -> ResponseStatus {
        if self.failed.load(Ordering::SeqCst) {
            ResponseStatus::InternalFailure
        } else {
            ResponseStatus::Ok
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl Default for ProcessHost {
    fn default() -> Self {
        Self::new(&HostConfig::default())
    }
}

impl Host for ProcessHost {
    fn reportable_mask(&self) -> Severity {
        Severity::from_bits_truncate(self.reporting.load(Ordering::SeqCst))
    }

    fn display_errors(&self) -> bool {
        self.display_errors.load(Ordering::SeqCst)
    }

    fn last_fault(&self) -> Option<Fault> {
        self.last_fault.lock().clone()
    }

    fn record_fault(&self, fault: Fault) {
        debug!(severity = %fault.severity(), "fault recorded for shutdown check");
        *self.last_fault.lock() = Some(fault);
    }

    fn set_response_status(&self, status: ResponseStatus) {
        self.failed
            .store(status == ResponseStatus::InternalFailure, Ordering::SeqCst);
    }

    fn emit(&self, page: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(page.as_bytes()).and_then(|()| out.flush()) {
            warn!("failed to write fault page: {e}");
        }
    }

    fn terminate(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        process::exit(self.exit_code);
    }
}

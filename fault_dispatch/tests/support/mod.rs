//! Shared test doubles: a recording host and a recording handler.
//!
//! Both write into one ordered event log so tests can assert on the exact
//! interleaving of handler calls, page output and termination.

#![allow(dead_code)]

use fault_common::fault::Fault;
use fault_common::handler::Handler;
use fault_common::host::{Host, ResponseStatus};
use fault_common::severity::Severity;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Host double. `terminate` is recorded instead of exiting.
pub struct RecordingHost {
    reporting: AtomicU32,
    display: bool,
    last: Mutex<Option<Fault>>,
    status: Mutex<ResponseStatus>,
    events: EventLog,
}

impl RecordingHost {
    pub fn new(events: &EventLog) -> Arc<Self> {
        Self::with_display(events, true)
    }

    pub fn with_display(events: &EventLog, display: bool) -> Arc<Self> {
        Arc::new(Self {
            reporting: AtomicU32::new(Severity::all().bits()),
            display,
            last: Mutex::new(None),
            status: Mutex::new(ResponseStatus::Ok),
            events: Arc::clone(events),
        })
    }

    pub fn set_reporting(&self, mask: Severity) {
        self.reporting.store(mask.bits(), Ordering::SeqCst);
    }

    pub fn set_last_fault(&self, fault: Option<Fault>) {
        *self.last.lock() = fault;
    }

    pub fn status(&self) -> ResponseStatus {
        *self.status.lock()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

impl Host for RecordingHost {
    fn reportable_mask(&self) -> Severity {
        Severity::from_bits_truncate(self.reporting.load(Ordering::SeqCst))
    }

    fn display_errors(&self) -> bool {
        self.display
    }

    fn last_fault(&self) -> Option<Fault> {
        self.last.lock().clone()
    }

    fn record_fault(&self, fault: Fault) {
        *self.last.lock() = Some(fault);
    }

    fn set_response_status(&self, status: ResponseStatus) {
        *self.status.lock() = status;
    }

    fn emit(&self, page: &str) {
        self.events.lock().push(format!("page:{page}"));
    }

    fn terminate(&self) {
        self.events.lock().push("terminate".to_string());
    }
}

/// Handler double: logs `<tag>` and keeps a copy of each fault it sees.
pub struct RecordingHandler {
    tag: String,
    seen: Mutex<Vec<Fault>>,
    events: EventLog,
}

impl RecordingHandler {
    pub fn new(tag: &str, events: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            tag: tag.to_string(),
            seen: Mutex::new(Vec::new()),
            events: Arc::clone(events),
        })
    }

    pub fn seen(&self) -> Vec<Fault> {
        self.seen.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Handler for RecordingHandler {
    fn handle(&self, fault: &Fault) -> Option<Fault> {
        self.seen.lock().push(fault.clone());
        self.events.lock().push(self.tag.clone());
        None
    }

    fn name(&self) -> &str {
        &self.tag
    }
}

/// Replaces every fault's message with a fixed text.
pub struct Rewrite(pub &'static str);

impl Handler for Rewrite {
    fn handle(&self, fault: &Fault) -> Option<Fault> {
        Some(fault.clone().with_message(self.0))
    }
}

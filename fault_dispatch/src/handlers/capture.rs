//! Capture handler: forwards faults to a monitoring client.
//!
//! The effective level of a fault is its own severity when it was converted
//! from an error signal, and `ERROR` for native faults. The fault is
//! forwarded only when that level intersects the handler's minimum mask.

use fault_common::fault::{Fault, FaultKind};
use fault_common::handler::Handler;
use fault_common::severity::Severity;
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// Sink for captured faults (an error-tracking service, a spool file, ...).
pub trait CaptureClient: Send + Sync {
    fn capture(&self, fault: &Fault);
}

impl<C: CaptureClient + ?Sized> CaptureClient for Arc<C> {
    fn capture(&self, fault: &Fault) {
        (**self).capture(fault)
    }
}

/// Forwards faults at or above a severity mask to a [`CaptureClient`].
pub struct CaptureHandler<C> {
    client: C,
    minimum: Severity,
}

impl<C: CaptureClient> CaptureHandler<C> {
    /// Capture every severity.
    pub fn new(client: C) -> Self {
        Self::with_minimum(client, Severity::all())
    }

    pub fn with_minimum(client: C, minimum: Severity) -> Self {
        Self { client, minimum }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn effective_level(fault: &Fault) -> Severity {
        match fault.kind() {
            FaultKind::Converted => fault.severity(),
            FaultKind::Native => Severity::ERROR,
        }
    }
}

impl<C: CaptureClient> Handler for CaptureHandler<C> {
    fn handle(&self, fault: &Fault) -> Option<Fault> {
        if self.minimum.intersects(Self::effective_level(fault)) {
            self.client.capture(fault);
        }
        None
    }

    fn name(&self) -> &str {
        "capture"
    }
}

/// Writes one JSON object per captured fault.
pub struct JsonLineClient<W> {
    service: String,
    sink: Mutex<W>,
}

#[derive(Serialize)]
struct CaptureRecord<'a> {
    service: &'a str,
    #[serde(flatten)]
    fault: &'a Fault,
}

impl<W: Write + Send> JsonLineClient<W> {
    pub fn new(service: impl Into<String>, sink: W) -> Self {
        Self {
            service: service.into(),
            sink: Mutex::new(sink),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> CaptureClient for JsonLineClient<W> {
    fn capture(&self, fault: &Fault) {
        let record = CaptureRecord {
            service: &self.service,
            fault,
        };
        let mut sink = self.sink.lock();
        let result = serde_json::to_writer(&mut *sink, &record)
            .map_err(std::io::Error::from)
            .and_then(|()| sink.write_all(b"\n"))
            .and_then(|()| sink.flush());
        if let Err(e) = result {
            warn!("failed to write captured fault: {e}");
        }
    }
}

//! Tracing handler.

use fault_common::fault::Fault;
use fault_common::handler::Handler;
use tracing::{error, info, warn};

/// Emits every fault as a `tracing` event.
///
/// Error-class severities log at ERROR, warning-class at WARN, everything
/// else (notices, deprecations, strict) at INFO.
#[derive(Debug, Clone, Default)]
pub struct LogHandler {
    service: Option<String>,
}

impl LogHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a service name to every event.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
        }
    }
}

impl Handler for LogHandler {
    fn handle(&self, fault: &Fault) -> Option<Fault> {
        let severity = fault.severity();
        let service = self.service.as_deref().unwrap_or("-");
        let location = fault
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        let kind = fault.kind();

        if severity.is_error_class() {
            error!(service = service, %severity, ?kind, %location, "{}", fault.message());
        } else if severity.is_warning_class() {
            warn!(service = service, %severity, ?kind, %location, "{}", fault.message());
        } else {
            info!(service = service, %severity, ?kind, %location, "{}", fault.message());
        }
        None
    }

    fn name(&self) -> &str {
        "log"
    }
}

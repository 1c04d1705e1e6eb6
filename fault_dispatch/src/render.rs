//! Error page renderers.
//!
//! Used only when a dispatcher is silenced and a native fault reaches the
//! end of the chain.

use fault_common::config::ErrorPageKind;
use fault_common::fault::Fault;
use fault_common::handler::PageRenderer;
use serde::Serialize;
use std::sync::Arc;

/// Build the renderer selected in configuration.
pub fn page_for(kind: ErrorPageKind) -> Option<Arc<dyn PageRenderer>> {
    match kind {
        ErrorPageKind::None => None,
        ErrorPageKind::Plain => Some(Arc::new(PlainPage)),
        ErrorPageKind::Json => Some(Arc::new(JsonPage)),
    }
}

/// Generic text page. Does not leak the fault message.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPage;

impl PageRenderer for PlainPage {
    fn render(&self, _fault: &Fault) -> String {
        "500 Internal Server Error\n\nThe request could not be completed.\n".to_string()
    }
}

/// JSON error document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPage;

#[derive(Serialize)]
struct JsonBody<'a> {
    status: u16,
    error: &'a Fault,
}

impl PageRenderer for JsonPage {
    fn render(&self, fault: &Fault) -> String {
        let body = JsonBody {
            status: 500,
            error: fault,
        };
        serde_json::to_string(&body).unwrap_or_else(|_| r#"{"status":500}"#.to_string())
    }
}

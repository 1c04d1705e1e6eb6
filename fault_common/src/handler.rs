//! Handler and page renderer contracts.
//!
//! A [`Handler`] observes a fault and may hand back a replacement that the
//! rest of the chain sees instead. Handlers are shared (`Arc<dyn Handler>`)
//! and may be registered with more than one dispatcher.
//!
//! # Contract
//!
//! - May be called zero or more times per fault, depending on reporting config.
//! - Must not assume it is the only handler in the chain.
//! - Must accept both `Converted` and `Native` faults.
//! - May block (e.g. forwarding to a monitoring service). No timeout is applied.

use crate::fault::Fault;

/// Pluggable unit of fault treatment.
///
/// # Example
///
/// ```rust
/// use fault_common::fault::Fault;
/// use fault_common::handler::Handler;
///
/// struct Redact;
///
/// impl Handler for Redact {
///     fn handle(&self, fault: &Fault) -> Option<Fault> {
///         fault
///             .message()
///             .contains("password")
///             .then(|| fault.clone().with_message("[redacted]"))
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Treat `fault`. Returning `Some` replaces the fault for every handler
    /// that runs afterwards; `None` leaves it unchanged.
    fn handle(&self, fault: &Fault) -> Option<Fault>;

    /// Diagnostic name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Renders the page shown in place of a silenced native fault.
pub trait PageRenderer: Send + Sync {
    fn render(&self, fault: &Fault) -> String;
}

//! Handler chain.
//!
//! Handlers are kept in registration order and run in **reverse**
//! registration order: the handler pushed last sees the fault first. A late
//! registration (a test double, a request-scoped redactor) can therefore
//! intercept before anything installed at startup.
//!
//! Running the chain is a fold. Exactly one fault value flows through every
//! handler; a replacement returned by one handler is the input of the next.

use fault_common::fault::Fault;
use fault_common::handler::Handler;
use std::sync::Arc;
use tracing::trace;

/// Ordered, mutable collection of shared handlers.
#[derive(Default, Clone)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler at the tail. Duplicates are allowed.
    pub fn push(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    /// Remove and return the tail handler.
    pub fn pop(&mut self) -> Option<Arc<dyn Handler>> {
        self.handlers.pop()
    }

    /// Handlers in registration order (not dispatch order).
    pub fn list(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn clear(&mut self) -> &mut Self {
        self.handlers.clear();
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Thread `fault` through every handler, last registered first.
    ///
    /// Returns the last replacement produced, or the original fault if no
    /// handler replaced it. A panicking handler unwinds out of this call and
    /// the remaining handlers do not run.
    pub fn run(&self, fault: Fault) -> Fault {
        self.handlers.iter().rev().fold(fault, |current, handler| {
            match handler.handle(&current) {
                Some(replacement) => {
                    trace!(handler = handler.name(), "fault replaced");
                    replacement
                }
                None => current,
            }
        })
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.name()))
            .finish()
    }
}

impl FromIterator<Arc<dyn Handler>> for HandlerChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Handler>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

//! Bundled handlers.
//!
//! Neither handler replaces the fault; both are observers meant to sit at
//! the bottom of the chain so that late-registered handlers run first.

pub mod capture;
pub mod log;

pub use capture::{CaptureClient, CaptureHandler, JsonLineClient};
pub use log::LogHandler;

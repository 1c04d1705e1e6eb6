//! Severity bitflags and classification.
//!
//! Every fault carries exactly one severity category. Two independent masks
//! are checked against it:
//!
//! - the **reportable** mask, owned by the host and read fresh for every fault;
//! - the **fatal** mask, fixed per dispatcher at construction.
//!
//! Classification is a plain bitwise intersection and never fails.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Fault severity categories.
    ///
    /// Fatal by default: ERROR, PARSE, CORE_ERROR, COMPILE_ERROR, USER_ERROR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Severity: u32 {
        /// Unrecoverable runtime error. **FATAL by default**.
        const ERROR             = 0x0001;
        /// Runtime warning; execution continues.
        const WARNING           = 0x0002;
        /// Source could not be parsed. **FATAL by default**.
        const PARSE             = 0x0004;
        /// Runtime notice (possible bug).
        const NOTICE            = 0x0008;
        /// Error raised while the host core was starting. **FATAL by default**.
        const CORE_ERROR        = 0x0010;
        /// Warning raised while the host core was starting.
        const CORE_WARNING      = 0x0020;
        /// Compile-time error. **FATAL by default**.
        const COMPILE_ERROR     = 0x0040;
        /// Compile-time warning.
        const COMPILE_WARNING   = 0x0080;
        /// Application-raised error. **FATAL by default**.
        const USER_ERROR        = 0x0100;
        /// Application-raised warning.
        const USER_WARNING      = 0x0200;
        /// Application-raised notice.
        const USER_NOTICE       = 0x0400;
        /// Strictness/interoperability suggestion.
        const STRICT            = 0x0800;
        /// Error the host considers catchable.
        const RECOVERABLE_ERROR = 0x1000;
        /// Use of a deprecated facility.
        const DEPRECATED        = 0x2000;
        /// Application-raised deprecation.
        const USER_DEPRECATED   = 0x4000;
    }
}

impl Severity {
    /// Categories the host cannot recover from. Default fatal mask.
    pub const FATAL_DEFAULT: Self = Self::from_bits_truncate(
        Self::ERROR.bits()
            | Self::PARSE.bits()
            | Self::CORE_ERROR.bits()
            | Self::COMPILE_ERROR.bits()
            | Self::USER_ERROR.bits(),
    );

    /// Warning-class categories.
    pub const WARNING_CLASS: Self = Self::from_bits_truncate(
        Self::WARNING.bits()
            | Self::CORE_WARNING.bits()
            | Self::COMPILE_WARNING.bits()
            | Self::USER_WARNING.bits()
            | Self::RECOVERABLE_ERROR.bits(),
    );

    /// Error-class categories (the default fatal set).
    #[inline]
    pub const fn is_error_class(&self) -> bool {
        self.intersects(Self::FATAL_DEFAULT)
    }

    /// Warning-class categories.
    #[inline]
    pub const fn is_warning_class(&self) -> bool {
        self.intersects(Self::WARNING_CLASS)
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        bitflags::parser::to_writer(self, f)
    }
}

/// True iff `severity` is currently eligible for handling/display.
#[inline]
pub const fn is_reportable(severity: Severity, reportable_mask: Severity) -> bool {
    severity.intersects(reportable_mask)
}

/// True iff `severity` must terminate the process.
#[inline]
pub const fn is_fatal(severity: Severity, fatal_mask: Severity) -> bool {
    severity.intersects(fatal_mask)
}

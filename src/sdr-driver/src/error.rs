// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

/// Error returned by receiver driver operations.
///
/// Mirrors `trx_core::rig::response::RigError`'s shape: a message plus a
/// classification the caller can act on without string matching.
#[derive(Debug, Clone)]
pub struct DriverError {
    pub message: String,
    pub kind: DriverErrorKind,
}

/// Classification from spec §7's hardware error taxonomy: transient failures
/// that may succeed on retry (tune/read/rate) vs. fatal ones that mean the
/// engine should remain paused (cannot open device, cannot set sample rate on
/// cold start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    Transient,
    Fatal,
}

pub type DriverResult<T> = Result<T, DriverError>;

impl DriverError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: DriverErrorKind::Transient,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: DriverErrorKind::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == DriverErrorKind::Transient
    }
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DriverError {}

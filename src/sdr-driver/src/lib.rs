// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Receiver driver: serialized access to hardware IQ sampling (spec §4.1).

pub mod driver;
pub mod dummy;
pub mod error;
pub mod handle;
pub mod raw;

#[cfg(feature = "hardware")]
pub mod rtlsdr;

pub use driver::Driver;
pub use dummy::DummyDevice;
pub use error::{DriverError, DriverErrorKind, DriverResult};
pub use handle::ReceiverHandle;
pub use raw::RawDevice;

#[cfg(feature = "hardware")]
pub use rtlsdr::RtlSdrDevice;

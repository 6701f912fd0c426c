// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use num_complex::Complex;
use sdr_core::Gain;

use crate::error::DriverResult;

/// Hardware-specific backend operations. `Driver<D>` wraps an implementation
/// of this trait with the mutex and PPM-caching contract from spec §4.1;
/// implementations themselves need not be internally synchronized.
pub trait RawDevice: Send {
    fn connect(&mut self) -> DriverResult<()>;
    fn disconnect(&mut self);
    fn tune(&mut self, freq_hz: f64) -> DriverResult<()>;
    fn set_gain(&mut self, gain: Gain) -> DriverResult<()>;
    fn set_sample_rate(&mut self, hz: f64) -> DriverResult<()>;
    fn read_samples(&mut self, n: usize) -> DriverResult<Vec<Complex<f32>>>;
    /// Apply PPM correction to an already-connected device.
    fn set_ppm(&mut self, ppm: i32) -> DriverResult<()>;
    fn get_center_freq(&self) -> Option<f64>;
    fn get_sample_rate(&self) -> Option<f64>;
    fn is_connected(&self) -> bool;
}

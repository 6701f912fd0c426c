// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use num_complex::Complex;
use sdr_core::Gain;

use crate::driver::Driver;
use crate::error::DriverResult;
use crate::raw::RawDevice;

/// Object-safe facade over `Driver<D>` so callers (the scanner engine) can
/// hold `Arc<dyn ReceiverHandle>` without being generic over the backend
/// device type.
pub trait ReceiverHandle: Send + Sync {
    fn connect(&self) -> DriverResult<()>;
    fn disconnect(&self);
    fn tune(&self, freq_hz: f64) -> DriverResult<()>;
    fn set_gain(&self, gain: Gain) -> DriverResult<()>;
    fn set_sample_rate(&self, hz: f64) -> DriverResult<()>;
    fn read_samples(&self, n: usize) -> DriverResult<Vec<Complex<f32>>>;
    fn set_ppm(&self, ppm: i32) -> DriverResult<()>;
    fn get_center_freq(&self) -> Option<f64>;
    fn get_sample_rate(&self) -> Option<f64>;
    fn is_connected(&self) -> bool;
}

impl<D: RawDevice + Send + 'static> ReceiverHandle for Driver<D> {
    fn connect(&self) -> DriverResult<()> {
        Driver::connect(self)
    }
    fn disconnect(&self) {
        Driver::disconnect(self)
    }
    fn tune(&self, freq_hz: f64) -> DriverResult<()> {
        Driver::tune(self, freq_hz)
    }
    fn set_gain(&self, gain: Gain) -> DriverResult<()> {
        Driver::set_gain(self, gain)
    }
    fn set_sample_rate(&self, hz: f64) -> DriverResult<()> {
        Driver::set_sample_rate(self, hz)
    }
    fn read_samples(&self, n: usize) -> DriverResult<Vec<Complex<f32>>> {
        Driver::read_samples(self, n)
    }
    fn set_ppm(&self, ppm: i32) -> DriverResult<()> {
        Driver::set_ppm(self, ppm)
    }
    fn get_center_freq(&self) -> Option<f64> {
        Driver::get_center_freq(self)
    }
    fn get_sample_rate(&self) -> Option<f64> {
        Driver::get_sample_rate(self)
    }
    fn is_connected(&self) -> bool {
        Driver::is_connected(self)
    }
}

// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::sync::Mutex;

use num_complex::Complex;
use sdr_core::Gain;

use crate::error::{DriverError, DriverResult};
use crate::raw::RawDevice;

struct Inner<D: RawDevice> {
    device: D,
    /// Last requested PPM correction. Applied immediately if connected,
    /// cached and applied on next `connect()` otherwise (spec §4.1, §9,
    /// scenario F).
    pending_ppm: i32,
}

/// Mutex-serialized wrapper around a [`RawDevice`]. Every operation that
/// touches the device acquires the internal mutex, so a setter from the
/// control surface cannot race with an in-flight read from the worker (spec
/// §4.1, §5).
pub struct Driver<D: RawDevice> {
    inner: Mutex<Inner<D>>,
}

impl<D: RawDevice> Driver<D> {
    pub fn new(device: D) -> Self {
        Self {
            inner: Mutex::new(Inner {
                device,
                pending_ppm: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<D>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Connect to the device, re-applying the last requested PPM if
    /// non-zero (spec §4.1: "`connect()` re-applies the last requested PPM
    /// if non-zero").
    pub fn connect(&self) -> DriverResult<()> {
        let mut inner = self.lock();
        inner.device.connect()?;
        if inner.pending_ppm != 0 {
            let ppm = inner.pending_ppm;
            inner.device.set_ppm(ppm)?;
        }
        Ok(())
    }

    pub fn disconnect(&self) {
        self.lock().device.disconnect();
    }

    pub fn tune(&self, freq_hz: f64) -> DriverResult<()> {
        self.lock().device.tune(freq_hz)
    }

    pub fn set_gain(&self, gain: Gain) -> DriverResult<()> {
        self.lock().device.set_gain(gain)
    }

    pub fn set_sample_rate(&self, hz: f64) -> DriverResult<()> {
        self.lock().device.set_sample_rate(hz)
    }

    pub fn read_samples(&self, n: usize) -> DriverResult<Vec<Complex<f32>>> {
        self.lock().device.read_samples(n)
    }

    /// Set PPM correction. When disconnected the value is cached and applied
    /// on the next `connect()`; when already connected it is applied
    /// immediately (spec §4.1: "`set_ppm` when disconnected caches the value
    /// and returns success; it is applied on next connect").
    pub fn set_ppm(&self, ppm: i32) -> DriverResult<()> {
        let mut inner = self.lock();
        inner.pending_ppm = ppm;
        if inner.device.is_connected() {
            inner.device.set_ppm(ppm)
        } else {
            Ok(())
        }
    }

    pub fn get_center_freq(&self) -> Option<f64> {
        self.lock().device.get_center_freq()
    }

    pub fn get_sample_rate(&self) -> Option<f64> {
        self.lock().device.get_sample_rate()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().device.is_connected()
    }
}

impl From<DriverError> for Box<dyn std::error::Error + Send + Sync> {
    fn from(e: DriverError) -> Self {
        Box::new(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::DummyDevice;

    #[test]
    fn ppm_cached_while_disconnected_then_applied_on_connect() {
        let driver = Driver::new(DummyDevice::new());
        assert!(!driver.is_connected());

        driver.set_ppm(40).unwrap();
        // Not connected yet: DummyDevice has not recorded a ppm application.
        assert_eq!(driver.lock().device.applied_ppm(), None);

        driver.connect().unwrap();
        assert_eq!(driver.lock().device.applied_ppm(), Some(40));
    }

    #[test]
    fn ppm_applied_immediately_when_already_connected() {
        let driver = Driver::new(DummyDevice::new());
        driver.connect().unwrap();
        driver.set_ppm(-15).unwrap();
        assert_eq!(driver.lock().device.applied_ppm(), Some(-15));
    }

    #[test]
    fn read_samples_returns_exactly_n() {
        let driver = Driver::new(DummyDevice::new());
        driver.connect().unwrap();
        let samples = driver.read_samples(512).unwrap();
        assert_eq!(samples.len(), 512);
    }
}

// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! In-memory receiver backend for development and tests. Holds state and
//! responds to every operation immediately; no hardware or USB device
//! required. Grounded on `trx-server/trx-backend/src/dummy.rs`'s `DummyRig`.

use num_complex::Complex;
use sdr_core::Gain;

use crate::error::DriverResult;
use crate::raw::RawDevice;

pub struct DummyDevice {
    connected: bool,
    center_freq_hz: Option<f64>,
    sample_rate_hz: Option<f64>,
    gain: Gain,
    applied_ppm: Option<i32>,
}

impl DummyDevice {
    pub fn new() -> Self {
        Self {
            connected: false,
            center_freq_hz: None,
            sample_rate_hz: None,
            gain: Gain::Auto,
            applied_ppm: None,
        }
    }

    /// Test/inspection hook: the last PPM value actually pushed to the
    /// "device" (as opposed to cached while disconnected).
    pub fn applied_ppm(&self) -> Option<i32> {
        self.applied_ppm
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }
}

impl Default for DummyDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RawDevice for DummyDevice {
    fn connect(&mut self) -> DriverResult<()> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn tune(&mut self, freq_hz: f64) -> DriverResult<()> {
        self.center_freq_hz = Some(freq_hz);
        Ok(())
    }

    fn set_gain(&mut self, gain: Gain) -> DriverResult<()> {
        self.gain = gain;
        Ok(())
    }

    fn set_sample_rate(&mut self, hz: f64) -> DriverResult<()> {
        self.sample_rate_hz = Some(hz);
        Ok(())
    }

    fn read_samples(&mut self, n: usize) -> DriverResult<Vec<Complex<f32>>> {
        // Synthetic low-level noise so downstream squelch/FFT logic has
        // something non-degenerate to chew on in integration tests and demo
        // runs without real hardware.
        let mut state = 0x9E3779B97F4A7C15_u64 ^ (n as u64);
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32 / u32::MAX as f32 - 0.5) * 0.01
        };
        Ok((0..n).map(|_| Complex::new(next(), next())).collect())
    }

    fn set_ppm(&mut self, ppm: i32) -> DriverResult<()> {
        self.applied_ppm = Some(ppm);
        Ok(())
    }

    fn get_center_freq(&self) -> Option<f64> {
        self.center_freq_hz
    }

    fn get_sample_rate(&self) -> Option<f64> {
        self.sample_rate_hz
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

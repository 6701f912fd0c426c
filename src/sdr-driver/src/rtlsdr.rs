// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Real RTL-SDR hardware backend, behind the `hardware` feature. Grounded on
//! `FauxFaux-rtl-sdr-snipper`'s `config_sdr`/`receive` use of the `rtlsdr-rs`
//! crate (tuner gain, bias tee, buffer reset, center frequency, sample rate,
//! synchronous reads).

use num_complex::Complex;
use rtlsdr_rs::{RtlSdr, TunerGain};
use sdr_core::Gain;

use crate::error::{DriverError, DriverResult};
use crate::raw::RawDevice;

pub struct RtlSdrDevice {
    device_index: usize,
    sdr: Option<RtlSdr>,
}

impl RtlSdrDevice {
    pub fn new(device_index: usize) -> Self {
        Self {
            device_index,
            sdr: None,
        }
    }
}

impl RawDevice for RtlSdrDevice {
    fn connect(&mut self) -> DriverResult<()> {
        let sdr = RtlSdr::open(self.device_index)
            .map_err(|e| DriverError::fatal(format!("failed to open RTL-SDR device: {e}")))?;
        self.sdr = Some(sdr);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(mut sdr) = self.sdr.take() {
            let _ = sdr.close();
        }
    }

    fn tune(&mut self, freq_hz: f64) -> DriverResult<()> {
        let sdr = self
            .sdr
            .as_mut()
            .ok_or_else(|| DriverError::fatal("device not connected"))?;
        sdr.set_center_freq(freq_hz as u32)
            .map_err(|e| DriverError::transient(format!("tune to {freq_hz} Hz failed: {e}")))
    }

    fn set_gain(&mut self, gain: Gain) -> DriverResult<()> {
        let sdr = self
            .sdr
            .as_mut()
            .ok_or_else(|| DriverError::fatal("device not connected"))?;
        let tuner_gain = match gain {
            Gain::Auto => TunerGain::Auto,
            Gain::Db(db) => TunerGain::Manual((db * 10.0) as i32),
        };
        sdr.set_tuner_gain(tuner_gain)
            .map_err(|e| DriverError::transient(format!("set_gain failed: {e}")))
    }

    fn set_sample_rate(&mut self, hz: f64) -> DriverResult<()> {
        let sdr = self
            .sdr
            .as_mut()
            .ok_or_else(|| DriverError::fatal("device not connected"))?;
        sdr.set_sample_rate(hz as u32)
            .map_err(|e| DriverError::transient(format!("set_sample_rate failed: {e}")))?;
        sdr.reset_buffer()
            .map_err(|e| DriverError::transient(format!("reset_buffer failed: {e}")))
    }

    fn read_samples(&mut self, n: usize) -> DriverResult<Vec<Complex<f32>>> {
        let sdr = self
            .sdr
            .as_mut()
            .ok_or_else(|| DriverError::fatal("device not connected"))?;
        let mut buf = vec![0u8; n * 2];
        let read = sdr
            .read_sync(&mut buf)
            .map_err(|e| DriverError::transient(format!("read_samples failed: {e}")))?;
        if read < buf.len() {
            return Err(DriverError::transient("short read from device"));
        }
        Ok(buf
            .chunks_exact(2)
            .map(|pair| {
                let i = (pair[0] as f32 - 127.5) / 127.5;
                let q = (pair[1] as f32 - 127.5) / 127.5;
                Complex::new(i, q)
            })
            .collect())
    }

    fn set_ppm(&mut self, ppm: i32) -> DriverResult<()> {
        let sdr = self
            .sdr
            .as_mut()
            .ok_or_else(|| DriverError::fatal("device not connected"))?;
        sdr.set_freq_correction(ppm)
            .map_err(|e| DriverError::transient(format!("set_ppm failed: {e}")))
    }

    fn get_center_freq(&self) -> Option<f64> {
        self.sdr.as_ref().map(|sdr| sdr.get_center_freq() as f64)
    }

    fn get_sample_rate(&self) -> Option<f64> {
        self.sdr.as_ref().map(|sdr| sdr.get_sample_rate() as f64)
    }

    fn is_connected(&self) -> bool {
        self.sdr.is_some()
    }
}

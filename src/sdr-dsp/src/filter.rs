// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! FIR/IIR filtering primitives used by the demodulator pipelines.

use std::f32::consts::PI;

fn windowed_sinc_coeffs(cutoff_norm: f32, taps: usize) -> Vec<f32> {
    assert!(taps >= 1, "FIR filter must have at least 1 tap");
    let m = (taps - 1) as f32;
    let mut coeffs = Vec::with_capacity(taps);
    for i in 0..taps {
        let x = i as f32 - m / 2.0;
        let sinc = if x == 0.0 {
            2.0 * cutoff_norm
        } else {
            (2.0 * PI * cutoff_norm * x).sin() / (PI * x)
        };
        let window = if taps == 1 {
            1.0
        } else {
            0.5 * (1.0 - (2.0 * PI * i as f32 / m).cos())
        };
        coeffs.push(sinc * window);
    }
    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-12 {
        let inv = 1.0 / sum;
        for coeff in &mut coeffs {
            *coeff *= inv;
        }
    }
    coeffs
}

/// A windowed-sinc FIR low-pass filter, sample-by-sample interface.
pub struct FirFilter {
    coeffs: Vec<f32>,
    state: Vec<f32>,
    pos: usize,
}

impl FirFilter {
    pub fn new(cutoff_norm: f32, taps: usize) -> Self {
        let coeffs = windowed_sinc_coeffs(cutoff_norm, taps);
        let state_len = taps.saturating_sub(1);
        Self {
            coeffs,
            state: vec![0.0; state_len],
            pos: 0,
        }
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        let n = self.state.len();
        if n == 0 {
            return sample * self.coeffs[0];
        }
        self.state[self.pos] = sample;
        self.pos = (self.pos + 1) % n;
        let mut acc = self.coeffs[0] * sample;
        for k in 1..self.coeffs.len() {
            let idx = (self.pos + n - k) % n;
            acc += self.coeffs[k] * self.state[idx];
        }
        acc
    }
}

/// Anti-aliased FIR decimation by integer factor `d`: filters the full-rate
/// signal with a low-pass at the post-decimation Nyquist, then keeps every
/// `d`th output sample. Used by NFM and AM, which decimate by an FIR per spec
/// §4.2.
pub fn decimate_fir(samples: &[f32], d: usize) -> Vec<f32> {
    if d <= 1 {
        return samples.to_vec();
    }
    let cutoff_norm = 0.5 / d as f32;
    let taps = (d * 4 + 1).max(3);
    let mut filter = FirFilter::new(cutoff_norm, taps);
    let mut out = Vec::with_capacity(samples.len() / d);
    for (i, &s) in samples.iter().enumerate() {
        let y = filter.process(s);
        if i % d == 0 {
            out.push(y);
        }
    }
    out
}

/// One-pole IIR low-pass, used as the anti-alias stage ahead of WFM's IIR
/// decimation (spec §4.2: "IIR decimate by D").
pub struct OnePoleLowpass {
    alpha: f32,
    y_prev: f32,
}

impl OnePoleLowpass {
    pub fn new(cutoff_hz: f32, sample_rate_hz: f32) -> Self {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let dt = 1.0 / sample_rate_hz;
        let alpha = dt / (rc + dt);
        Self { alpha, y_prev: 0.0 }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        self.y_prev += self.alpha * (x - self.y_prev);
        self.y_prev
    }
}

/// Anti-aliased IIR decimation by integer factor `d`.
pub fn decimate_iir(samples: &[f32], d: usize, sample_rate_hz: f32) -> Vec<f32> {
    if d <= 1 {
        return samples.to_vec();
    }
    let cutoff = sample_rate_hz / d as f32 / 2.2;
    let mut filter = OnePoleLowpass::new(cutoff, sample_rate_hz);
    let mut out = Vec::with_capacity(samples.len() / d);
    for (i, &s) in samples.iter().enumerate() {
        let y = filter.process(s);
        if i % d == 0 {
            out.push(y);
        }
    }
    out
}

/// First-order Butterworth high-pass, used as WFM's de-emphasis stand-in.
pub struct ButterworthHighpass {
    alpha: f32,
    x_prev: f32,
    y_prev: f32,
}

impl ButterworthHighpass {
    pub fn new(cutoff_hz: f32, sample_rate_hz: f32) -> Self {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let dt = 1.0 / sample_rate_hz;
        let alpha = rc / (rc + dt);
        Self {
            alpha,
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.alpha * (self.y_prev + x - self.x_prev);
        self.x_prev = x;
        self.y_prev = y;
        y
    }

    pub fn process_buf(&mut self, samples: &[f32]) -> Vec<f32> {
        samples.iter().map(|&x| self.process(x)).collect()
    }
}

/// First-order Butterworth low-pass, used by AM's post-envelope smoothing.
pub struct ButterworthLowpass {
    inner: OnePoleLowpass,
}

impl ButterworthLowpass {
    pub fn new(cutoff_hz: f32, sample_rate_hz: f32) -> Self {
        Self {
            inner: OnePoleLowpass::new(cutoff_hz, sample_rate_hz),
        }
    }

    pub fn process_buf(&mut self, samples: &[f32]) -> Vec<f32> {
        samples.iter().map(|&x| self.inner.process(x)).collect()
    }
}

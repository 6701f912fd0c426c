// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! FFT-based spectrum analysis used by scan-mode peak detection (spec §4.4
//! step 3) and spectrum-snapshot publication (step 5).

use std::f32::consts::PI;

use num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Result of analyzing one chunk of IQ samples centered at `center_freq_hz`.
pub struct Analysis {
    /// Per-bin frequency, in Hz, matching `power_db` index-for-index.
    pub frequencies_hz: Vec<f64>,
    /// Per-bin power in dB: `10*log10(|X[k]|^2 + eps)`.
    pub power_db: Vec<f32>,
    /// `median(power_db)`.
    pub noise_floor_db: f32,
    /// Index of the maximum-power bin.
    pub peak_index: usize,
    /// `power_db[peak_index]`.
    pub peak_power_db: f32,
}

impl Analysis {
    /// Frequency of the peak bin.
    pub fn peak_frequency_hz(&self) -> f64 {
        self.frequencies_hz[self.peak_index]
    }
}

/// Forward FFT, fftshift, dB conversion, median noise floor and peak search —
/// the scan-mode analysis algorithm from spec §4.4 step 3. No window is
/// applied before the transform, matching the source's plain `np.fft.fft`.
pub fn analyze(samples: &[Complex<f32>], sample_rate_hz: f64, center_freq_hz: f64) -> Analysis {
    let n = samples.len();
    assert!(n > 0, "cannot analyze an empty sample window");

    let mut buf: Vec<Complex<f32>> = samples.to_vec();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buf);

    let half = n / 2;
    let shifted: Vec<Complex<f32>> = buf[half..].iter().chain(buf[..half].iter()).cloned().collect();

    let power_db: Vec<f32> = shifted
        .iter()
        .map(|c| 10.0 * (c.norm_sqr() + EPSILON).log10())
        .collect();

    let freq_bin_width = sample_rate_hz / n as f64;
    let frequencies_hz: Vec<f64> = (0..n)
        .map(|k| center_freq_hz + (k as f64 - (n / 2) as f64) * freq_bin_width)
        .collect();

    let noise_floor_db = median(&power_db);

    let (peak_index, peak_power_db) = power_db
        .iter()
        .enumerate()
        .fold((0usize, f32::MIN), |(bi, bp), (i, &p)| {
            if p > bp {
                (i, p)
            } else {
                (bi, bp)
            }
        });

    Analysis {
        frequencies_hz,
        power_db,
        noise_floor_db,
        peak_index,
        peak_power_db,
    }
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

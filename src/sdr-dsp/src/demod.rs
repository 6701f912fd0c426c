// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Multi-mode demodulation dispatch (spec §4.2): a stateless-per-call pipeline
//! from complex IQ chunks to mono float audio, parameterized by sample rate,
//! mode, volume, and squelch threshold.

pub mod am;
pub mod fm;

use num_complex::Complex;
use sdr_core::{DemodMode, AUDIO_RATE_HZ};

use crate::filter::{decimate_fir, decimate_iir, ButterworthHighpass, ButterworthLowpass};

const EPSILON: f64 = 1e-10;
const WFM_DEEMPHASIS_HZ: f32 = 100.0;
const AM_LOWPASS_HZ: f32 = 5_000.0;
const NFM_WFM_VOLUME_SCALE: f32 = 0.5;
const AM_VOLUME_SCALE: f32 = 0.3;

/// `D = floor(sample_rate / audio_rate)`, shared by the squelch silence
/// length and every mode's decimation stage.
pub fn decimation_factor(sample_rate_hz: f64) -> usize {
    (sample_rate_hz / AUDIO_RATE_HZ as f64).floor().max(1.0) as usize
}

/// Squelch pre-step (spec §4.2): if the mean power in dB is below
/// `squelch_db`, the caller should emit silence of length `floor(len / D)`
/// instead of running the mode-specific pipeline.
pub fn is_squelched(samples: &[Complex<f32>], squelch_db: f64) -> bool {
    if samples.is_empty() {
        return false;
    }
    let mean_power: f64 = samples
        .iter()
        .map(|s| (s.norm_sqr()) as f64)
        .sum::<f64>()
        / samples.len() as f64;
    let power_db = 10.0 * (mean_power + EPSILON).log10();
    power_db < squelch_db
}

/// Run the full demodulation pipeline for `mode` over one chunk of IQ
/// samples. Never allocates state across calls (spec §4.2: "never allocates
/// persistent state between calls").
pub fn demodulate(
    samples: &[Complex<f32>],
    sample_rate_hz: f64,
    squelch_db: f64,
    mode: DemodMode,
    volume: f32,
) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let d = decimation_factor(sample_rate_hz);

    if is_squelched(samples, squelch_db) {
        return vec![0.0; samples.len() / d];
    }

    match mode {
        DemodMode::Nfm => {
            let phi = fm::discriminate(samples);
            let decimated = decimate_fir(&phi, d);
            scale(&decimated, NFM_WFM_VOLUME_SCALE * volume)
        }
        DemodMode::Wfm => {
            let phi = fm::discriminate(samples);
            let decimated = decimate_iir(&phi, d, sample_rate_hz as f32);
            let mut hp = ButterworthHighpass::new(WFM_DEEMPHASIS_HZ, AUDIO_RATE_HZ as f32);
            let filtered = hp.process_buf(&decimated);
            scale(&filtered, NFM_WFM_VOLUME_SCALE * volume)
        }
        DemodMode::Am => {
            let env = am::envelope(samples);
            let dc_removed = am::remove_dc(&env);
            let decimated = decimate_fir(&dc_removed, d);
            let mut lp = ButterworthLowpass::new(AM_LOWPASS_HZ, AUDIO_RATE_HZ as f32);
            let filtered = lp.process_buf(&decimated);
            scale(&filtered, AM_VOLUME_SCALE * volume)
        }
    }
}

fn scale(samples: &[f32], factor: f32) -> Vec<f32> {
    samples.iter().map(|&s| s * factor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn complex_tone(freq_norm: f32, len: usize, amp: f32) -> Vec<Complex<f32>> {
        (0..len)
            .map(|n| {
                let phase = 2.0 * PI * freq_norm * n as f32;
                Complex::new(amp * phase.cos(), amp * phase.sin())
            })
            .collect()
    }

    fn gaussian_noise(len: usize, power_linear: f32, seed: u64) -> Vec<Complex<f32>> {
        // Deterministic pseudo-noise (LCG), avoids pulling in `rand` for a
        // single test fixture.
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32 / u32::MAX as f32) - 0.5
        };
        let amp = power_linear.sqrt();
        (0..len)
            .map(|_| Complex::new(amp * next(), amp * next()))
            .collect()
    }

    #[test]
    fn silence_on_squelch_every_mode() {
        // -90 dB average power, squelch at -80 dB (scenario B).
        let samples = gaussian_noise(4096, 1e-9, 42);
        let d = decimation_factor(1_920_000.0);
        for mode in [DemodMode::Nfm, DemodMode::Wfm, DemodMode::Am] {
            let out = demodulate(&samples, 1_920_000.0, -80.0, mode, 1.0);
            assert_eq!(out.len(), 4096 / d);
            assert!(out.iter().all(|&v| v == 0.0), "mode {mode:?} not silent");
        }
    }

    #[test]
    fn decimation_ratio_holds_for_every_mode() {
        let samples = complex_tone(0.01, 4000, 1.0);
        for mode in [DemodMode::Nfm, DemodMode::Wfm, DemodMode::Am] {
            let out = demodulate(&samples, 960_000.0, -150.0, mode, 1.0);
            let d = decimation_factor(960_000.0);
            let expected = 4000 / d;
            assert!(
                (out.len() as i64 - expected as i64).abs() <= 1,
                "mode {mode:?}: got {} expected ~{}",
                out.len(),
                expected
            );
        }
    }

    #[test]
    fn volume_scales_peak_amplitude_linearly() {
        let samples = complex_tone(0.02, 2000, 1.0);
        let out_full = demodulate(&samples, 960_000.0, -150.0, DemodMode::Nfm, 1.0);
        let out_half = demodulate(&samples, 960_000.0, -150.0, DemodMode::Nfm, 0.5);
        let peak_full = out_full.iter().cloned().fold(0.0_f32, f32::max);
        let peak_half = out_half.iter().cloned().fold(0.0_f32, f32::max);
        assert!(peak_full > 0.0);
        let ratio = peak_half / peak_full;
        assert!((ratio - 0.5).abs() < 0.01, "ratio was {ratio}");
    }

    #[test]
    fn empty_input_returns_empty_output() {
        for mode in [DemodMode::Nfm, DemodMode::Wfm, DemodMode::Am] {
            assert!(demodulate(&[], 960_000.0, -80.0, mode, 1.0).is_empty());
        }
    }

    #[test]
    fn nfm_recovers_modulating_tone_frequency() {
        // 1 kHz tone, 5 kHz deviation, 1.92 MHz sample rate (D=40, scenario C).
        let sample_rate = 1_920_000.0_f64;
        let audio_tone_hz = 1_000.0_f64;
        let deviation_hz = 5_000.0_f64;
        let n = 38_400; // 20ms, enough cycles of the 1kHz tone post-decimation

        let mut phase = 0.0_f64;
        let samples: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                let inst_freq = deviation_hz * (2.0 * std::f64::consts::PI * audio_tone_hz * t).sin();
                phase += 2.0 * std::f64::consts::PI * inst_freq / sample_rate;
                Complex::new(phase.cos() as f32, phase.sin() as f32)
            })
            .collect();

        let audio = demodulate(&samples, sample_rate, -150.0, DemodMode::Nfm, 1.0);

        let mut planner = rustfft::FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(audio.len());
        let mut buf: Vec<Complex<f32>> = audio.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buf);

        let half = buf.len() / 2;
        let (peak_bin, _) = buf[1..half]
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1, c.norm_sqr()))
            .fold((0usize, 0.0_f32), |(bi, bp), (i, p)| if p > bp { (i, p) } else { (bi, bp) });

        let bin_width_hz = AUDIO_RATE_HZ as f64 / audio.len() as f64;
        let peak_freq_hz = peak_bin as f64 * bin_width_hz;
        assert!(
            (peak_freq_hz - audio_tone_hz).abs() <= 20.0,
            "peak at {peak_freq_hz} Hz, expected ~{audio_tone_hz} Hz"
        );
    }
}

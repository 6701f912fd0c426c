// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use num_complex::Complex;

/// Quadrature phase discriminator: `phi[n] = arg(s[n] * conj(s[n-1]))` for
/// `n >= 1`. The first sample has no predecessor and is emitted as zero,
/// keeping the output the same length as the input (spec §4.2).
pub fn discriminate(samples: &[Complex<f32>]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(samples.len());
    out.push(0.0);
    for n in 1..samples.len() {
        let prod = samples[n] * samples[n - 1].conj();
        out.push(prod.arg());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn complex_tone(freq_norm: f32, len: usize) -> Vec<Complex<f32>> {
        (0..len)
            .map(|n| {
                let phase = 2.0 * PI * freq_norm * n as f32;
                Complex::new(phase.cos(), phase.sin())
            })
            .collect()
    }

    fn assert_approx_eq(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "expected {a} ~= {b} (tol {tol})");
    }

    #[test]
    fn discriminate_recovers_constant_tone_frequency() {
        let freq_norm = 0.01;
        let samples = complex_tone(freq_norm, 256);
        let phi = discriminate(&samples);
        let expected = 2.0 * PI * freq_norm;
        for &p in &phi[10..240] {
            assert_approx_eq(p, expected, 0.01);
        }
    }

    #[test]
    fn discriminate_zero_on_silence() {
        let samples = vec![Complex::new(0.0_f32, 0.0); 128];
        let phi = discriminate(&samples);
        assert!(phi.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn discriminate_empty_input_is_empty() {
        assert!(discriminate(&[]).is_empty());
    }
}

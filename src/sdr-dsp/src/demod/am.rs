// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use num_complex::Complex;

/// Envelope detector: `|s[n]|`.
pub fn envelope(samples: &[Complex<f32>]) -> Vec<f32> {
    samples.iter().map(|s| s.norm()).collect()
}

/// Remove DC offset via `x - mean(x)` (spec §4.2's AM DC-removal step).
pub fn remove_dc(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mean: f32 = samples.iter().sum::<f32>() / samples.len() as f32;
    samples.iter().map(|&x| x - mean).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_constant_magnitude() {
        let samples = vec![Complex::new(3.0_f32, 4.0); 16];
        let env = envelope(&samples);
        assert!(env.iter().all(|&v| (v - 5.0).abs() < 1e-5));
    }

    #[test]
    fn envelope_varies_with_magnitude() {
        let samples = vec![Complex::new(1.0_f32, 0.0), Complex::new(2.0, 0.0)];
        let env = envelope(&samples);
        assert_eq!(env, vec![1.0, 2.0]);
    }

    #[test]
    fn remove_dc_zeroes_constant_input() {
        let out = remove_dc(&[2.0, 2.0, 2.0, 2.0]);
        assert!(out.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn remove_dc_empty_is_empty() {
        assert!(remove_dc(&[]).is_empty());
    }
}

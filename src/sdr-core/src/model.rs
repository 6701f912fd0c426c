// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Data model shared by the driver, DSP, logger, and scanner crates.

use serde::{Deserialize, Serialize};

/// RF gain: either automatic (hardware AGC) or a fixed value in dB.
///
/// Replaces the source's overloaded sentinel (`gain == 0` means "auto") with a
/// closed tagged variant so an invalid gain is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Gain {
    Auto,
    Db(f64),
}

impl Default for Gain {
    fn default() -> Self {
        Gain::Auto
    }
}

/// Closed demodulation mode. Replaces the source's `mode ∈ {"NFM","WFM","AM"}`
/// string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemodMode {
    Nfm,
    Wfm,
    Am,
}

impl Default for DemodMode {
    fn default() -> Self {
        DemodMode::Nfm
    }
}

/// Which half of the state machine the worker is currently driving, independent
/// of whether it is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    Scan,
    Manual,
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Scan
    }
}

/// Derived run state: whether the worker is actively doing I/O or idling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Paused,
    Active,
}

/// Immutable (after load) description of one scannable frequency band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub start_freq_hz: f64,
    pub end_freq_hz: f64,
    pub step_size_hz: f64,
    pub gain: Gain,
    pub dwell_time_ms: u64,
    pub threshold_db: f64,
}

/// Error returned when a `Band` is constructed with out-of-contract fields.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BandError {
    #[error("start_freq_hz ({start}) must be <= end_freq_hz ({end})")]
    RangeInverted { start: f64, end: f64 },
    #[error("step_size_hz must be > 0, got {0}")]
    NonPositiveStep(f64),
}

impl Band {
    /// Construct a band descriptor, validating the invariants from the data
    /// model: `start_freq_hz <= end_freq_hz`, `step_size_hz > 0`.
    /// `dwell_time_ms` is unsigned and so cannot violate `dwell_time_ms >= 0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        enabled: bool,
        start_freq_hz: f64,
        end_freq_hz: f64,
        step_size_hz: f64,
        gain: Gain,
        dwell_time_ms: u64,
        threshold_db: f64,
    ) -> Result<Self, BandError> {
        if start_freq_hz > end_freq_hz {
            return Err(BandError::RangeInverted {
                start: start_freq_hz,
                end: end_freq_hz,
            });
        }
        if step_size_hz <= 0.0 {
            return Err(BandError::NonPositiveStep(step_size_hz));
        }
        Ok(Band {
            id: id.into(),
            name: name.into(),
            enabled,
            start_freq_hz,
            end_freq_hz,
            step_size_hz,
            gain,
            dwell_time_ms,
            threshold_db,
        })
    }
}

/// Decimation factor used by manual-mode buffer rounding (960 kHz / 48 kHz).
pub const MANUAL_DECIMATION: u32 = 20;

/// Canonical scan-mode sample rate (spec §9 decides 2.4 MHz over the source's
/// conflicting 2.4 MHz / 2.048 MHz constants).
pub const DEFAULT_SCAN_SAMPLE_RATE_HZ: f64 = 2_400_000.0;

/// Canonical manual-mode sample rate: 20x decimation to 48 kHz audio.
pub const DEFAULT_MANUAL_SAMPLE_RATE_HZ: f64 = 960_000.0;

/// Default number of IQ samples read per scan-mode analysis window.
pub const DEFAULT_SCAN_NUM_SAMPLES: usize = 2048;

/// Default manual-mode read buffer size (divisible by `MANUAL_DECIMATION`).
pub const DEFAULT_BUFFER_SIZE: u32 = 204_800;

/// Audio output sample rate.
pub const AUDIO_RATE_HZ: u32 = 48_000;

/// Round `n` down to the nearest multiple of `MANUAL_DECIMATION`.
pub fn round_buffer_size(n: u32) -> u32 {
    n - (n % MANUAL_DECIMATION)
}

/// Mutable, mutex-guarded scanner parameters. Constructed with defaults, then
/// mutated by the control surface throughout the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerParams {
    pub mode: ScanMode,
    pub running: RunState,
    pub manual_freq_hz: f64,
    pub gain: Gain,
    pub threshold_db: f64,
    pub squelch_db: f64,
    pub buffer_size: u32,
    pub volume: f32,
    pub demod_mode: DemodMode,
    pub ppm: i32,
    pub spectrum_enabled: bool,
}

impl Default for ScannerParams {
    fn default() -> Self {
        ScannerParams {
            mode: ScanMode::Scan,
            running: RunState::Paused,
            manual_freq_hz: 144.3e6,
            gain: Gain::Auto,
            threshold_db: 10.0,
            squelch_db: -80.0,
            buffer_size: round_buffer_size(DEFAULT_BUFFER_SIZE),
            volume: 1.0,
            demod_mode: DemodMode::Nfm,
            ppm: 0,
            spectrum_enabled: true,
        }
    }
}

/// A detection event emitted by scan-mode analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub frequency_hz: f64,
    pub center_freq_hz: f64,
    pub power_db: f64,
    pub noise_floor_db: f64,
    pub relative_power_db: f64,
    pub band_id: String,
    pub band_name: String,
}

/// A transient spectrum snapshot: paired frequency/power vectors of equal
/// length, overwritten by the latest analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSnapshot {
    pub frequencies_hz: Vec<f64>,
    pub power_db: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_rejects_inverted_range() {
        let err = Band::new("a", "A", true, 200.0, 100.0, 1.0, Gain::Auto, 10, 5.0).unwrap_err();
        assert!(matches!(err, BandError::RangeInverted { .. }));
    }

    #[test]
    fn band_rejects_nonpositive_step() {
        let err = Band::new("a", "A", true, 100.0, 200.0, 0.0, Gain::Auto, 10, 5.0).unwrap_err();
        assert!(matches!(err, BandError::NonPositiveStep(_)));
    }

    #[test]
    fn buffer_rounding_matches_decimation() {
        assert_eq!(round_buffer_size(204_801), 204_800);
        assert_eq!(round_buffer_size(20), 20);
        assert_eq!(round_buffer_size(19), 0);
    }

    #[test]
    fn default_params_start_paused() {
        assert_eq!(ScannerParams::default().running, RunState::Paused);
    }
}

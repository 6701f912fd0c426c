// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Shared data model, error alias, logging bootstrap, and application config
//! loading for the monitoring station core.

pub mod config;
pub mod logging;
pub mod model;

pub use config::{AppConfig, ConfigError, ConfigFile};
pub use logging::init_logging;
pub use model::{
    round_buffer_size, Band, BandError, DemodMode, DetectionEvent, Gain, RunState, ScanMode,
    ScannerParams, SpectrumSnapshot, AUDIO_RATE_HZ, DEFAULT_BUFFER_SIZE,
    DEFAULT_MANUAL_SAMPLE_RATE_HZ, DEFAULT_SCAN_NUM_SAMPLES, DEFAULT_SCAN_SAMPLE_RATE_HZ,
    MANUAL_DECIMATION,
};

/// Result alias for call sites with a heterogeneous, rarely-matched error cause.
pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

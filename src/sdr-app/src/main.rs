// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! `sdr-station`: wires the driver, demodulator, detection logger, and
//! scanner engine into a running monitoring-station process. Band-file
//! parsing is an external-collaborator Non-goal (spec §1), so this binary
//! ships a small illustrative default band set.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sdr_core::{AppConfig, Band, ConfigFile, Gain};
use sdr_driver::{Driver, DummyDevice, ReceiverHandle};
use sdr_logger::DetectionLogger;
use sdr_scanner::ScannerEngine;
use tracing::{info, warn};

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - SDR monitoring station");
const MAIN_LOOP_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Parser)]
#[command(author, version, about = PKG_DESCRIPTION)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// RTL-SDR device index (ignored unless built with the `hardware` feature)
    #[arg(long = "device-index")]
    device_index: Option<u32>,
    /// Path to the detection store (sqlite3 file)
    #[arg(long = "db-path", value_name = "FILE")]
    db_path: Option<PathBuf>,
    /// Override the configured log level
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

/// A handful of commonly-scanned VHF/UHF ranges, standing in for a
/// user-supplied band file (spec §1 Non-goals: band-file parsing is an
/// external-collaborator concern).
fn default_bands() -> Vec<Band> {
    vec![
        Band::new(
            "noaa-wx",
            "NOAA Weather Radio",
            true,
            162.400e6,
            162.550e6,
            25e3,
            Gain::Auto,
            50,
            10.0,
        )
        .expect("default band is well-formed"),
        Band::new(
            "2m-calling",
            "2m Amateur Calling",
            true,
            144.0e6,
            148.0e6,
            25e3,
            Gain::Auto,
            30,
            10.0,
        )
        .expect("default band is well-formed"),
        Band::new(
            "air-band",
            "VHF Airband",
            true,
            118.0e6,
            137.0e6,
            25e3,
            Gain::Auto,
            20,
            12.0,
        )
        .expect("default band is well-formed"),
    ]
}

#[cfg(feature = "hardware")]
fn build_driver(cfg: &AppConfig) -> Arc<dyn ReceiverHandle> {
    let device = sdr_driver::RtlSdrDevice::new(cfg.device_index as usize);
    Arc::new(Driver::new(device))
}

#[cfg(not(feature = "hardware"))]
fn build_driver(_cfg: &AppConfig) -> Arc<dyn ReceiverHandle> {
    Arc::new(Driver::new(DummyDevice::new()))
}

fn main() -> sdr_core::DynResult<()> {
    let cli = Cli::parse();

    let (cfg, config_path) = match &cli.config {
        Some(path) => (AppConfig::load_from_file(path)?, Some(path.clone())),
        None => AppConfig::load_from_default_paths()?,
    };

    let log_level = cli.log_level.as_deref().or(Some(cfg.log_level.as_str()));
    sdr_core::init_logging(log_level);

    if let Some(path) = &config_path {
        info!("loaded configuration from {}", path.display());
    } else {
        info!("no configuration file found, using defaults");
    }

    let db_path = cli.db_path.clone().unwrap_or_else(|| cfg.db_path.clone());
    let logger = Arc::new(DetectionLogger::open(&db_path)?);
    info!("detection store: {}", db_path.display());

    let driver = build_driver(&cfg);
    let engine = ScannerEngine::new(default_bands(), driver, logger);

    if let Some(db) = cfg.initial_gain_db {
        engine.set_gain(Gain::Db(db));
    }
    engine.set_squelch(cfg.initial_squelch_db);
    engine.set_volume(cfg.initial_volume);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            if shutdown.swap(true, Ordering::SeqCst) {
                warn!("shutdown already requested, exiting immediately");
                std::process::exit(1);
            }
        })?;
    }

    info!("starting scan");
    engine.start_scan();

    while !shutdown.load(Ordering::SeqCst) {
        if let Some(event) = engine.try_recv_event() {
            info!(
                freq_hz = event.frequency_hz,
                band = %event.band_name,
                relative_db = event.relative_power_db,
                "detection"
            );
        }
        let _ = engine.take_spectrum();
        std::thread::sleep(MAIN_LOOP_POLL);
    }

    info!("shutting down");
    engine.shutdown();
    Ok(())
}

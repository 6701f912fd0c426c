// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The scanner's blocking worker loop: paused ↔ scan ↔ manual, spec §4.4.
//!
//! Grounded structurally on `trx-server/src/rig_task.rs`'s worker-loop shape
//! (snapshot state, act on it, sync derived state) but converted from its
//! `tokio::select!`-driven async loop into a single blocking
//! `std::thread::spawn` loop per spec §5 ("no cooperative scheduler; blocking
//! I/O is permitted inside the worker only").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use sdr_core::{
    Band, DetectionEvent, RunState, ScanMode, ScannerParams, DEFAULT_MANUAL_SAMPLE_RATE_HZ,
    DEFAULT_SCAN_NUM_SAMPLES, DEFAULT_SCAN_SAMPLE_RATE_HZ,
};
use sdr_driver::ReceiverHandle;
use sdr_logger::DetectionLogger;

use crate::audio::{self, AudioSink};
use crate::queues::SpectrumSlot;

/// Worker polls the pause flag at 10 Hz while paused (spec §4.4 states).
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Backoff after a failed read/tune before retrying (spec §4.4: "a read
/// failure yields to a short backoff").
const RETRY_BACKOFF: Duration = Duration::from_millis(250);
/// Publish the spectrum snapshot on every Kth scan-mode analysis (spec §4.4
/// step 5, K=4).
const SPECTRUM_PUBLISH_EVERY: u64 = 4;
/// Shutdown grace period between clearing the run flag and tearing the
/// worker down (spec §4.4 shutdown sequence: "brief grace period ≥ 200 ms").
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// Shared handles the worker needs; cloned (cheaply, via `Arc`) into the
/// `std::thread::spawn` closure.
pub struct WorkerContext {
    pub driver: Arc<dyn ReceiverHandle>,
    pub logger: Arc<DetectionLogger>,
    pub bands: Arc<Vec<Band>>,
    pub params: Arc<Mutex<ScannerParams>>,
    pub result_tx: mpsc::Sender<DetectionEvent>,
    pub spectrum: Arc<SpectrumSlot>,
    pub shutdown: Arc<AtomicBool>,
}

fn snapshot(params: &Mutex<ScannerParams>) -> ScannerParams {
    params.lock().unwrap_or_else(|p| p.into_inner()).clone()
}

/// Entry point run on the dedicated worker thread. Returns only once
/// `shutdown` has been observed.
pub fn run(ctx: WorkerContext) {
    let mut scan_connected = false;
    let mut analysis_count: u64 = 0;
    let mut manual_tuned: Option<f64> = None;
    let mut audio_sink: Box<dyn AudioSink> = Box::new(crate::audio::NullAudioSink);
    let mut audio_opened = false;

    while !ctx.shutdown.load(Ordering::Acquire) {
        let params = snapshot(&ctx.params);

        if params.running == RunState::Paused {
            manual_tuned = None;
            scan_connected = false;
            thread::sleep(PAUSE_POLL_INTERVAL);
            continue;
        }

        match params.mode {
            ScanMode::Scan => {
                scan_pass(&ctx, &params, &mut scan_connected, &mut analysis_count);
            }
            ScanMode::Manual => {
                if !audio_opened {
                    audio_sink = audio::open_output_sink();
                    audio_opened = true;
                }
                manual_tick(&ctx, &params, &mut manual_tuned, audio_sink.as_mut());
            }
        }
    }

    thread::sleep(SHUTDOWN_GRACE);
    ctx.driver.disconnect();
}

/// One full sweep across all enabled bands (spec §4.4 scan-mode algorithm).
fn scan_pass(
    ctx: &WorkerContext,
    initial_params: &ScannerParams,
    connected: &mut bool,
    analysis_count: &mut u64,
) {
    if !*connected {
        if let Err(e) = ctx.driver.connect() {
            tracing::warn!(error = %e, "scan: driver connect failed, retrying");
            thread::sleep(RETRY_BACKOFF);
            return;
        }
        if let Err(e) = ctx.driver.set_sample_rate(DEFAULT_SCAN_SAMPLE_RATE_HZ) {
            tracing::warn!(error = %e, "scan: failed to set scan sample rate, retrying");
            thread::sleep(RETRY_BACKOFF);
            return;
        }
        *connected = true;
    }

    for band in ctx.bands.iter() {
        if ctx.shutdown.load(Ordering::Acquire) || mode_changed(ctx, initial_params) {
            return;
        }
        if !band.enabled {
            continue;
        }
        if let Err(e) = ctx.driver.set_gain(band.gain) {
            tracing::warn!(error = %e, band = %band.name, "scan: failed to set band gain");
            continue;
        }

        let mut f = band.start_freq_hz;
        while f <= band.end_freq_hz {
            if ctx.shutdown.load(Ordering::Acquire) || mode_changed(ctx, initial_params) {
                return;
            }

            if let Err(e) = ctx.driver.tune(f) {
                tracing::warn!(error = %e, freq = f, "scan: tune failed, skipping step");
                f += band.step_size_hz;
                continue;
            }
            thread::sleep(Duration::from_millis(band.dwell_time_ms));

            let samples = match ctx.driver.read_samples(DEFAULT_SCAN_NUM_SAMPLES) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, freq = f, "scan: read failed, skipping step");
                    f += band.step_size_hz;
                    continue;
                }
            };

            let live = snapshot(&ctx.params);
            let analysis = sdr_dsp::analyze(&samples, DEFAULT_SCAN_SAMPLE_RATE_HZ, f);
            let relative_power_db =
                (analysis.peak_power_db - analysis.noise_floor_db) as f64;

            if relative_power_db > band.threshold_db {
                let event = DetectionEvent {
                    timestamp: Utc::now(),
                    frequency_hz: analysis.peak_frequency_hz(),
                    center_freq_hz: f,
                    power_db: analysis.peak_power_db as f64,
                    noise_floor_db: analysis.noise_floor_db as f64,
                    relative_power_db,
                    band_id: band.id.clone(),
                    band_name: band.name.clone(),
                };
                let _ = ctx.result_tx.send(event.clone());
                let _ = ctx.logger.log_event(&event);
            }

            *analysis_count += 1;
            if live.spectrum_enabled && *analysis_count % SPECTRUM_PUBLISH_EVERY == 0 {
                ctx.spectrum.try_publish(sdr_core::SpectrumSnapshot {
                    frequencies_hz: analysis.frequencies_hz,
                    power_db: analysis.power_db,
                });
            }

            f += band.step_size_hz;
        }
    }
}

/// `true` once the caller should abandon the in-flight scan sweep: the run
/// state or mode flipped since `initial` was captured (spec §4.4: "state
/// reads happen at loop heads and between frequency steps").
fn mode_changed(ctx: &WorkerContext, initial: &ScannerParams) -> bool {
    let live = snapshot(&ctx.params);
    live.mode != initial.mode || live.running != initial.running
}

/// One manual-mode iteration: (re)tune if needed, read one buffer, demodulate,
/// write to the audio sink (spec §4.4 manual-mode algorithm).
fn manual_tick(
    ctx: &WorkerContext,
    params: &ScannerParams,
    tuned: &mut Option<f64>,
    sink: &mut dyn AudioSink,
) {
    if *tuned != Some(params.manual_freq_hz) {
        if !ctx.driver.is_connected() {
            if let Err(e) = ctx.driver.connect() {
                tracing::warn!(error = %e, "manual: connect failed, returning to paused");
                pause(ctx);
                return;
            }
        }
        if let Err(e) = ctx.driver.tune(params.manual_freq_hz) {
            tracing::warn!(error = %e, "manual: tune failed, returning to paused");
            pause(ctx);
            return;
        }
        if let Err(e) = ctx.driver.set_sample_rate(DEFAULT_MANUAL_SAMPLE_RATE_HZ) {
            tracing::warn!(error = %e, "manual: set_sample_rate failed, returning to paused");
            pause(ctx);
            return;
        }
        if let Err(e) = ctx.driver.set_gain(params.gain) {
            tracing::warn!(error = %e, "manual: set_gain failed, continuing regardless");
        }
        *tuned = Some(params.manual_freq_hz);
    }

    let samples = match ctx.driver.read_samples(params.buffer_size as usize) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "manual: read failed, backing off");
            thread::sleep(RETRY_BACKOFF);
            return;
        }
    };

    let audio = sdr_dsp::demodulate(
        &samples,
        DEFAULT_MANUAL_SAMPLE_RATE_HZ,
        params.squelch_db,
        params.demod_mode,
        params.volume,
    );
    sink.write(&audio);
}

fn pause(ctx: &WorkerContext) {
    let mut params = ctx.params.lock().unwrap_or_else(|p| p.into_inner());
    params.running = RunState::Paused;
}

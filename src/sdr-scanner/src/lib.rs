// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The scanner engine: the paused/scan/manual state machine, its control
//! surface, and the queues it hands results to (spec §4.4).

pub mod audio;
pub mod queues;
pub mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use sdr_core::{
    round_buffer_size, Band, DemodMode, DetectionEvent, Gain, RunState, ScanMode, ScannerParams,
};
use sdr_driver::ReceiverHandle;
use sdr_logger::DetectionLogger;

use queues::SpectrumSlot;
use worker::WorkerContext;

/// The scanner engine. Owns the worker thread for its entire lifetime; every
/// method here is thread-safe and non-blocking on the worker (spec §4.4:
/// "every mutator acquires the parameter mutex, updates fields, and returns;
/// it MUST NOT block on the worker").
pub struct ScannerEngine {
    params: Arc<Mutex<ScannerParams>>,
    driver: Arc<dyn ReceiverHandle>,
    shutdown: Arc<AtomicBool>,
    result_rx: Mutex<mpsc::Receiver<DetectionEvent>>,
    spectrum: Arc<SpectrumSlot>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ScannerEngine {
    /// Construct the engine and immediately spawn its worker thread, paused.
    /// `bands` is loaded once by the caller and never mutated afterward
    /// (spec §3: "bands are loaded once by the external collaborator and
    /// passed by reference at scanner construction").
    pub fn new(
        bands: Vec<Band>,
        driver: Arc<dyn ReceiverHandle>,
        logger: Arc<DetectionLogger>,
    ) -> Self {
        let params = Arc::new(Mutex::new(ScannerParams::default()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let spectrum = Arc::new(SpectrumSlot::new());
        let (result_tx, result_rx) = mpsc::channel();

        let ctx = WorkerContext {
            driver: driver.clone(),
            logger,
            bands: Arc::new(bands),
            params: params.clone(),
            result_tx,
            spectrum: spectrum.clone(),
            shutdown: shutdown.clone(),
        };
        let handle = std::thread::spawn(move || worker::run(ctx));

        Self {
            params,
            driver,
            shutdown,
            result_rx: Mutex::new(result_rx),
            spectrum,
            handle: Mutex::new(Some(handle)),
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut ScannerParams)) {
        let mut params = self.params.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut params);
    }

    /// Snapshot of every mutable scanner parameter.
    pub fn params(&self) -> ScannerParams {
        self.params.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn start_scan(&self) {
        self.mutate(|p| p.running = RunState::Active);
    }

    pub fn stop_scan(&self) {
        self.mutate(|p| p.running = RunState::Paused);
    }

    pub fn set_gain(&self, gain: Gain) {
        self.mutate(|p| p.gain = gain);
    }

    pub fn set_threshold(&self, threshold_db: f64) {
        self.mutate(|p| p.threshold_db = threshold_db);
    }

    pub fn set_squelch(&self, squelch_db: f64) {
        self.mutate(|p| p.squelch_db = squelch_db);
    }

    /// Rounds `n` down to the nearest multiple of the manual-mode decimation
    /// factor before storing it (spec §8 property 7).
    pub fn set_buffer_size(&self, n: u32) {
        let rounded = round_buffer_size(n);
        self.mutate(|p| p.buffer_size = rounded);
    }

    pub fn set_manual_freq(&self, freq_hz: f64) {
        self.mutate(|p| p.manual_freq_hz = freq_hz);
    }

    /// Switch to manual mode tuned to `freq_hz` in one atomic update, so the
    /// worker never observes a manual-mode tick with a stale frequency.
    pub fn set_manual_mode(&self, freq_hz: f64) {
        self.mutate(|p| {
            p.manual_freq_hz = freq_hz;
            p.mode = ScanMode::Manual;
        });
    }

    pub fn exit_manual_mode(&self) {
        self.mutate(|p| p.mode = ScanMode::Scan);
    }

    pub fn toggle_mode(&self, is_manual: bool) {
        self.mutate(|p| {
            p.mode = if is_manual {
                ScanMode::Manual
            } else {
                ScanMode::Scan
            };
        });
    }

    pub fn set_demod_mode(&self, mode: DemodMode) {
        self.mutate(|p| p.demod_mode = mode);
    }

    pub fn set_spectrum_enabled(&self, enabled: bool) {
        self.mutate(|p| p.spectrum_enabled = enabled);
    }

    pub fn set_volume(&self, volume: f32) {
        self.mutate(|p| p.volume = volume.clamp(0.0, 1.0));
    }

    /// Set PPM correction. Applied to the driver immediately (cached there
    /// if currently disconnected, per `Driver::set_ppm`); `connect()` reapplies
    /// it on the next scan pass if the driver was disconnected (spec §4.1,
    /// §8 scenario F).
    pub fn set_ppm(&self, ppm: i32) {
        self.mutate(|p| p.ppm = ppm);
        if let Err(e) = self.driver.set_ppm(ppm) {
            tracing::warn!(error = %e, "failed to apply ppm correction");
        }
    }

    /// Non-blocking poll for the next detection event, if any.
    pub fn try_recv_event(&self) -> Option<DetectionEvent> {
        self.result_rx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .try_recv()
            .ok()
    }

    /// Blocking wait for the next detection event, used by tests and batch
    /// consumers that want to drain a known number of events.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<DetectionEvent> {
        self.result_rx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .recv_timeout(timeout)
            .ok()
    }

    /// Take the pending spectrum snapshot, if one has been published.
    pub fn take_spectrum(&self) -> Option<sdr_core::SpectrumSnapshot> {
        self.spectrum.take()
    }

    /// Exit manual mode, clear the run flag, wait out the shutdown grace
    /// period, then join the worker (spec §4.4 shutdown sequence: "exit
    /// manual mode → clear run flag → brief grace period → stop and close
    /// audio sink → disconnect driver"). The worker itself disconnects the
    /// driver and drops the audio sink on exit.
    pub fn shutdown(&self) {
        self.mutate(|p| {
            p.mode = ScanMode::Scan;
            p.running = RunState::Paused;
        });
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScannerEngine {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Acquire) {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use sdr_driver::{Driver, DummyDevice, RawDevice};

    /// A test-only device that always returns a strong single tone, so scan
    /// analysis reliably crosses any reasonable threshold (spec §8 scenario
    /// E: log five detections over one band, verify queue and logger agree).
    struct LoudDevice {
        connected: bool,
        center_hz: f64,
        sample_rate_hz: f64,
    }

    impl LoudDevice {
        fn new() -> Self {
            Self {
                connected: false,
                center_hz: 0.0,
                sample_rate_hz: 0.0,
            }
        }
    }

    impl RawDevice for LoudDevice {
        fn connect(&mut self) -> sdr_driver::DriverResult<()> {
            self.connected = true;
            Ok(())
        }
        fn disconnect(&mut self) {
            self.connected = false;
        }
        fn tune(&mut self, freq_hz: f64) -> sdr_driver::DriverResult<()> {
            self.center_hz = freq_hz;
            Ok(())
        }
        fn set_gain(&mut self, _gain: Gain) -> sdr_driver::DriverResult<()> {
            Ok(())
        }
        fn set_sample_rate(&mut self, hz: f64) -> sdr_driver::DriverResult<()> {
            self.sample_rate_hz = hz;
            Ok(())
        }
        fn read_samples(&mut self, n: usize) -> sdr_driver::DriverResult<Vec<Complex<f32>>> {
            Ok((0..n)
                .map(|i| {
                    let phase = 2.0 * std::f32::consts::PI * 0.1 * i as f32;
                    Complex::new(phase.cos(), phase.sin())
                })
                .collect())
        }
        fn set_ppm(&mut self, _ppm: i32) -> sdr_driver::DriverResult<()> {
            Ok(())
        }
        fn get_center_freq(&self) -> Option<f64> {
            self.connected.then_some(self.center_hz)
        }
        fn get_sample_rate(&self) -> Option<f64> {
            self.connected.then_some(self.sample_rate_hz)
        }
        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn band(id: &str, start: f64, end: f64, step: f64) -> Band {
        Band::new(id, id, true, start, end, step, Gain::Auto, 1, 5.0).unwrap()
    }

    fn engine(bands: Vec<Band>) -> ScannerEngine {
        let driver: Arc<dyn ReceiverHandle> = Arc::new(Driver::new(DummyDevice::new()));
        let logger = Arc::new(DetectionLogger::open_in_memory().unwrap());
        ScannerEngine::new(bands, driver, logger)
    }

    #[test]
    fn starts_paused() {
        let e = engine(vec![band("a", 100e6, 101e6, 100e3)]);
        assert_eq!(e.params().running, RunState::Paused);
        e.shutdown();
    }

    #[test]
    fn set_buffer_size_rounds_down() {
        let e = engine(vec![band("a", 100e6, 101e6, 100e3)]);
        e.set_buffer_size(204_801);
        assert_eq!(e.params().buffer_size, 204_800);
        e.shutdown();
    }

    #[test]
    fn set_manual_mode_switches_mode_and_freq() {
        let e = engine(vec![band("a", 100e6, 101e6, 100e3)]);
        e.set_manual_mode(145.5e6);
        let p = e.params();
        assert_eq!(p.mode, ScanMode::Manual);
        assert_eq!(p.manual_freq_hz, 145.5e6);
        e.shutdown();
    }

    #[test]
    fn exit_manual_mode_returns_to_scan() {
        let e = engine(vec![band("a", 100e6, 101e6, 100e3)]);
        e.set_manual_mode(145.5e6);
        e.exit_manual_mode();
        assert_eq!(e.params().mode, ScanMode::Scan);
        e.shutdown();
    }

    #[test]
    fn detects_and_logs_strong_signal_over_one_band() {
        let driver: Arc<dyn ReceiverHandle> = Arc::new(Driver::new(LoudDevice::new()));
        let logger = Arc::new(DetectionLogger::open_in_memory().unwrap());
        let bands = vec![Band::new(
            "b", "B", true, 100.0e6, 100.2e6, 100e3, Gain::Auto, 0, 10.0,
        )
        .unwrap()];
        let e = ScannerEngine::new(bands, driver, logger);
        e.start_scan();

        let mut seen = 0;
        for _ in 0..5 {
            if e.recv_event_timeout(Duration::from_millis(500)).is_some() {
                seen += 1;
            }
        }
        e.stop_scan();
        e.shutdown();
        assert_eq!(seen, 5);
    }

    #[test]
    fn shutdown_joins_worker_thread() {
        let e = engine(vec![band("a", 100e6, 101e6, 100e3)]);
        e.start_scan();
        std::thread::sleep(Duration::from_millis(20));
        e.shutdown();
        assert!(e.handle.lock().unwrap().is_none());
    }
}

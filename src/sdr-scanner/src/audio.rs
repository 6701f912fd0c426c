// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Manual-mode audio sink. Treats audio as a capability (spec §9 "Audio
//! optionality"): if no output device can be opened, manual mode still runs
//! and simply produces no sound.
//!
//! Grounded on `trx-client/src/audio_bridge.rs::run_playback`: a ring buffer
//! behind a mutex, fed by the worker thread and drained by the cpal output
//! callback, built and owned entirely on the worker thread so the stream
//! itself never has to cross a thread boundary.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use sdr_core::AUDIO_RATE_HZ;

/// A place to write demodulated mono audio. Implementations must not block
/// the caller for more than a ring-buffer mutex hand-off.
pub trait AudioSink {
    fn write(&mut self, samples: &[f32]);
}

/// No-op sink used when no output device is available.
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn write(&mut self, _samples: &[f32]) {}
}

/// cpal-backed sink: a mono 48 kHz stream drained from a ring buffer.
pub struct CpalAudioSink {
    ring: Arc<Mutex<VecDeque<f32>>>,
    stream: cpal::Stream,
}

impl AudioSink for CpalAudioSink {
    fn write(&mut self, samples: &[f32]) {
        let mut rb = self.ring.lock().unwrap_or_else(|p| p.into_inner());
        rb.extend(samples.iter().copied());
        let max_len = AUDIO_RATE_HZ as usize;
        if rb.len() > max_len {
            let drain = rb.len() - max_len;
            rb.drain(..drain);
        }
    }
}

/// Open the platform's default output device as a 48 kHz mono sink, falling
/// back to a no-op sink on any failure (no device, unsupported config,
/// stream build error).
pub fn open_output_sink() -> Box<dyn AudioSink> {
    match try_open_cpal() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "no audio output available, manual mode will be silent");
            Box::new(NullAudioSink)
        }
    }
}

fn try_open_cpal() -> Result<CpalAudioSink, Box<dyn std::error::Error + Send + Sync>> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("no default output audio device")?;
    let stream_cfg = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(AUDIO_RATE_HZ),
        buffer_size: cpal::BufferSize::Default,
    };

    let ring = Arc::new(Mutex::new(VecDeque::<f32>::with_capacity(
        AUDIO_RATE_HZ as usize,
    )));
    let ring_cb = ring.clone();

    let stream = device.build_output_stream(
        &stream_cfg,
        move |data: &mut [f32], _| {
            let mut rb = ring_cb.lock().unwrap_or_else(|p| p.into_inner());
            for sample in data.iter_mut() {
                *sample = rb.pop_front().unwrap_or(0.0);
            }
        },
        move |err| {
            tracing::warn!(error = %err, "audio output stream error");
        },
        None,
    )?;
    stream.play()?;

    Ok(CpalAudioSink { ring, stream })
}

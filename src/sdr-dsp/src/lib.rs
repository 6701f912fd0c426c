// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Multi-mode demodulation and spectrum analysis DSP pipeline (spec §4.2,
//! §4.4 step 3).

pub mod demod;
pub mod filter;
pub mod spectrum;

pub use demod::{decimation_factor, demodulate, is_squelched};
pub use spectrum::{analyze, Analysis};

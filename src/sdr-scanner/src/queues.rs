// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! UI handoff queues: an unbounded event queue and a single-slot,
//! newest-pending spectrum slot (spec §9 "Queue-based UI handoff").

use std::sync::Mutex;

use sdr_core::SpectrumSnapshot;

/// Single-slot spectrum handoff. The worker publishes only when the slot is
/// empty (spec §4.4 step 5); the consumer empties it by calling `take`.
pub struct SpectrumSlot {
    inner: Mutex<Option<SpectrumSnapshot>>,
}

impl SpectrumSlot {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Publish `snapshot` only if the slot is currently empty. Returns
    /// whether the snapshot was stored. Never blocks the worker.
    pub fn try_publish(&self, snapshot: SpectrumSnapshot) -> bool {
        let Ok(mut slot) = self.inner.lock() else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(snapshot);
        true
    }

    /// Take the pending snapshot, if any, leaving the slot empty.
    pub fn take(&self) -> Option<SpectrumSnapshot> {
        let mut slot = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        slot.take()
    }
}

impl Default for SpectrumSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: usize) -> SpectrumSnapshot {
        SpectrumSnapshot {
            frequencies_hz: vec![0.0; n],
            power_db: vec![0.0; n],
        }
    }

    #[test]
    fn publish_fails_while_occupied() {
        let slot = SpectrumSlot::new();
        assert!(slot.try_publish(snap(4)));
        assert!(!slot.try_publish(snap(8)));
        let taken = slot.take().unwrap();
        assert_eq!(taken.frequencies_hz.len(), 4);
    }

    #[test]
    fn publish_succeeds_after_take() {
        let slot = SpectrumSlot::new();
        assert!(slot.try_publish(snap(4)));
        slot.take();
        assert!(slot.try_publish(snap(8)));
    }
}

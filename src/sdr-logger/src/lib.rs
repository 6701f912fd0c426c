// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Append-only persistent store of detection events (spec §4.3). Backed by
//! `rusqlite` — see `DESIGN.md` for why this crate, not one already used
//! elsewhere in this codebase, was chosen for the job.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use sdr_core::DetectionEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open detection store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("schema initialization failed: {0}")]
    Schema(#[source] rusqlite::Error),
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),
}

/// One row as persisted in the `detections` table, oldest field order
/// matching spec §3/§6.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedDetection {
    pub id: i64,
    pub timestamp: String,
    pub frequency_hz: f64,
    pub power_db: f64,
    pub band_name: String,
}

/// Append-only, mutex-serialized detection logger over a single SQLite file.
pub struct DetectionLogger {
    conn: Mutex<Connection>,
}

impl DetectionLogger {
    /// Open (creating if absent) the store at `path` and ensure the schema
    /// exists. Safe to call repeatedly over the same file (spec §8 property
    /// 8: "two successive constructions over the same store do not fail or
    /// duplicate schema objects").
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let path_ref = path.as_ref();
        let conn = Connection::open(path_ref).map_err(|source| LoggerError::Open {
            path: path_ref.display().to_string(),
            source,
        })?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, for tests.
    pub fn open_in_memory() -> Result<Self, LoggerError> {
        let conn = Connection::open_in_memory().map_err(|source| LoggerError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), LoggerError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS detections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                frequency_hz REAL NOT NULL,
                power_db REAL NOT NULL,
                band_name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_timestamp ON detections(timestamp);
            CREATE INDEX IF NOT EXISTS idx_frequency ON detections(frequency_hz);
            CREATE INDEX IF NOT EXISTS idx_band ON detections(band_name);",
        )
        .map_err(LoggerError::Schema)
    }

    /// Persist one detection event. Best-effort (spec §4.3): on any
    /// persistence failure, the error is logged and `false` is returned; the
    /// caller MUST NOT treat this as fatal to scanning.
    pub fn log_event(&self, event: &DetectionEvent) -> bool {
        let Ok(conn) = self.conn.lock() else {
            tracing::warn!("detection logger mutex poisoned, dropping event");
            return false;
        };
        let result = conn.execute(
            "INSERT INTO detections (timestamp, frequency_hz, power_db, band_name)
             VALUES (?1, ?2, ?3, ?4)",
            (
                event.timestamp.to_rfc3339(),
                event.frequency_hz,
                event.relative_power_db,
                &event.band_name,
            ),
        );
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist detection event");
            return false;
        }
        true
    }

    /// Most recent `limit` rows, newest-first by insertion id.
    pub fn recent(&self, limit: u64) -> Result<Vec<PersistedDetection>, LoggerError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, frequency_hz, power_db, band_name
                 FROM detections ORDER BY id DESC LIMIT ?1",
            )
            .map_err(LoggerError::Query)?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(PersistedDetection {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    frequency_hz: row.get(2)?,
                    power_db: row.get(3)?,
                    band_name: row.get(4)?,
                })
            })
            .map_err(LoggerError::Query)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(LoggerError::Query)
    }

    /// Total number of persisted detections.
    pub fn count(&self) -> Result<u64, LoggerError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        conn.query_row("SELECT COUNT(*) FROM detections", [], |row| row.get(0))
            .map_err(LoggerError::Query)
    }

    /// Remove all persisted detections.
    pub fn clear(&self) -> Result<(), LoggerError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        conn.execute("DELETE FROM detections", [])
            .map_err(LoggerError::Query)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_event(freq: f64, band: &str) -> DetectionEvent {
        DetectionEvent {
            timestamp: Utc::now(),
            frequency_hz: freq,
            center_freq_hz: freq - 1000.0,
            power_db: -40.0,
            noise_floor_db: -70.0,
            relative_power_db: 30.0,
            band_id: "b".to_string(),
            band_name: band.to_string(),
        }
    }

    #[test]
    fn schema_init_is_idempotent() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("sdr-logger-test-{}.sqlite3", std::process::id()));
        {
            let _l1 = DetectionLogger::open(&path).unwrap();
        }
        let l2 = DetectionLogger::open(&path).unwrap();
        assert_eq!(l2.count().unwrap(), 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn log_and_count_five_events() {
        let logger = DetectionLogger::open_in_memory().unwrap();
        for i in 0..5 {
            assert!(logger.log_event(&sample_event(100e6 + i as f64 * 100e3, "b")));
        }
        assert_eq!(logger.count().unwrap(), 5);
    }

    #[test]
    fn recent_is_newest_first() {
        let logger = DetectionLogger::open_in_memory().unwrap();
        logger.log_event(&sample_event(100e6, "first"));
        logger.log_event(&sample_event(101e6, "second"));
        let rows = logger.recent(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].band_name, "second");
        assert_eq!(rows[1].band_name, "first");
    }

    #[test]
    fn clear_removes_all_rows() {
        let logger = DetectionLogger::open_in_memory().unwrap();
        logger.log_event(&sample_event(100e6, "b"));
        logger.clear().unwrap();
        assert_eq!(logger.count().unwrap(), 0);
    }
}

// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Tiered TOML configuration loading for application-level settings (device
//! index, database path, log level, initial parameter defaults).
//!
//! Band descriptors are not configuration in this sense — parsing the
//! on-disk band format remains an external-collaborator concern (spec §1, §6).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Search paths for the combined `sdr-station.toml` config file (CWD → XDG →
/// `/etc`).
pub fn combined_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("sdr-station.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("sdr-station").join("sdr-station.toml"));
    }
    paths.push(PathBuf::from("/etc/sdr-station/sdr-station.toml"));
    paths
}

fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

    let Some(section) = table.get(key) else {
        return Ok(None);
    };

    let section_toml = toml::to_string(section)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    let cfg = toml::from_str::<T>(&section_toml)
        .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
    Ok(Some(cfg))
}

/// Trait for loading configuration files with default search paths, the same
/// tiered shape used throughout this codebase's binaries.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Config filename (e.g. `"sdr-station.toml"`).
    fn config_filename() -> &'static str;

    /// Section key inside a combined `sdr-station.toml` file. Return `None`
    /// (the default) to disable combined-file support.
    fn combined_key() -> Option<&'static str> {
        None
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if let Some(key) = Self::combined_key() {
            if let Ok(Some(cfg)) = load_section_from_file::<Self>(path, key) {
                return Ok(cfg);
            }
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Search default paths (CWD → XDG → `/etc`) and load the first file found.
    /// Returns `(config, path_where_found)`, or `(Default::default(), None)` if
    /// nothing was found.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let combined = combined_config_paths();
        let flat = Self::default_search_paths();

        let tiers = combined.len().max(flat.len());
        for i in 0..tiers {
            if let Some(key) = Self::combined_key() {
                if let Some(path) = combined.get(i) {
                    if path.exists() {
                        if let Some(cfg) = load_section_from_file::<Self>(path, key)? {
                            return Ok((cfg, Some(path.clone())));
                        }
                    }
                }
            }
            if let Some(path) = flat.get(i) {
                if path.exists() {
                    let cfg = Self::load_from_file(path)?;
                    return Ok((cfg, Some(path.clone())));
                }
            }
        }
        Ok((Self::default(), None))
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(Self::config_filename())];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sdr-station").join(Self::config_filename()));
        }

        paths.push(PathBuf::from("/etc/sdr-station").join(Self::config_filename()));
        paths
    }
}

/// Application-level settings for the `sdr-app` binary: hardware selection,
/// persistence location, logging verbosity, and initial scanner parameter
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub device_index: u32,
    pub db_path: PathBuf,
    pub log_level: String,
    pub initial_gain_db: Option<f64>,
    pub initial_squelch_db: f64,
    pub initial_volume: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            device_index: 0,
            db_path: PathBuf::from("scan_results.sqlite3"),
            log_level: "info".to_string(),
            initial_gain_db: None,
            initial_squelch_db: -80.0,
            initial_volume: 1.0,
        }
    }
}

impl ConfigFile for AppConfig {
    fn config_filename() -> &'static str {
        "sdr-app.toml"
    }

    fn combined_key() -> Option<&'static str> {
        Some("sdr-app")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/sdr-app-config-test.toml");
        assert!(AppConfig::load_from_file(path).is_err());
    }

    #[test]
    fn flat_file_loads_fields() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "sdr-app-test-{}.toml",
            std::process::id()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "device_index = 2").unwrap();
        writeln!(f, "db_path = \"custom.sqlite3\"").unwrap();
        writeln!(f, "log_level = \"debug\"").unwrap();

        let cfg = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(cfg.device_index, 2);
        assert_eq!(cfg.db_path, PathBuf::from("custom.sqlite3"));
        assert_eq!(cfg.log_level, "debug");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn default_search_paths_favor_cwd_over_xdg_over_etc() {
        // Property 9: CWD tier must be searched before XDG, which must be
        // searched before /etc (`ConfigFile::load_from_default_paths`'s tier
        // order is load-first-match, so the order of this Vec is the
        // contract).
        let paths = AppConfig::default_search_paths();
        assert_eq!(paths[0], PathBuf::from("sdr-app.toml"));
        assert_eq!(
            paths.last().unwrap(),
            &PathBuf::from("/etc/sdr-station/sdr-app.toml")
        );
    }
}

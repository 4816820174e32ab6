//! Runtime configuration loaded from the environment

use std::path::PathBuf;
use std::time::Duration;

/// Where persisted state lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Nothing survives a restart
    Memory,
    /// One JSON file per key inside this directory
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    /// How long the judge scores take to slide into sorted order
    pub sort_transition: Duration,
    /// How long the median takes to fly to the players before it is applied
    pub score_flight: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::Directory(PathBuf::from("data")),
            sort_transition: Duration::from_millis(600),
            score_flight: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let storage = match std::env::var("GAMECHANGER_DATA_DIR") {
            Ok(dir) => {
                let trimmed = dir.trim();
                if trimmed.eq_ignore_ascii_case("memory") {
                    StorageConfig::Memory
                } else if trimmed.is_empty() {
                    defaults.storage
                } else {
                    StorageConfig::Directory(PathBuf::from(trimmed))
                }
            }
            Err(_) => defaults.storage,
        };

        let sort_transition = std::env::var("GAMECHANGER_SORT_MS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.sort_transition);

        let score_flight = std::env::var("GAMECHANGER_SCORE_FLIGHT_MS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.score_flight);

        tracing::info!(
            ?storage,
            sort_ms = sort_transition.as_millis() as u64,
            score_flight_ms = score_flight.as_millis() as u64,
            "Config loaded"
        );

        Self {
            storage,
            sort_transition,
            score_flight,
        }
    }

    /// Config for tests and throwaway sessions: in-memory store, default timings
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            ..Self::default()
        }
    }
}

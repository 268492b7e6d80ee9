use std::{env, path::PathBuf, sync::Arc};

use racer_core::EngineConfig;

use crate::store::RaceStore;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_DATA_DIR: &str = "./data";
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 64 * 1024;
pub(crate) const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub(crate) const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) races: Arc<RaceStore>,
    /// Vehicle names a submission may carry.
    pub(crate) vehicles: Arc<Vec<String>>,
    pub(crate) leaderboard_limit: usize,
    pub(crate) json_limit: usize,
    pub(crate) http_workers: Option<usize>,
}

impl AppState {
    pub(crate) fn new(races: RaceStore, engine: &EngineConfig) -> Self {
        let mut leaderboard_limit = read_env_usize("LEADERBOARD_LIMIT", DEFAULT_LEADERBOARD_LIMIT);
        if leaderboard_limit > MAX_LEADERBOARD_LIMIT {
            tracing::warn!(
                "LEADERBOARD_LIMIT ({}) exceeds {}. Falling back to default.",
                leaderboard_limit,
                MAX_LEADERBOARD_LIMIT
            );
            leaderboard_limit = DEFAULT_LEADERBOARD_LIMIT;
        }

        Self {
            races: Arc::new(races),
            vehicles: Arc::new(engine.vehicle_names().map(str::to_string).collect()),
            leaderboard_limit,
            json_limit: read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
            http_workers: read_env_optional_usize("HTTP_WORKERS"),
        }
    }
}

pub(crate) fn bind_addr() -> String {
    env::var("API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

pub(crate) fn data_dir() -> PathBuf {
    env::var("DATA_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    read_env_optional_usize(name).unwrap_or(default)
}

pub(crate) fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw request body. Fields stay untyped so every bad field can be reported
/// at once instead of failing on the first type mismatch.
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RaceSubmission {
    #[serde(default)]
    pub(crate) player_name: Option<Value>,
    #[serde(default)]
    pub(crate) github_username: Option<Value>,
    #[serde(default)]
    pub(crate) base_score: Option<Value>,
    #[serde(default)]
    pub(crate) time_penalty: Option<Value>,
    #[serde(default)]
    pub(crate) life_bonus: Option<Value>,
    #[serde(default)]
    pub(crate) completion_bonus: Option<Value>,
    #[serde(default)]
    pub(crate) final_score: Option<Value>,
    #[serde(default)]
    pub(crate) race_time: Option<Value>,
    #[serde(default)]
    pub(crate) vehicle: Option<Value>,
    #[serde(default)]
    pub(crate) driver: Option<Value>,
    #[serde(default)]
    pub(crate) lives_remaining: Option<Value>,
}

/// A validated submission, handle already normalized to `@name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewRace {
    pub(crate) player_name: String,
    pub(crate) github_username: String,
    pub(crate) base_score: u32,
    pub(crate) time_penalty: u32,
    pub(crate) life_bonus: u32,
    pub(crate) completion_bonus: u32,
    pub(crate) final_score: u32,
    pub(crate) race_time: u64,
    pub(crate) vehicle: String,
    pub(crate) driver: String,
    pub(crate) lives_remaining: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct RaceRecord {
    pub(crate) id: i64,
    pub(crate) player_name: String,
    pub(crate) github_username: String,
    pub(crate) base_score: u32,
    pub(crate) time_penalty: u32,
    pub(crate) life_bonus: u32,
    pub(crate) completion_bonus: u32,
    pub(crate) final_score: u32,
    /// Milliseconds.
    pub(crate) race_time: u64,
    pub(crate) vehicle: String,
    pub(crate) driver: String,
    pub(crate) lives_remaining: u32,
    pub(crate) created_at_unix_s: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct LeaderboardQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RaceCreatedResponse {
    pub(crate) success: bool,
    pub(crate) message: &'static str,
    pub(crate) data: RaceRecord,
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardResponse {
    pub(crate) success: bool,
    pub(crate) data: Vec<RaceRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) stored_races: usize,
    pub(crate) leaderboard_limit: usize,
    pub(crate) json_limit_bytes: usize,
    pub(crate) vehicles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) http_workers: Option<usize>,
}

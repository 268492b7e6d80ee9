use serde::{Deserialize, Serialize};

use crate::config::RaceConfig;

/// Summary of one finished race, keyed the way the leaderboard service reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub player_name: String,
    #[serde(rename = "github_username")]
    pub github_handle: String,
    pub base_score: u32,
    pub time_penalty: u32,
    pub life_bonus: u32,
    pub completion_bonus: u32,
    pub final_score: u32,
    #[serde(rename = "race_time")]
    pub race_time_ms: u64,
    #[serde(rename = "vehicle")]
    pub vehicle_name: String,
    #[serde(rename = "driver")]
    pub driver_name: String,
    pub lives_remaining: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: u32,
    pub time_penalty: u32,
    pub life_bonus: u32,
    pub completion_bonus: u32,
    pub final_score: u32,
}

/// `max(0, floor(score) - floor(seconds) + lives * bonus + completion)`.
pub fn compute_score(
    score: f64,
    race_time_ms: u64,
    lives: u32,
    completed: bool,
    race: &RaceConfig,
) -> ScoreBreakdown {
    let base_score = score.max(0.0).floor() as u32;
    let time_penalty = (race_time_ms / 1000) as u32;
    let life_bonus = lives * race.life_bonus;
    let completion_bonus = if completed { race.completion_bonus } else { 0 };
    let total = i64::from(base_score) - i64::from(time_penalty)
        + i64::from(life_bonus)
        + i64::from(completion_bonus);

    ScoreBreakdown {
        base_score,
        time_penalty,
        life_bonus,
        completion_bonus,
        final_score: total.clamp(0, i64::from(u32::MAX)) as u32,
    }
}

/// Receives each finished race exactly once. Returns whether the result
/// was accepted; a rejection never blocks the game loop.
pub trait ResultSink {
    fn submit_race(&mut self, result: &RaceResult) -> bool;
}

impl<F> ResultSink for F
where
    F: FnMut(&RaceResult) -> bool,
{
    fn submit_race(&mut self, result: &RaceResult) -> bool {
        self(result)
    }
}

/// Keeps every submitted result in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub results: Vec<RaceResult>,
    pub reject: bool,
}

impl ResultSink for RecordingSink {
    fn submit_race(&mut self, result: &RaceResult) -> bool {
        self.results.push(result.clone());
        !self.reject
    }
}

/// Drops results. Used when no leaderboard is reachable.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl ResultSink for DiscardSink {
    fn submit_race(&mut self, _result: &RaceResult) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    NotSubmitted,
    Accepted,
    Failed,
}

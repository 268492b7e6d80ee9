use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};

use super::*;

pub(super) fn now_unix_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Column order shared by every SELECT below.
const RACE_COLUMNS: &str = "id, player_name, github_username, base_score, time_penalty,
     life_bonus, completion_bonus, final_score, race_time, vehicle, driver,
     lives_remaining, created_at";

struct RawRaceRow {
    id: i64,
    player_name: String,
    github_username: String,
    base_score: i64,
    time_penalty: i64,
    life_bonus: i64,
    completion_bonus: i64,
    final_score: i64,
    race_time: i64,
    vehicle: String,
    driver: String,
    lives_remaining: i64,
    created_at: i64,
}

impl RawRaceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            player_name: row.get(1)?,
            github_username: row.get(2)?,
            base_score: row.get(3)?,
            time_penalty: row.get(4)?,
            life_bonus: row.get(5)?,
            completion_bonus: row.get(6)?,
            final_score: row.get(7)?,
            race_time: row.get(8)?,
            vehicle: row.get(9)?,
            driver: row.get(10)?,
            lives_remaining: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn into_record(self) -> RaceRecord {
        RaceRecord {
            id: self.id,
            player_name: self.player_name,
            github_username: self.github_username,
            base_score: self.base_score as u32,
            time_penalty: self.time_penalty as u32,
            life_bonus: self.life_bonus as u32,
            completion_bonus: self.completion_bonus as u32,
            final_score: self.final_score as u32,
            race_time: self.race_time as u64,
            vehicle: self.vehicle,
            driver: self.driver,
            lives_remaining: self.lives_remaining as u32,
            created_at_unix_s: self.created_at as u64,
        }
    }
}

impl RaceStore {
    /// Insert one race row and return its id.
    pub(super) fn insert_row(
        conn: &Connection,
        race: &NewRace,
        created_at: u64,
    ) -> Result<i64, String> {
        conn.execute(
            "INSERT INTO races (
                player_name, github_username, base_score, time_penalty,
                life_bonus, completion_bonus, final_score, race_time,
                vehicle, driver, lives_remaining, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                race.player_name,
                race.github_username,
                race.base_score as i64,
                race.time_penalty as i64,
                race.life_bonus as i64,
                race.completion_bonus as i64,
                race.final_score as i64,
                race.race_time as i64,
                race.vehicle,
                race.driver,
                race.lives_remaining as i64,
                created_at as i64,
            ],
        )
        .map_err(|e| format!("insert race failed: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    /// Ties on score and time fall back to insertion order.
    pub(super) fn top_rows(conn: &Connection, limit: usize) -> Result<Vec<RaceRecord>, String> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {RACE_COLUMNS} FROM races
                 ORDER BY final_score DESC, race_time ASC, id ASC
                 LIMIT ?1"
            ))
            .map_err(|e| format!("prepare leaderboard failed: {e}"))?;

        let rows = stmt
            .query_map(params![limit as i64], RawRaceRow::from_row)
            .map_err(|e| format!("query leaderboard failed: {e}"))?;

        rows.map(|row| {
            row.map(RawRaceRow::into_record)
                .map_err(|e| format!("read leaderboard row failed: {e}"))
        })
        .collect()
    }
}

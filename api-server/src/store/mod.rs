mod db;

use std::{fs, path::Path, sync::Mutex};

use rusqlite::Connection;

use crate::types::{NewRace, RaceRecord};

/// SQLite-backed store of submitted race results.
pub struct RaceStore {
    conn: Mutex<Connection>,
}

impl RaceStore {
    /// Open (or create) `races.db` under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, String> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("failed to create data dir {}: {e}", data_dir.display()))?;

        let db_path = data_dir.join("races.db");
        let conn = Connection::open(&db_path)
            .map_err(|e| format!("failed to open SQLite at {}: {e}", db_path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(|e| format!("failed to set pragmas: {e}"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS races (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name       TEXT NOT NULL,
                github_username   TEXT NOT NULL,
                base_score        INTEGER NOT NULL,
                time_penalty      INTEGER NOT NULL,
                life_bonus        INTEGER NOT NULL,
                completion_bonus  INTEGER NOT NULL DEFAULT 0,
                final_score       INTEGER NOT NULL,
                race_time         INTEGER NOT NULL,
                vehicle           TEXT NOT NULL,
                driver            TEXT NOT NULL,
                lives_remaining   INTEGER NOT NULL,
                created_at        INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_races_leaderboard
                ON races(final_score DESC, race_time ASC);",
        )
        .map_err(|e| format!("failed to create schema: {e}"))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        tracing::info!(
            path = %db_path.display(),
            races = store.count()?,
            "race store opened"
        );
        Ok(store)
    }

    /// Persist one validated submission and return the stored row.
    pub(crate) fn insert(&self, race: &NewRace) -> Result<RaceRecord, String> {
        let conn = self.lock()?;
        let created_at = db::now_unix_s();
        let id = Self::insert_row(&conn, race, created_at)?;
        Ok(RaceRecord {
            id,
            player_name: race.player_name.clone(),
            github_username: race.github_username.clone(),
            base_score: race.base_score,
            time_penalty: race.time_penalty,
            life_bonus: race.life_bonus,
            completion_bonus: race.completion_bonus,
            final_score: race.final_score,
            race_time: race.race_time,
            vehicle: race.vehicle.clone(),
            driver: race.driver.clone(),
            lives_remaining: race.lives_remaining,
            created_at_unix_s: created_at,
        })
    }

    /// Best `limit` races: highest final score first, then fastest time.
    pub(crate) fn leaderboard(&self, limit: usize) -> Result<Vec<RaceRecord>, String> {
        let conn = self.lock()?;
        Self::top_rows(&conn, limit)
    }

    pub(crate) fn count(&self) -> Result<usize, String> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM races", [], |row| row.get::<_, i64>(0))
            .map(|count| count as usize)
            .map_err(|e| format!("count races failed: {e}"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "race store mutex poisoned".to_string())
    }
}

use actix_web::{
    http::StatusCode,
    web::{Data, Json, Query},
    HttpResponse, Responder,
};

use crate::config::{AppState, MAX_LEADERBOARD_LIMIT};
use crate::response::{internal_error, json_error_with_code, json_validation_error};
use crate::types::{
    HealthResponse, LeaderboardQuery, LeaderboardResponse, RaceCreatedResponse, RaceSubmission,
};
use crate::validation::validate_submission;

/// Returns `(error_message, error_code)` on failure.
pub(crate) fn resolve_limit(
    requested: Option<usize>,
    default: usize,
) -> Result<usize, (String, &'static str)> {
    let limit = requested.unwrap_or(default);
    if limit == 0 || limit > MAX_LEADERBOARD_LIMIT {
        return Err((
            format!("limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"),
            "invalid_limit",
        ));
    }
    Ok(limit)
}

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    let stored_races = match state.races.count() {
        Ok(count) => count,
        Err(e) => return internal_error("health check", e),
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "racer-leaderboard-api",
        stored_races,
        leaderboard_limit: state.leaderboard_limit,
        json_limit_bytes: state.json_limit,
        vehicles: state.vehicles.as_ref().clone(),
        http_workers: state.http_workers,
    })
}

pub(crate) async fn submit_race(
    state: Data<AppState>,
    body: Json<RaceSubmission>,
) -> impl Responder {
    let race = match validate_submission(&body, &state.vehicles) {
        Ok(race) => race,
        Err(errors) => {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "race rejected");
            return json_validation_error(&errors);
        }
    };

    let races = state.races.clone();
    let inserted = tokio::task::spawn_blocking(move || races.insert(&race)).await;

    match inserted {
        Ok(Ok(record)) => {
            tracing::info!(
                id = record.id,
                player = %record.github_username,
                final_score = record.final_score,
                race_time = record.race_time,
                "race stored"
            );
            HttpResponse::Created().json(RaceCreatedResponse {
                success: true,
                message: "Race result saved successfully!",
                data: record,
            })
        }
        Ok(Err(e)) => internal_error("submit_race", e),
        Err(e) => internal_error("submit_race worker", e),
    }
}

pub(crate) async fn leaderboard(
    state: Data<AppState>,
    query: Query<LeaderboardQuery>,
) -> impl Responder {
    let limit = match resolve_limit(query.limit, state.leaderboard_limit) {
        Ok(limit) => limit,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };

    let races = state.races.clone();
    match tokio::task::spawn_blocking(move || races.leaderboard(limit)).await {
        Ok(Ok(data)) => HttpResponse::Ok().json(LeaderboardResponse {
            success: true,
            data,
        }),
        Ok(Err(e)) => internal_error("leaderboard", e),
        Err(e) => internal_error("leaderboard worker", e),
    }
}

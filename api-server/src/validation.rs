use std::collections::BTreeMap;

use racer_core::constants::{HANDLE_MAX_CHARS, MAX_LIVES, PLAYER_NAME_MAX_CHARS};
use racer_core::profile::{normalize_handle, validate_handle};
use serde_json::Value;

use crate::types::{NewRace, RaceSubmission};

/// Messages per failing field, in field-name order.
pub(crate) type FieldErrors = BTreeMap<&'static str, Vec<String>>;

const DRIVER_MAX_CHARS: usize = 255;
/// SQLite stores integers as i64.
const RACE_TIME_MAX_MS: u64 = i64::MAX as u64;

pub(crate) fn validate_submission(
    submission: &RaceSubmission,
    vehicles: &[String],
) -> Result<NewRace, FieldErrors> {
    let mut errors = FieldErrors::new();

    let player_name = required_string(
        &mut errors,
        "player_name",
        submission.player_name.as_ref(),
        PLAYER_NAME_MAX_CHARS,
    );
    let github_username = required_string(
        &mut errors,
        "github_username",
        submission.github_username.as_ref(),
        HANDLE_MAX_CHARS,
    )
    .and_then(|handle| match validate_handle(&handle) {
        Ok(()) => Some(normalize_handle(&handle)),
        Err(err) => {
            reject(&mut errors, "github_username", err.to_string());
            None
        }
    });

    let base_score = required_u32(&mut errors, "base_score", submission.base_score.as_ref());
    let time_penalty = required_u32(&mut errors, "time_penalty", submission.time_penalty.as_ref());
    let life_bonus = required_u32(&mut errors, "life_bonus", submission.life_bonus.as_ref());
    let completion_bonus = match submission.completion_bonus.as_ref() {
        None | Some(Value::Null) => Some(0),
        Some(value) => required_u32(&mut errors, "completion_bonus", Some(value)),
    };
    let final_score = required_u32(&mut errors, "final_score", submission.final_score.as_ref());
    let race_time = required_integer(
        &mut errors,
        "race_time",
        submission.race_time.as_ref(),
        RACE_TIME_MAX_MS,
    );
    let lives_remaining = required_integer(
        &mut errors,
        "lives_remaining",
        submission.lives_remaining.as_ref(),
        u64::from(MAX_LIVES),
    )
    .map(|lives| lives as u32);

    let vehicle = required_string(&mut errors, "vehicle", submission.vehicle.as_ref(), usize::MAX)
        .and_then(|vehicle| {
            if vehicles.iter().any(|allowed| *allowed == vehicle) {
                Some(vehicle)
            } else {
                reject(
                    &mut errors,
                    "vehicle",
                    format!("vehicle must be one of: {}", vehicles.join(", ")),
                );
                None
            }
        });
    let driver = required_string(
        &mut errors,
        "driver",
        submission.driver.as_ref(),
        DRIVER_MAX_CHARS,
    );

    match (
        player_name,
        github_username,
        base_score,
        time_penalty,
        life_bonus,
        completion_bonus,
        final_score,
        race_time,
        vehicle,
        driver,
        lives_remaining,
    ) {
        (
            Some(player_name),
            Some(github_username),
            Some(base_score),
            Some(time_penalty),
            Some(life_bonus),
            Some(completion_bonus),
            Some(final_score),
            Some(race_time),
            Some(vehicle),
            Some(driver),
            Some(lives_remaining),
        ) if errors.is_empty() => Ok(NewRace {
            player_name,
            github_username,
            base_score,
            time_penalty,
            life_bonus,
            completion_bonus,
            final_score,
            race_time,
            vehicle,
            driver,
            lives_remaining,
        }),
        _ => Err(errors),
    }
}

fn reject(errors: &mut FieldErrors, field: &'static str, message: String) {
    errors.entry(field).or_default().push(message);
}

fn required_string(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&Value>,
    max_chars: usize,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            reject(errors, field, format!("{field} is required"));
            None
        }
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                reject(errors, field, format!("{field} is required"));
                return None;
            }
            let chars = text.chars().count();
            if chars > max_chars {
                reject(
                    errors,
                    field,
                    format!("{field} may not be greater than {max_chars} characters"),
                );
                return None;
            }
            Some(text.to_string())
        }
        Some(_) => {
            reject(errors, field, format!("{field} must be a string"));
            None
        }
    }
}

fn required_integer(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&Value>,
    max: u64,
) -> Option<u64> {
    let number = match value {
        None | Some(Value::Null) => {
            reject(errors, field, format!("{field} is required"));
            return None;
        }
        Some(Value::Number(number)) => number,
        Some(_) => {
            reject(errors, field, format!("{field} must be an integer"));
            return None;
        }
    };

    if let Some(unsigned) = number.as_u64() {
        if unsigned > max {
            reject(errors, field, format!("{field} may not be greater than {max}"));
            return None;
        }
        return Some(unsigned);
    }
    if number.as_i64().is_some() {
        reject(errors, field, format!("{field} must be at least 0"));
    } else {
        reject(errors, field, format!("{field} must be an integer"));
    }
    None
}

fn required_u32(errors: &mut FieldErrors, field: &'static str, value: Option<&Value>) -> Option<u32> {
    required_integer(errors, field, value, u64::from(u32::MAX)).map(|value| value as u32)
}

use crate::bots::{create_bot, AutopilotBot, RaceView};
use crate::util::seed_to_hex;
use anyhow::{anyhow, bail, Context, Result};
use racer_core::config::EngineConfig;
use racer_core::game::{Game, Screen};
use racer_core::input::Action;
use racer_core::result::{RaceResult, RecordingSink};
use racer_core::rng::SeededRng;
use serde::Serialize;

pub const BOT_PLAYER_NAME: &str = "Autopilot";
pub const BOT_HANDLE: &str = "@autopilot";

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub vehicle: String,
    pub driver: String,
    pub max_ticks: u32,
    pub tick_count: u32,
    pub final_score: u32,
    pub base_score: u32,
    pub distance: f64,
    pub race_time_ms: u64,
    pub lives_remaining: u32,
    pub hits: u32,
    pub finished: bool,
    pub completed: bool,
    pub throttle_ticks: u32,
    pub brake_ticks: u32,
    pub steer_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    /// The result the game handed to its sink; `None` when `max_ticks` ran
    /// out first.
    pub result: Option<RaceResult>,
}

/// Which roster entries a run drives. `None` keeps the menu default.
#[derive(Clone, Debug, Default)]
pub struct RunSetup {
    pub vehicle: Option<String>,
    pub driver: Option<String>,
}

pub fn run_bot(
    bot_id: &str,
    seed: u32,
    max_ticks: u32,
    config: &EngineConfig,
    setup: &RunSetup,
) -> Result<RunArtifact> {
    if max_ticks == 0 {
        return Err(anyhow!("max_ticks must be > 0"));
    }

    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, max_ticks, config, setup)
}

/// Plays one race through the real menu flow, feeding the bot one tick at a
/// time at the configured logic rate.
pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    seed: u32,
    max_ticks: u32,
    config: &EngineConfig,
    setup: &RunSetup,
) -> Result<RunArtifact> {
    if max_ticks == 0 {
        return Err(anyhow!("max_ticks must be > 0"));
    }

    bot.reset(seed);

    let mut game = Game::new(
        config.clone(),
        SeededRng::new(seed),
        RecordingSink::default(),
    )
    .context("engine config rejected")?;
    drive_to_start(&mut game, setup)?;

    let step = game.config().race.tick_period_ms() / 1000.0;
    let mut tick_count = 0u32;
    let mut throttle_ticks = 0u32;
    let mut brake_ticks = 0u32;
    let mut steer_ticks = 0u32;

    while game.screen() == Screen::Racing && tick_count < max_ticks {
        let controls = {
            let race = game
                .race()
                .ok_or_else(|| anyhow!("racing screen without a race"))?;
            bot.next_input(&RaceView::new(race, game.config()), step)
        };

        if controls.throttle {
            throttle_ticks += 1;
        }
        if controls.brake {
            brake_ticks += 1;
        }
        if controls.steer_left || controls.steer_right {
            steer_ticks += 1;
        }

        game.step(&controls, step);
        tick_count += 1;

        game.validate().map_err(|rule| {
            anyhow!("invariant failure at tick {tick_count} (seed={seed:#x}): {rule}")
        })?;
    }

    let race = game
        .race()
        .ok_or_else(|| anyhow!("race vanished before the run ended"))?;
    let breakdown = race.score_breakdown(game.config());
    let snapshot = race.snapshot(game.config());
    let outcome = race.outcome();
    let vehicle = race.vehicle().clone();
    let driver = race.driver().to_string();

    let result = game.sink().results.first().cloned();
    if game.sink().results.len() > 1 {
        bail!(
            "race submitted {} results (seed={seed:#x})",
            game.sink().results.len()
        );
    }

    tracing::debug!(
        bot = bot.id(),
        seed = %seed_to_hex(seed),
        ticks = tick_count,
        final_score = breakdown.final_score,
        ?outcome,
        "run finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            vehicle: vehicle.name,
            driver,
            max_ticks,
            tick_count,
            final_score: breakdown.final_score,
            base_score: breakdown.base_score,
            distance: snapshot.distance,
            race_time_ms: race.race_time_ms(),
            lives_remaining: snapshot.lives,
            hits: vehicle.lives.saturating_sub(snapshot.lives),
            finished: outcome.is_some(),
            completed: outcome.is_some_and(|outcome| outcome.completed()),
            throttle_ticks,
            brake_ticks,
            steer_ticks,
        },
        result,
    })
}

fn drive_to_start(game: &mut Game<RecordingSink>, setup: &RunSetup) -> Result<()> {
    game.enter_player(BOT_PLAYER_NAME, BOT_HANDLE);
    game.press(Action::Confirm);
    if let Some(err) = game.profile_error() {
        bail!("bot profile rejected: {err}");
    }

    if let Some(vehicle) = &setup.vehicle {
        game.select_vehicle(vehicle)?;
    }
    game.press(Action::Confirm);

    if let Some(driver) = &setup.driver {
        game.select_driver(driver)?;
    }
    game.press(Action::Confirm);

    if game.screen() != Screen::Racing {
        bail!("menu flow ended on {:?} instead of racing", game.screen());
    }
    Ok(())
}

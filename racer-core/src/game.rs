//! Screen flow and the fixed-rate logic loop.
//!
//! The host calls [`Game::update`] once per display refresh with its clock
//! and the live control snapshot. Menu actions are edge-triggered; the race
//! itself only advances when the [`FrameGate`] says a logic tick is due.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, VehicleSpec};
use crate::error::{ConfigError, ProfileError, RaceRule, SelectionError};
use crate::events::{GameEvent, SoundCue};
use crate::input::{Action, ControlState, EdgeDetector};
use crate::profile::PlayerProfile;
use crate::projection::Frame;
use crate::race::{HudSnapshot, RaceOutcome, RaceState};
use crate::result::{RaceResult, ResultSink, SubmissionStatus};
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Intro,
    VehicleSelect,
    DriverSelect,
    Racing,
    GameOver,
}

/// Rate limiter for the logic tick. Calls arriving before a full period has
/// elapsed are skipped, and the remainder past a whole period is dropped so
/// a stall never queues catch-up ticks.
#[derive(Clone, Copy, Debug)]
pub struct FrameGate {
    period_ms: f64,
    then_ms: Option<f64>,
}

impl FrameGate {
    pub fn new(tick_hz: f64) -> Self {
        Self {
            period_ms: 1000.0 / tick_hz,
            then_ms: None,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Forgets the reference time; the next poll only arms the gate.
    pub fn reset(&mut self) {
        self.then_ms = None;
    }

    /// Seconds of logic time to run, if a tick is due at `now_ms`.
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        let Some(then) = self.then_ms else {
            self.then_ms = Some(now_ms);
            return None;
        };
        let delta = now_ms - then;
        if delta > self.period_ms {
            self.then_ms = Some(now_ms - delta % self.period_ms);
            Some(delta / 1000.0)
        } else {
            None
        }
    }
}

/// Everything one call produced for the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Update {
    pub events: Vec<GameEvent>,
    pub cues: Vec<SoundCue>,
    pub frame: Option<Frame>,
    pub hud: Option<HudSnapshot>,
    pub ticked: bool,
}

impl Update {
    fn merge(&mut self, other: Update) {
        self.events.extend(other.events);
        self.cues.extend(other.cues);
        if other.frame.is_some() {
            self.frame = other.frame;
        }
        if other.hud.is_some() {
            self.hud = other.hud;
        }
        self.ticked |= other.ticked;
    }
}

pub struct Game<S: ResultSink> {
    config: EngineConfig,
    rng: SeededRng,
    sink: S,
    screen: Screen,
    vehicle_index: usize,
    driver_index: usize,
    name_input: String,
    handle_input: String,
    profile: Option<PlayerProfile>,
    profile_error: Option<ProfileError>,
    race: Option<RaceState>,
    muted: bool,
    submission: SubmissionStatus,
    last_result: Option<RaceResult>,
    edges: EdgeDetector,
    gate: FrameGate,
}

impl<S: ResultSink> Game<S> {
    pub fn new(config: EngineConfig, rng: SeededRng, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let gate = FrameGate::new(config.race.tick_hz);
        Ok(Self {
            config,
            rng,
            sink,
            screen: Screen::Intro,
            vehicle_index: 0,
            driver_index: 0,
            name_input: String::new(),
            handle_input: String::new(),
            profile: None,
            profile_error: None,
            race: None,
            muted: false,
            submission: SubmissionStatus::NotSubmitted,
            last_result: None,
            edges: EdgeDetector::new(),
            gate,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn race(&self) -> Option<&RaceState> {
        self.race.as_ref()
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    pub fn profile_error(&self) -> Option<ProfileError> {
        self.profile_error
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn submission(&self) -> SubmissionStatus {
        self.submission
    }

    pub fn last_result(&self) -> Option<&RaceResult> {
        self.last_result.as_ref()
    }

    pub fn vehicle_index(&self) -> usize {
        self.vehicle_index
    }

    pub fn driver_index(&self) -> usize {
        self.driver_index
    }

    pub fn selected_vehicle(&self) -> &VehicleSpec {
        &self.config.vehicles[self.vehicle_index]
    }

    pub fn selected_driver(&self) -> &str {
        &self.config.drivers[self.driver_index]
    }

    /// Moves the vehicle cursor to `name`, ignoring ASCII case.
    pub fn select_vehicle(&mut self, name: &str) -> Result<(), SelectionError> {
        self.vehicle_index = self
            .config
            .vehicles
            .iter()
            .position(|vehicle| vehicle.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SelectionError::UnknownVehicle(name.to_string()))?;
        Ok(())
    }

    pub fn select_driver(&mut self, name: &str) -> Result<(), SelectionError> {
        self.driver_index = self
            .config
            .drivers
            .iter()
            .position(|driver| driver.eq_ignore_ascii_case(name))
            .ok_or_else(|| SelectionError::UnknownDriver(name.to_string()))?;
        Ok(())
    }

    /// Stores the intro form fields. They are validated on confirm.
    pub fn enter_player(&mut self, name: &str, handle: &str) {
        self.name_input = name.to_string();
        self.handle_input = handle.to_string();
    }

    /// Host-loop entry point: edge-detects menu actions, then runs at most
    /// one logic tick if the gate allows it.
    pub fn update(&mut self, now_ms: f64, controls: &ControlState) -> Update {
        let mut update = Update::default();
        for action in self.edges.pressed(controls) {
            update.merge(self.press(action));
        }
        if self.screen == Screen::Racing {
            if let Some(step) = self.gate.poll(now_ms) {
                update.merge(self.step(controls, step));
            }
        }
        update
    }

    /// Applies one discrete action to the current screen.
    pub fn press(&mut self, action: Action) -> Update {
        let mut update = Update::default();

        if action == Action::ToggleMute {
            self.muted = !self.muted;
            tracing::debug!(muted = self.muted, "mute toggled");
            update.events.push(GameEvent::MuteToggled { muted: self.muted });
            return update;
        }

        match (self.screen, action) {
            (Screen::Intro, Action::Confirm) => {
                match PlayerProfile::new(&self.name_input, &self.handle_input) {
                    Ok(profile) => {
                        self.profile = Some(profile);
                        self.profile_error = None;
                        update.cues.push(SoundCue::MenuSelect);
                        self.go_to(Screen::VehicleSelect, &mut update);
                    }
                    Err(error) => {
                        tracing::debug!(%error, "player profile rejected");
                        self.profile_error = Some(error);
                    }
                }
            }
            (Screen::VehicleSelect, Action::Left | Action::Right) => {
                self.vehicle_index =
                    cycle(self.vehicle_index, self.config.vehicles.len(), action);
                update.cues.push(SoundCue::MenuNavigate);
                update.events.push(GameEvent::MenuMoved {
                    screen: self.screen,
                    index: self.vehicle_index,
                });
            }
            (Screen::VehicleSelect, Action::Confirm) => {
                update.cues.push(SoundCue::MenuSelect);
                self.go_to(Screen::DriverSelect, &mut update);
            }
            (Screen::VehicleSelect, Action::Back) => {
                update.cues.push(SoundCue::MenuSelect);
                self.go_to(Screen::Intro, &mut update);
            }
            (Screen::DriverSelect, Action::Left | Action::Right) => {
                self.driver_index = cycle(self.driver_index, self.config.drivers.len(), action);
                update.cues.push(SoundCue::MenuNavigate);
                update.events.push(GameEvent::MenuMoved {
                    screen: self.screen,
                    index: self.driver_index,
                });
            }
            (Screen::DriverSelect, Action::Confirm) => self.start_race(&mut update),
            (Screen::DriverSelect, Action::Back) => {
                update.cues.push(SoundCue::MenuSelect);
                self.go_to(Screen::VehicleSelect, &mut update);
            }
            (Screen::GameOver, Action::Confirm | Action::Back) => {
                update.cues.push(SoundCue::MenuSelect);
                self.reset(&mut update);
            }
            _ => {}
        }

        self.silence(&mut update);
        update
    }

    /// Runs exactly one logic tick of `step` seconds. Outside RACING this
    /// only reports the current state.
    pub fn step(&mut self, controls: &ControlState, step: f64) -> Update {
        let mut update = Update::default();
        if self.screen != Screen::Racing {
            return update;
        }
        let Some(race) = self.race.as_mut() else {
            return update;
        };

        race.tick(
            controls,
            step,
            &self.config,
            &mut self.rng,
            &mut update.events,
            &mut update.cues,
        );
        update.ticked = true;
        update.frame = Some(race.render(&self.config));
        update.hud = Some(race.hud());

        if race.is_finished() {
            self.conclude(&mut update);
        }
        self.silence(&mut update);
        update
    }

    /// Ends the current race from outside the tick. Safe to call repeatedly;
    /// only the first call while racing submits a result.
    pub fn finish_race(&mut self, outcome: RaceOutcome) -> Update {
        let mut update = Update::default();
        if self.screen != Screen::Racing {
            return update;
        }
        if let Some(race) = self.race.as_mut() {
            race.finish(outcome);
        }
        self.conclude(&mut update);
        self.silence(&mut update);
        update
    }

    /// Abandons whatever is running and returns to the intro without
    /// submitting anything.
    pub fn restart(&mut self) -> Update {
        let mut update = Update::default();
        self.reset(&mut update);
        update
    }

    pub fn validate(&self) -> Result<(), RaceRule> {
        match &self.race {
            Some(race) => race.validate(&self.config),
            None => Ok(()),
        }
    }

    fn start_race(&mut self, update: &mut Update) {
        let vehicle = self.selected_vehicle().clone();
        let driver = self.selected_driver().to_string();
        self.race = Some(RaceState::new(
            &self.config,
            vehicle,
            driver,
            &mut self.rng,
        ));
        self.submission = SubmissionStatus::NotSubmitted;
        self.last_result = None;
        self.gate.reset();
        self.go_to(Screen::Racing, update);

        if self.config.race.countdown_secs > 0 {
            update.cues.push(SoundCue::Countdown);
            update.events.push(GameEvent::CountdownTick {
                remaining: self.config.race.countdown_secs,
            });
        } else {
            update.events.push(GameEvent::RaceStarted);
        }
    }

    /// The single GAME_OVER transition. Builds the result from the frozen
    /// race and hands it to the sink once.
    fn conclude(&mut self, update: &mut Update) {
        if self.screen != Screen::Racing {
            return;
        }
        let Some(race) = self.race.as_ref() else {
            return;
        };
        let Some(outcome) = race.outcome() else {
            return;
        };

        let score = race.score_breakdown(&self.config);
        update.cues.push(if outcome.completed() {
            SoundCue::Win
        } else {
            SoundCue::GameOver
        });
        update.events.push(GameEvent::RaceFinished {
            completed: outcome.completed(),
            final_score: score.final_score,
        });

        match &self.profile {
            Some(profile) => {
                let result = RaceResult {
                    player_name: profile.name.clone(),
                    github_handle: profile.handle.clone(),
                    base_score: score.base_score,
                    time_penalty: score.time_penalty,
                    life_bonus: score.life_bonus,
                    completion_bonus: score.completion_bonus,
                    final_score: score.final_score,
                    race_time_ms: race.race_time_ms(),
                    vehicle_name: race.vehicle().name.clone(),
                    driver_name: race.driver().to_string(),
                    lives_remaining: race.lives(),
                };
                let accepted = self.sink.submit_race(&result);
                if accepted {
                    tracing::info!(final_score = result.final_score, "race result submitted");
                    self.submission = SubmissionStatus::Accepted;
                } else {
                    tracing::warn!(final_score = result.final_score, "race result not accepted");
                    self.submission = SubmissionStatus::Failed;
                }
                update.events.push(GameEvent::ResultSubmitted { accepted });
                self.last_result = Some(result);
            }
            None => tracing::warn!("race finished without a player profile; nothing submitted"),
        }

        self.go_to(Screen::GameOver, update);
    }

    fn reset(&mut self, update: &mut Update) {
        self.race = None;
        self.gate.reset();
        self.vehicle_index = 0;
        self.driver_index = 0;
        self.go_to(Screen::Intro, update);
    }

    fn go_to(&mut self, to: Screen, update: &mut Update) {
        if self.screen == to {
            return;
        }
        let from = self.screen;
        self.screen = to;
        tracing::debug!(?from, ?to, "screen changed");
        update.events.push(GameEvent::ScreenChanged { from, to });
    }

    fn silence(&self, update: &mut Update) {
        if self.muted {
            update.cues.clear();
        }
    }
}

fn cycle(index: usize, len: usize, action: Action) -> usize {
    if len == 0 {
        return 0;
    }
    match action {
        Action::Left => (index + len - 1) % len,
        Action::Right => (index + 1) % len,
        _ => index,
    }
}

#[cfg(test)]
mod tests;

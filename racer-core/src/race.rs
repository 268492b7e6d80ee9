use serde::Serialize;

use crate::config::{EngineConfig, VehicleSpec};
use crate::constants::ENGINE_PITCH_SCALE;
use crate::error::RaceRule;
use crate::events::{GameEvent, SoundCue};
use crate::input::ControlState;
use crate::physics::{self, PlayerState};
use crate::projection::{self, Frame, Scene};
use crate::result::{compute_score, ScoreBreakdown};
use crate::rng::SeededRng;
use crate::road::SegmentRing;
use crate::track::{SpecialMarker, Track};
use crate::traffic::{Traffic, TrafficEvent, TrafficFrame};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceOutcome {
    /// Reached the finish marker or ran out the time budget.
    Completed,
    /// Lost the last life.
    Wrecked,
}

impl RaceOutcome {
    pub fn completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// What the HUD shows, pre-formatted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: String,
    pub speed: String,
    pub distance: String,
    pub lives: u32,
    pub lap: String,
    pub countdown: Option<u32>,
    pub invincible: bool,
    pub time_remaining_secs: f64,
}

/// Plain-number view of a race for bots and tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RaceSnapshot {
    pub speed: f64,
    pub top_speed: f64,
    pub lateral: f64,
    pub distance: f64,
    pub lives: u32,
    pub elapsed_ms: f64,
    pub time_remaining_secs: f64,
    pub active: bool,
    pub invincible: bool,
    pub camera_segment: usize,
    pub camera_travel: f64,
    pub section_index: usize,
    pub outcome: Option<RaceOutcome>,
}

/// Mutable state of the race in progress. The state machine owns exactly one
/// of these while racing and hands it to each subsystem per tick.
#[derive(Clone, Debug)]
pub struct RaceState {
    vehicle: VehicleSpec,
    driver: String,
    road: SegmentRing,
    track: Track,
    section_index: usize,
    section_progress: f64,
    position: f64,
    travelled: f64,
    player: PlayerState,
    /// Odometer. Pickup points land here too, so it is also the score.
    distance: f64,
    lives: u32,
    elapsed_ms: f64,
    countdown_secs: f64,
    time_remaining_secs: f64,
    active: bool,
    outcome: Option<RaceOutcome>,
    cloud_offset: f64,
    traffic: Traffic,
    last_written_segment: Option<usize>,
}

impl RaceState {
    pub fn new(
        config: &EngineConfig,
        vehicle: VehicleSpec,
        driver: String,
        rng: &mut SeededRng,
    ) -> Self {
        let track = Track::generate(&config.track, config.road.segment_count, rng);
        Self::with_track(config, vehicle, driver, track, rng)
    }

    pub fn with_track(
        config: &EngineConfig,
        vehicle: VehicleSpec,
        driver: String,
        track: Track,
        rng: &mut SeededRng,
    ) -> Self {
        let time_budget = track.finish_distance() / config.race.time_budget_divisor
            + config.race.time_budget_padding_secs;
        let traffic = Traffic::new(config, rng);
        tracing::info!(
            vehicle = %vehicle.name,
            driver = %driver,
            sections = track.len(),
            time_budget,
            "race prepared"
        );

        Self {
            lives: vehicle.lives,
            vehicle,
            driver,
            road: SegmentRing::new(&config.road),
            track,
            section_index: 0,
            section_progress: 0.0,
            position: 0.0,
            travelled: 0.0,
            player: PlayerState::default(),
            distance: 0.0,
            elapsed_ms: 0.0,
            countdown_secs: f64::from(config.race.countdown_secs),
            time_remaining_secs: time_budget,
            active: config.race.countdown_secs == 0,
            outcome: None,
            cloud_offset: 0.0,
            traffic,
            last_written_segment: None,
        }
    }

    pub fn vehicle(&self) -> &VehicleSpec {
        &self.vehicle
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn road(&self) -> &SegmentRing {
        &self.road
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outcome(&self) -> Option<RaceOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn score(&self) -> f64 {
        self.distance
    }

    pub fn race_time_ms(&self) -> u64 {
        self.elapsed_ms.max(0.0).floor() as u64
    }

    pub fn camera_segment(&self) -> usize {
        self.road.segment_at(self.position)
    }

    fn camera_travel(&self, config: &EngineConfig) -> f64 {
        self.travelled / config.road.segment_length
    }

    /// Ends the race once. Later calls are ignored and return `false`.
    pub fn finish(&mut self, outcome: RaceOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        self.active = false;
        tracing::info!(
            ?outcome,
            score = self.score().floor(),
            lives = self.lives,
            elapsed_ms = self.race_time_ms(),
            "race finished"
        );
        true
    }

    pub fn score_breakdown(&self, config: &EngineConfig) -> ScoreBreakdown {
        compute_score(
            self.score(),
            self.race_time_ms(),
            self.lives,
            self.outcome.is_some_and(RaceOutcome::completed),
            &config.race,
        )
    }

    /// Advances the race by `step` seconds. Does nothing once finished.
    pub fn tick(
        &mut self,
        controls: &ControlState,
        step: f64,
        config: &EngineConfig,
        rng: &mut SeededRng,
        events: &mut Vec<GameEvent>,
        cues: &mut Vec<SoundCue>,
    ) {
        if self.outcome.is_some() {
            return;
        }

        self.elapsed_ms += step * 1000.0;
        if !self.active {
            self.advance_countdown(step, events);
        }

        let loop_length = config.road.loop_length();
        self.position = (self.position + self.player.speed).rem_euclid(loop_length);
        self.travelled += self.player.speed;
        let camera = self.road.segment_at(self.position);
        let trailing = self.road.trailing(camera);

        self.distance += self.player.speed * step;
        self.time_remaining_secs -= step;

        let curvature = self.road.get(camera as isize).curvature;
        physics::integrate(
            &mut self.player,
            controls,
            curvature,
            self.active,
            step,
            &config.physics,
            &self.vehicle,
        );

        self.feed_track(trailing, step);

        if !self.active {
            physics::settle_inactive(&mut self.player, step, &config.physics);
        } else if self.time_remaining_secs <= 0.0
            || self.road.get(camera as isize).special == Some(SpecialMarker::Finish)
        {
            self.finish(RaceOutcome::Completed);
            return;
        }

        if self.active && self.player.speed > 0.0 {
            cues.push(SoundCue::Engine {
                pitch: self.player.speed * ENGINE_PITCH_SCALE,
            });
        }

        let curvature = self.road.get(camera as isize).curvature;
        self.cloud_offset -= curvature * step * self.player.speed * config.scenery.cloud_parallax;

        let frame = TrafficFrame {
            camera_segment: camera,
            trailing_segment: trailing,
            camera_travel: self.camera_travel(config),
            segment_count: self.road.len(),
            now_ms: self.elapsed_ms,
            step,
            active: self.active,
            vehicle: &self.vehicle,
            driver: &self.driver,
        };
        let mut traffic_events = Vec::new();
        self.traffic.advance_cars(
            &frame,
            &mut self.player,
            &mut self.lives,
            &config.traffic,
            config.obstacles.len(),
            rng,
            &mut traffic_events,
        );
        let earned = self.traffic.advance_powerups(
            &frame,
            &self.player,
            config,
            rng,
            &mut traffic_events,
        );
        self.distance += f64::from(earned);

        for event in traffic_events {
            match event {
                TrafficEvent::Hit {
                    lives_remaining,
                    alt_honk,
                } => {
                    cues.push(if alt_honk {
                        SoundCue::HonkAlt
                    } else {
                        SoundCue::Honk
                    });
                    events.push(GameEvent::Collision { lives_remaining });
                }
                TrafficEvent::Collected {
                    kind,
                    points,
                    invincible,
                } => {
                    cues.push(if invincible {
                        SoundCue::Invincible
                    } else {
                        SoundCue::Powerup
                    });
                    let kind = config
                        .powerups
                        .get(kind)
                        .map(|spec| spec.kind.clone())
                        .unwrap_or_default();
                    events.push(GameEvent::PowerupCollected {
                        kind,
                        points,
                        invincible,
                    });
                }
                TrafficEvent::InvincibilityEnded => events.push(GameEvent::InvincibilityEnded),
            }
        }

        if self.lives == 0 {
            self.finish(RaceOutcome::Wrecked);
        }
    }

    fn advance_countdown(&mut self, step: f64, events: &mut Vec<GameEvent>) {
        let before = self.countdown_secs.ceil();
        self.countdown_secs -= step;
        if self.countdown_secs <= 0.0 {
            self.countdown_secs = 0.0;
            self.active = true;
            tracing::info!(vehicle = %self.vehicle.name, "race started");
            events.push(GameEvent::RaceStarted);
            return;
        }
        let now = self.countdown_secs.ceil();
        if now < before {
            events.push(GameEvent::CountdownTick {
                remaining: now as u32,
            });
        }
    }

    /// Writes the active section's shape into the segment entering the far
    /// end of the ring. A marker stays on its segment until that slot is
    /// recycled.
    fn feed_track(&mut self, trailing: usize, step: f64) {
        let recycled = self.last_written_segment != Some(trailing);
        self.last_written_segment = Some(trailing);

        let Some(current) = self.track.section(self.section_index).copied() else {
            return;
        };
        let inside = current.contains(self.distance);
        if inside {
            self.section_progress += self.player.speed * step;
        }

        let segment = self.road.get_mut(trailing as isize);
        segment.curvature = if inside {
            current.shape.curvature(self.section_progress)
        } else {
            0.0
        };
        segment.world_y = if inside {
            current.shape.elevation(self.section_progress)
        } else {
            0.0
        };
        if recycled {
            segment.special = None;
        }

        if current.is_passed(self.distance) {
            self.section_index += 1;
            self.section_progress = 0.0;
            if let Some(next) = self.track.section(self.section_index) {
                if next.special.is_some() {
                    segment.special = next.special;
                }
            }
            tracing::debug!(
                section = self.section_index,
                distance = self.distance,
                "entered next section"
            );
        }
    }

    pub fn render(&self, config: &EngineConfig) -> Frame {
        let scene = Scene {
            camera_segment: self.road.segment_at(self.position),
            camera_travel: self.travelled / config.road.segment_length,
            lateral: self.player.lateral,
            cloud_offset: self.cloud_offset,
            cars: self.traffic.cars(),
            powerups: self.traffic.powerups(),
            hero: Some((&self.vehicle, self.player.steer)),
        };
        projection::render(&self.road, &scene, config)
    }

    pub fn snapshot(&self, config: &EngineConfig) -> RaceSnapshot {
        RaceSnapshot {
            speed: self.player.speed,
            top_speed: self.vehicle.top_speed,
            lateral: self.player.lateral,
            distance: self.distance,
            lives: self.lives,
            elapsed_ms: self.elapsed_ms,
            time_remaining_secs: self.time_remaining_secs,
            active: self.active,
            invincible: self.traffic.is_invincible(),
            camera_segment: self.camera_segment(),
            camera_travel: self.camera_travel(config),
            section_index: self.section_index,
            outcome: self.outcome,
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        let score = self.score().max(0.0).floor() as u64;
        HudSnapshot {
            score: format!("{score:08}"),
            speed: format!("{} MPH", self.player.speed.floor() as u64),
            distance: format!("{}m", self.distance.floor() as u64),
            lives: self.lives,
            lap: format_lap(self.race_time_ms()),
            countdown: (!self.active && self.outcome.is_none())
                .then(|| self.countdown_secs.ceil().max(1.0) as u32),
            invincible: self.traffic.is_invincible(),
            time_remaining_secs: self.time_remaining_secs.max(0.0),
        }
    }

    /// Checks the invariants every tick must preserve.
    pub fn validate(&self, config: &EngineConfig) -> Result<(), RaceRule> {
        let speed_cap = self.vehicle.top_speed.max(config.physics.max_speed);
        if !(0.0..=speed_cap).contains(&self.player.speed) {
            return Err(RaceRule::SpeedRange);
        }
        let limit = config.physics.lateral_limit;
        if !(-limit..=limit).contains(&self.player.lateral) {
            return Err(RaceRule::LateralRange);
        }
        if self.lives > self.vehicle.lives {
            return Err(RaceRule::LivesRange);
        }
        if !(0.0..config.road.loop_length()).contains(&self.position) {
            return Err(RaceRule::CameraPosition);
        }
        if self.section_index >= self.track.len() {
            return Err(RaceRule::SectionCursor);
        }
        let ring = self.road.len() as f64;
        if self
            .traffic
            .cars()
            .iter()
            .any(|car| !(0.0..=ring).contains(&car.position))
        {
            return Err(RaceRule::TrafficPosition);
        }
        if self.traffic.powerups().iter().any(|powerup| powerup.collected) {
            return Err(RaceRule::PowerupPosition);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn traffic_mut(&mut self) -> &mut Traffic {
        &mut self.traffic
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, speed: f64, lateral: f64, lives: u32) {
        self.player.speed = speed;
        self.player.lateral = lateral;
        self.lives = lives;
    }

    #[cfg(test)]
    pub(crate) fn road_mut(&mut self) -> &mut SegmentRing {
        &mut self.road
    }
}

/// `m'ss"mmm`, with minutes wrapping at the hour.
pub fn format_lap(elapsed_ms: u64) -> String {
    let minutes = (elapsed_ms / 60_000) % 60;
    let seconds = (elapsed_ms / 1000) % 60;
    let millis = elapsed_ms % 1000;
    format!("{minutes}'{seconds:02}\"{millis:03}")
}

#[cfg(test)]
mod tests;

use racer_core::config::EngineConfig;
use racer_core::input::ControlState;
use racer_core::race::{RaceSnapshot, RaceState};
use racer_core::rng::SeededRng;
use racer_core::traffic::Lane;

/// What a bot may look at before choosing its controls for the next tick.
#[derive(Clone, Copy)]
pub struct RaceView<'a> {
    pub snapshot: RaceSnapshot,
    pub race: &'a RaceState,
    pub config: &'a EngineConfig,
}

impl<'a> RaceView<'a> {
    pub fn new(race: &'a RaceState, config: &'a EngineConfig) -> Self {
        Self {
            snapshot: race.snapshot(config),
            race,
            config,
        }
    }

    /// Lateral offset that puts the player's collision box on `lane`.
    pub fn lane_lateral(&self, lane: Lane) -> f64 {
        let traffic = &self.config.traffic;
        (lane.offset(traffic) - traffic.center_lane()) / traffic.collision_offset_ratio
    }

    /// Segments from the camera to the nearest car in `lane`, looking at most
    /// `lookahead` segments ahead.
    pub fn gap_in_lane(&self, lane: Lane, lookahead: f64) -> Option<f64> {
        let ring = self.race.road().len() as f64;
        let camera = self.snapshot.camera_segment as f64;
        self.race
            .traffic()
            .cars()
            .iter()
            .filter(|car| car.lane == lane)
            .map(|car| (car.position.floor() - camera).rem_euclid(ring))
            .filter(|gap| *gap <= lookahead)
            .min_by(f64::total_cmp)
    }

    /// Lane whose center is closest to the player.
    pub fn current_lane(&self) -> Lane {
        let lateral = self.snapshot.lateral;
        let mut best = Lane::Center;
        let mut best_dist = f64::INFINITY;
        for lane in Lane::ALL {
            let dist = (self.lane_lateral(lane) - lateral).abs();
            if dist < best_dist {
                best = lane;
                best_dist = dist;
            }
        }
        best
    }

    /// Steering input that moves the player toward `target` without
    /// overshooting by more than half a tick of steering.
    pub fn steer_toward(&self, target: f64, step: f64) -> (bool, bool) {
        let per_tick = self.config.physics.steer_rate * step * self.snapshot.speed;
        let deadband = (per_tick * 0.5).max(0.02);
        let delta = target - self.snapshot.lateral;
        if delta > deadband {
            (false, true)
        } else if delta < -deadband {
            (true, false)
        } else {
            (false, false)
        }
    }
}

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, view: &RaceView<'_>, step: f64) -> ControlState;
}

/// Full throttle, holds the center of the road, ignores traffic.
#[derive(Clone, Debug, Default)]
pub struct Cruiser;

impl AutopilotBot for Cruiser {
    fn id(&self) -> &'static str {
        "cruiser"
    }

    fn description(&self) -> &'static str {
        "flat out down the middle, never looks at traffic"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, view: &RaceView<'_>, step: f64) -> ControlState {
        let (steer_left, steer_right) = view.steer_toward(0.0, step);
        ControlState {
            throttle: true,
            steer_left,
            steer_right,
            ..Default::default()
        }
    }
}

/// Picks the lane with the most open road ahead and brakes when boxed in.
#[derive(Clone, Debug)]
pub struct Dodger {
    lookahead: f64,
    brake_gap: f64,
}

impl Default for Dodger {
    fn default() -> Self {
        Self {
            lookahead: 12.0,
            brake_gap: 2.0,
        }
    }
}

impl AutopilotBot for Dodger {
    fn id(&self) -> &'static str {
        "dodger"
    }

    fn description(&self) -> &'static str {
        "changes to the clearest lane and brakes when every lane is blocked"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, view: &RaceView<'_>, step: f64) -> ControlState {
        let current = view.current_lane();
        let clearance = |lane: Lane| {
            view.gap_in_lane(lane, self.lookahead)
                .unwrap_or(f64::INFINITY)
        };

        let mut target = current;
        for lane in Lane::ALL {
            if clearance(lane) > clearance(target) {
                target = lane;
            }
        }

        let boxed_in = clearance(target) <= self.brake_gap && !view.snapshot.invincible;
        let (steer_left, steer_right) = view.steer_toward(view.lane_lateral(target), step);
        ControlState {
            throttle: !boxed_in,
            brake: boxed_in,
            steer_left,
            steer_right,
            ..Default::default()
        }
    }
}

/// Stays in its lane, lifts off when a car is close ahead and brakes back
/// onto the tarmac when it drifts off-road.
#[derive(Clone, Debug)]
pub struct Cautious {
    lookahead: f64,
}

impl Default for Cautious {
    fn default() -> Self {
        Self { lookahead: 6.0 }
    }
}

impl AutopilotBot for Cautious {
    fn id(&self) -> &'static str {
        "cautious"
    }

    fn description(&self) -> &'static str {
        "keeps its lane, brakes for traffic ahead and for the verge"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, view: &RaceView<'_>, step: f64) -> ControlState {
        let lane = view.current_lane();
        let off_road = view.race.player().is_off_road(&view.config.physics);
        let blocked = !view.snapshot.invincible
            && view.gap_in_lane(lane, self.lookahead).is_some();

        let (steer_left, steer_right) = view.steer_toward(view.lane_lateral(lane), step);
        ControlState {
            throttle: !blocked && !off_road,
            brake: blocked || off_road,
            steer_left,
            steer_right,
            ..Default::default()
        }
    }
}

/// Seeded random steering with mostly-held throttle.
#[derive(Clone, Debug)]
pub struct Wanderer {
    rng: SeededRng,
    hold_ticks: u32,
    steer: (bool, bool),
}

impl Default for Wanderer {
    fn default() -> Self {
        Self {
            rng: SeededRng::new(1),
            hold_ticks: 0,
            steer: (false, false),
        }
    }
}

impl AutopilotBot for Wanderer {
    fn id(&self) -> &'static str {
        "wanderer"
    }

    fn description(&self) -> &'static str {
        "random lane drift from its own seed, throttle held most of the time"
    }

    fn reset(&mut self, seed: u32) {
        self.rng = SeededRng::new(seed ^ 0x5EED_CAFE);
        self.hold_ticks = 0;
        self.steer = (false, false);
    }

    fn next_input(&mut self, view: &RaceView<'_>, step: f64) -> ControlState {
        if self.hold_ticks == 0 {
            let target = view.lane_lateral(Lane::ALL[self.rng.pick_index(Lane::ALL.len())]);
            self.steer = view.steer_toward(target, step);
            self.hold_ticks = 5 + self.rng.next_int(20);
        }
        self.hold_ticks -= 1;

        ControlState {
            throttle: !self.rng.chance(0.1),
            steer_left: self.steer.0,
            steer_right: self.steer.1,
            ..Default::default()
        }
    }
}

/// Never touches the controls. Baseline for the time budget path.
#[derive(Clone, Debug, Default)]
pub struct Idle;

impl AutopilotBot for Idle {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        "no input at all; the race ends when the clock runs out"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _view: &RaceView<'_>, _step: f64) -> ControlState {
        ControlState::default()
    }
}

pub fn bot_ids() -> &'static [&'static str] {
    &["cruiser", "dodger", "cautious", "wanderer", "idle"]
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot + Send>> {
    match id {
        "cruiser" => Some(Box::new(Cruiser)),
        "dodger" => Some(Box::new(Dodger::default())),
        "cautious" => Some(Box::new(Cautious::default())),
        "wanderer" => Some(Box::new(Wanderer::default())),
        "idle" => Some(Box::new(Idle)),
        _ => None,
    }
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    bot_ids()
        .iter()
        .filter_map(|id| create_bot(id))
        .map(|bot| (bot.id(), bot.description()))
        .collect()
}

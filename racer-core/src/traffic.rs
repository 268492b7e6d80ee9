//! Opponent cars and powerups.
//!
//! Cars live on the segment ring and circulate forever. Powerups sit at an
//! absolute segment count so that a spawn further ahead than one ring length
//! cannot alias onto a nearer slot.

use serde::Serialize;

use crate::config::{EngineConfig, PickupConfig, TrafficConfig, VehicleSpec};
use crate::physics::PlayerState;
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(2)]
    }

    pub fn offset(self, traffic: &TrafficConfig) -> f64 {
        match self {
            Self::Left => traffic.lanes[0],
            Self::Center => traffic.lanes[1],
            Self::Right => traffic.lanes[2],
        }
    }

    fn random(rng: &mut SeededRng) -> Self {
        Self::ALL[rng.pick_index(Self::ALL.len())]
    }
}

/// Two spans overlap when their centers are within the summed half-widths.
#[inline]
pub fn is_collide(x1: f64, w1: f64, x2: f64, w2: f64) -> bool {
    (x1 - x2).powi(2) <= (w2 + w1).powi(2)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrafficCar {
    /// Ring position in segments, `[0, N)`.
    pub position: f64,
    pub lane: Lane,
    /// Index into the obstacle sprite roster.
    pub sprite: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Powerup {
    /// Absolute segment count from the start of the race.
    pub position: f64,
    pub lane: Lane,
    /// Index into the powerup roster.
    pub kind: usize,
    pub collected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TrafficEvent {
    Hit { lives_remaining: u32, alt_honk: bool },
    Collected { kind: usize, points: u32, invincible: bool },
    InvincibilityEnded,
}

/// Per-tick view of the camera the simulator needs.
#[derive(Clone, Copy, Debug)]
pub struct TrafficFrame<'a> {
    pub camera_segment: usize,
    pub trailing_segment: usize,
    /// Camera distance in segments without ring wrapping.
    pub camera_travel: f64,
    pub segment_count: usize,
    pub now_ms: f64,
    pub step: f64,
    pub active: bool,
    pub vehicle: &'a VehicleSpec,
    pub driver: &'a str,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Traffic {
    cars: Vec<TrafficCar>,
    powerups: Vec<Powerup>,
    last_hit_ms: Option<f64>,
    invincible_until_ms: Option<f64>,
    last_spawn_ms: Option<f64>,
}

impl Traffic {
    pub fn new(config: &EngineConfig, rng: &mut SeededRng) -> Self {
        let cars = config
            .traffic
            .initial_slots
            .iter()
            .map(|&(position, lane)| TrafficCar {
                position,
                lane: Lane::from_index(lane),
                sprite: rng.pick_index(config.obstacles.len().max(1)),
            })
            .collect();
        Self {
            cars,
            ..Self::default()
        }
    }

    pub fn cars(&self) -> &[TrafficCar] {
        &self.cars
    }

    pub fn powerups(&self) -> &[Powerup] {
        &self.powerups
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_until_ms.is_some()
    }

    /// Moves cars, recycles the ones that reach the far end, and applies hits.
    /// Hits stop registering once `lives` reaches zero.
    pub fn advance_cars(
        &mut self,
        frame: &TrafficFrame<'_>,
        player: &mut PlayerState,
        lives: &mut u32,
        config: &TrafficConfig,
        obstacle_count: usize,
        rng: &mut SeededRng,
        events: &mut Vec<TrafficEvent>,
    ) {
        let ring = frame.segment_count as f64;
        let player_x = player.lateral * config.collision_offset_ratio + config.center_lane();

        for car in &mut self.cars {
            car.position = (car.position + config.car_speed * frame.step).rem_euclid(ring);

            if car.position.floor() as usize == frame.trailing_segment {
                car.position = if player.speed < config.slow_respawn_speed {
                    frame.camera_segment as f64
                } else {
                    (frame.trailing_segment as isize - config.respawn_trailing_gap as isize)
                        .rem_euclid(frame.segment_count as isize) as f64
                };
                car.lane = Lane::random(rng);
                car.sprite = rng.pick_index(obstacle_count.max(1));
            }

            if !frame.active || *lives == 0 {
                continue;
            }
            if car.position.floor() as usize != frame.camera_segment
                || !is_collide(
                    player_x,
                    config.collision_half_width,
                    car.lane.offset(config),
                    config.collision_half_width,
                )
            {
                continue;
            }

            let cooled = self
                .last_hit_ms
                .map_or(true, |last| frame.now_ms - last > config.collision_cooldown_ms);
            if self.invincible_until_ms.is_some() || !cooled {
                continue;
            }

            player.speed = player.speed.min(config.hit_speed);
            *lives -= 1;
            self.last_hit_ms = Some(frame.now_ms);
            let alt_honk = rng.chance(0.5);
            tracing::debug!(lives = *lives, segment = frame.camera_segment, "car collision");
            events.push(TrafficEvent::Hit {
                lives_remaining: *lives,
                alt_honk,
            });
        }
    }

    /// Spawns, expires and collects powerups. Returns the points earned.
    pub fn advance_powerups(
        &mut self,
        frame: &TrafficFrame<'_>,
        player: &PlayerState,
        config: &EngineConfig,
        rng: &mut SeededRng,
        events: &mut Vec<TrafficEvent>,
    ) -> u32 {
        let pickups = &config.pickups;
        if !frame.active || !pickups.enabled || config.powerups.is_empty() {
            return 0;
        }

        let spawn_ready = self
            .last_spawn_ms
            .map_or(true, |last| frame.now_ms - last > pickups.spawn_cooldown_ms);
        if spawn_ready && rng.chance(pickups.spawn_chance) {
            self.spawn_powerup(frame, pickups, config.powerups.len(), rng);
        }

        if let Some(until) = self.invincible_until_ms {
            if frame.now_ms > until {
                self.invincible_until_ms = None;
                events.push(TrafficEvent::InvincibilityEnded);
            }
        }

        let traffic = &config.traffic;
        let player_x = player.lateral * traffic.collision_offset_ratio + traffic.center_lane();
        let camera_slot = frame.camera_travel.floor();
        let mut earned = 0;

        let mut index = self.powerups.len();
        while index > 0 {
            index -= 1;
            let powerup = self.powerups[index];

            if powerup.position < frame.camera_travel - pickups.expiry_margin {
                self.powerups.remove(index);
                continue;
            }

            if powerup.position.floor() == camera_slot
                && !powerup.collected
                && is_collide(
                    player_x,
                    traffic.collision_half_width,
                    powerup.lane.offset(traffic),
                    traffic.collision_half_width,
                )
            {
                let spec = &config.powerups[powerup.kind];
                let vehicle_match = spec.vehicle_affinity == frame.vehicle.name;
                let driver_match = spec.driver_affinity == frame.driver;

                let mut points = pickups.base_points;
                if vehicle_match {
                    points += pickups.vehicle_bonus;
                }
                if driver_match {
                    points += pickups.driver_bonus;
                }
                let invincible = vehicle_match && driver_match;
                if invincible {
                    self.invincible_until_ms = Some(frame.now_ms + pickups.invincibility_ms);
                }

                tracing::debug!(kind = %spec.kind, points, invincible, "powerup collected");
                earned += points;
                events.push(TrafficEvent::Collected {
                    kind: powerup.kind,
                    points,
                    invincible,
                });
                self.powerups.remove(index);
            }
        }

        earned
    }

    fn spawn_powerup(
        &mut self,
        frame: &TrafficFrame<'_>,
        pickups: &PickupConfig,
        kinds: usize,
        rng: &mut SeededRng,
    ) {
        let kind = rng.pick_index(kinds);
        let lane = Lane::random(rng);
        let ahead = pickups.spawn_ahead_min + rng.next_f64() * pickups.spawn_ahead_span;
        self.powerups.push(Powerup {
            position: frame.camera_travel.floor() + ahead,
            lane,
            kind,
            collected: false,
        });
        self.last_spawn_ms = Some(frame.now_ms);
    }

    #[cfg(test)]
    pub(crate) fn set_cars(&mut self, cars: Vec<TrafficCar>) {
        self.cars = cars;
    }

    #[cfg(test)]
    pub(crate) fn push_powerup(&mut self, powerup: Powerup) {
        self.powerups.push(powerup);
    }
}

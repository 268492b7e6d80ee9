use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSize {
    pub width: f64,
    pub height: f64,
}

impl SpriteSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    pub top_speed: f64,
    pub acceleration: f64,
    pub lives: u32,
    pub sprite: SpriteSize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerupSpec {
    pub kind: String,
    pub vehicle_affinity: String,
    pub driver_affinity: String,
    pub sprite: SpriteSize,
}

/// How projected screen Y is snapped to whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    #[default]
    HalfUp,
    Ceil,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            // Ties go toward +inf, not away from zero.
            Self::HalfUp => (value + 0.5).floor(),
            Self::Ceil => value.ceil(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
    pub rounding: Rounding,
}

impl ScreenConfig {
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,
            rounding: Rounding::HalfUp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub road_width: f64,
    pub segment_length: f64,
    pub segment_count: usize,
    pub first_segment_z: f64,
    pub camera_depth: f64,
    pub camera_height: f64,
}

impl RoadConfig {
    /// Length of one trip around the segment ring.
    pub fn loop_length(&self) -> f64 {
        self.segment_count as f64 * self.segment_length
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            segment_length: SEGMENT_LENGTH,
            segment_count: SEGMENT_COUNT,
            first_segment_z: FIRST_SEGMENT_Z,
            camera_depth: CAMERA_DEPTH,
            camera_height: CAMERA_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub max_speed: f64,
    pub braking: f64,
    pub deceleration: f64,
    pub max_off_road_speed: f64,
    pub off_road_deceleration: f64,
    pub off_road_threshold: f64,
    pub lateral_limit: f64,
    pub steer_rate: f64,
    pub curve_drift_divisor: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            braking: BRAKING,
            deceleration: DECEL,
            max_off_road_speed: MAX_OFF_SPEED,
            off_road_deceleration: OFF_DECEL,
            off_road_threshold: OFF_ROAD_THRESHOLD,
            lateral_limit: LATERAL_LIMIT,
            steer_rate: STEER_RATE,
            curve_drift_divisor: CURVE_DRIFT_DIVISOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Left, center and right lane offsets in collision space.
    pub lanes: [f64; 3],
    /// Initial `(segment, lane index)` per car; also fixes the pool size.
    pub initial_slots: Vec<(f64, usize)>,
    pub car_speed: f64,
    pub hit_speed: f64,
    pub collision_cooldown_ms: f64,
    pub collision_offset_ratio: f64,
    pub collision_half_width: f64,
    pub slow_respawn_speed: f64,
    pub respawn_trailing_gap: usize,
}

impl TrafficConfig {
    pub fn center_lane(&self) -> f64 {
        self.lanes[1]
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            lanes: [LANE_LEFT, LANE_CENTER, LANE_RIGHT],
            initial_slots: INITIAL_CAR_SLOTS.to_vec(),
            car_speed: ENEMY_SPEED,
            hit_speed: HIT_SPEED,
            collision_cooldown_ms: COLLISION_COOLDOWN_MS,
            collision_offset_ratio: COLLISION_OFFSET_RATIO,
            collision_half_width: COLLISION_HALF_WIDTH,
            slow_respawn_speed: SLOW_RESPAWN_SPEED,
            respawn_trailing_gap: RESPAWN_TRAILING_GAP,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub enabled: bool,
    pub spawn_cooldown_ms: f64,
    pub spawn_chance: f64,
    pub spawn_ahead_min: f64,
    pub spawn_ahead_span: f64,
    pub expiry_margin: f64,
    pub base_points: u32,
    pub vehicle_bonus: u32,
    pub driver_bonus: u32,
    pub invincibility_ms: f64,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_cooldown_ms: POWERUP_SPAWN_COOLDOWN_MS,
            spawn_chance: POWERUP_SPAWN_CHANCE,
            spawn_ahead_min: POWERUP_SPAWN_AHEAD_MIN,
            spawn_ahead_span: POWERUP_SPAWN_AHEAD_SPAN,
            expiry_margin: POWERUP_EXPIRY_MARGIN,
            base_points: POWERUP_BASE_POINTS,
            vehicle_bonus: POWERUP_VEHICLE_BONUS,
            driver_bonus: POWERUP_DRIVER_BONUS,
            invincibility_ms: INVINCIBILITY_MS,
        }
    }
}

/// Half-open integer ranges drawn per section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub length: i32,
    pub gap: (i32, i32),
    pub section_length: (i32, i32),
    pub height: (i32, i32),
    pub curve: (i32, i32),
    pub interval: (i32, i32),
    pub sine_amplitude: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            length: TRACK_LENGTH,
            gap: SECTION_GAP,
            section_length: SECTION_LENGTH,
            height: SECTION_HEIGHT,
            curve: SECTION_CURVE,
            interval: SECTION_INTERVAL,
            sine_amplitude: SINE_AMPLITUDE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub tick_hz: f64,
    pub countdown_secs: u32,
    pub time_budget_divisor: f64,
    pub time_budget_padding_secs: f64,
    pub life_bonus: u32,
    pub completion_bonus: u32,
}

impl RaceConfig {
    pub fn tick_period_ms(&self) -> f64 {
        1000.0 / self.tick_hz
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_hz: TICK_HZ,
            countdown_secs: COUNTDOWN_SECS,
            time_budget_divisor: TIME_BUDGET_DIVISOR,
            time_budget_padding_secs: TIME_BUDGET_PADDING_SECS,
            life_bonus: LIFE_BONUS,
            completion_bonus: COMPLETION_BONUS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    pub sprite_reference_width: f64,
    pub tree: SpriteSize,
    pub tree_spacing: usize,
    pub tree_offsets: (f64, f64),
    pub finish: SpriteSize,
    pub finish_offset: f64,
    pub hero_width_scale: f64,
    pub hero_lateral_scale: f64,
    pub cloud_parallax: f64,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            sprite_reference_width: SPRITE_REFERENCE_WIDTH,
            tree: SpriteSize::new(TREE_SIZE.0, TREE_SIZE.1),
            tree_spacing: TREE_SPACING,
            tree_offsets: TREE_OFFSETS,
            finish: SpriteSize::new(FINISH_SIZE.0, FINISH_SIZE.1),
            finish_offset: FINISH_OFFSET,
            hero_width_scale: HERO_WIDTH_SCALE,
            hero_lateral_scale: HERO_LATERAL_SCALE,
            cloud_parallax: CLOUD_PARALLAX,
        }
    }
}

/// Alternating `[dark, light]` band colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub sky: String,
    pub grass: [String; 2],
    pub rumble: [String; 2],
    pub tar: [String; 2],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky: "#72D7EE".to_string(),
            grass: ["#eedccd".to_string(), "#e6d4c5".to_string()],
            rumble: ["#959298".to_string(), "#f5f2f6".to_string()],
            tar: ["#959298".to_string(), "#9c9a9d".to_string()],
        }
    }
}

/// Everything the engine needs to run one variant of the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub screen: ScreenConfig,
    pub road: RoadConfig,
    pub physics: PhysicsConfig,
    pub traffic: TrafficConfig,
    pub pickups: PickupConfig,
    pub track: TrackConfig,
    pub race: RaceConfig,
    pub scenery: SceneryConfig,
    pub palette: Palette,
    pub vehicles: Vec<VehicleSpec>,
    pub drivers: Vec<String>,
    pub powerups: Vec<PowerupSpec>,
    pub obstacles: Vec<SpriteSize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::arcade()
    }
}

fn vehicle(
    name: &str,
    top_speed: f64,
    acceleration: f64,
    lives: u32,
    sprite: SpriteSize,
) -> VehicleSpec {
    VehicleSpec {
        name: name.to_string(),
        top_speed,
        acceleration,
        lives,
        sprite,
    }
}

fn powerup(kind: &str, vehicle_affinity: &str, driver_affinity: &str) -> PowerupSpec {
    PowerupSpec {
        kind: kind.to_string(),
        vehicle_affinity: vehicle_affinity.to_string(),
        driver_affinity: driver_affinity.to_string(),
        sprite: SpriteSize::new(50.0, 50.0),
    }
}

impl EngineConfig {
    /// The 1000x650 game with powerups and developer-themed rosters.
    pub fn arcade() -> Self {
        Self {
            screen: ScreenConfig::default(),
            road: RoadConfig::default(),
            physics: PhysicsConfig::default(),
            traffic: TrafficConfig::default(),
            pickups: PickupConfig::default(),
            track: TrackConfig::default(),
            race: RaceConfig::default(),
            scenery: SceneryConfig::default(),
            palette: Palette::default(),
            vehicles: vec![
                vehicle("Laravel Lambo", 220.0, 40.0, 3, SpriteSize::new(110.0, 53.0)),
                vehicle("TypeScript Truck", 180.0, 35.0, 4, SpriteSize::new(110.0, 72.0)),
                vehicle("CSS Cycle", 260.0, 45.0, 3, SpriteSize::new(49.0, 53.0)),
            ],
            drivers: vec![
                "TAYLOR OTWELL".to_string(),
                "ADAM WATHAN".to_string(),
                "EVAN YOU".to_string(),
            ],
            powerups: vec![
                powerup("laravel", "Laravel Lambo", "TAYLOR OTWELL"),
                powerup("vue", "TypeScript Truck", "EVAN YOU"),
                powerup("tailwind", "CSS Cycle", "ADAM WATHAN"),
            ],
            obstacles: vec![
                SpriteSize::new(55.0, 48.0),
                SpriteSize::new(60.0, 41.0),
                SpriteSize::new(50.0, 34.0),
            ],
        }
    }

    /// The earlier 800x500 build: no pickups, one driver, longer hit cooldown.
    pub fn classic() -> Self {
        let mut config = Self::arcade();
        config.screen = ScreenConfig {
            width: 800.0,
            height: 500.0,
            rounding: Rounding::Ceil,
        };
        config.traffic.collision_cooldown_ms = 2000.0;
        config.pickups.enabled = false;
        config.scenery.sprite_reference_width = 265.0;
        config.vehicles = vec![
            vehicle("LAMBO", 220.0, 40.0, 3, SpriteSize::new(110.0, 53.0)),
            vehicle("TRUCK", 180.0, 35.0, 3, SpriteSize::new(110.0, 72.0)),
            vehicle("BIKE", 260.0, 45.0, 3, SpriteSize::new(49.0, 53.0)),
        ];
        config.drivers = vec!["TAYLOR".to_string()];
        config.powerups = Vec::new();
        config
    }

    pub fn vehicle_names(&self) -> impl Iterator<Item = &str> {
        self.vehicles.iter().map(|vehicle| vehicle.name.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width < 2.0 || self.screen.height < 2.0 {
            return Err(ConfigError::ScreenTooSmall {
                width: self.screen.width,
                height: self.screen.height,
            });
        }
        if self.road.segment_count < 3 {
            return Err(ConfigError::SegmentCountTooSmall {
                count: self.road.segment_count,
                min: 3,
            });
        }

        let positive = [
            ("road.road_width", self.road.road_width),
            ("road.segment_length", self.road.segment_length),
            ("road.camera_depth", self.road.camera_depth),
            ("road.first_segment_z", self.road.first_segment_z),
            ("physics.max_speed", self.physics.max_speed),
            ("physics.lateral_limit", self.physics.lateral_limit),
            ("physics.curve_drift_divisor", self.physics.curve_drift_divisor),
            ("race.tick_hz", self.race.tick_hz),
            ("race.time_budget_divisor", self.race.time_budget_divisor),
            ("scenery.sprite_reference_width", self.scenery.sprite_reference_width),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let ranges = [
            ("track.gap", self.track.gap),
            ("track.section_length", self.track.section_length),
            ("track.height", self.track.height),
            ("track.curve", self.track.curve),
            ("track.interval", self.track.interval),
        ];
        for (field, (min, max)) in ranges {
            if max <= min {
                return Err(ConfigError::EmptyRange { field, min, max });
            }
        }
        // A zero-length section would stall the generator cursor.
        if self.track.section_length.0 <= 0 {
            return Err(ConfigError::EmptyRange {
                field: "track.section_length",
                min: self.track.section_length.0,
                max: self.track.section_length.1,
            });
        }

        if self.vehicles.is_empty() {
            return Err(ConfigError::EmptyRoster { roster: "vehicle" });
        }
        if self.drivers.is_empty() {
            return Err(ConfigError::EmptyRoster { roster: "driver" });
        }
        if self.obstacles.is_empty() && !self.traffic.initial_slots.is_empty() {
            return Err(ConfigError::EmptyRoster { roster: "obstacle" });
        }
        if self.pickups.enabled && self.powerups.is_empty() {
            return Err(ConfigError::EmptyRoster { roster: "powerup" });
        }

        for vehicle in &self.vehicles {
            if vehicle.lives == 0 || vehicle.lives > MAX_LIVES {
                return Err(ConfigError::LivesOutOfRange {
                    vehicle: vehicle.name.clone(),
                    lives: vehicle.lives,
                    max: MAX_LIVES,
                });
            }
            if !(vehicle.top_speed > 0.0) {
                return Err(ConfigError::NonPositive {
                    field: "vehicle.top_speed",
                    value: vehicle.top_speed,
                });
            }
        }

        for powerup in &self.powerups {
            if !self.vehicles.iter().any(|v| v.name == powerup.vehicle_affinity) {
                return Err(ConfigError::UnknownAffinity {
                    powerup: powerup.kind.clone(),
                    name: powerup.vehicle_affinity.clone(),
                });
            }
            if !self.drivers.iter().any(|d| *d == powerup.driver_affinity) {
                return Err(ConfigError::UnknownAffinity {
                    powerup: powerup.kind.clone(),
                    name: powerup.driver_affinity.clone(),
                });
            }
        }

        Ok(())
    }
}

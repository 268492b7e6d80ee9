//! Arcade defaults. `EngineConfig::default()` is assembled from these values;
//! the older 800x500 variant lives in `EngineConfig::classic()`.

// Screen
pub const GAME_WIDTH: f64 = 1000.0;
pub const GAME_HEIGHT: f64 = 650.0;

// Road geometry
pub const ROAD_WIDTH: f64 = 4000.0;
pub const SEGMENT_LENGTH: f64 = 200.0;
pub const SEGMENT_COUNT: usize = 70;
pub const FIRST_SEGMENT_Z: f64 = 270.0;
pub const CAMERA_DEPTH: f64 = 0.2;
pub const CAMERA_HEIGHT: f64 = 1500.0;

// Speeds are world units per tick for the camera and units per second for
// acceleration terms.
pub const MAX_SPEED: f64 = 200.0;
pub const ACCEL: f64 = 38.0;
pub const BRAKING: f64 = -80.0;
pub const DECEL: f64 = -40.0;
pub const MAX_OFF_SPEED: f64 = 40.0;
pub const OFF_DECEL: f64 = -70.0;
pub const OFF_ROAD_THRESHOLD: f64 = 0.55;
pub const LATERAL_LIMIT: f64 = 3.0;
pub const STEER_RATE: f64 = 0.007;
pub const CURVE_DRIFT_DIVISOR: f64 = 5000.0;

// Lanes (left, center, right) in collision space
pub const LANE_LEFT: f64 = -2.3;
pub const LANE_CENTER: f64 = -0.5;
pub const LANE_RIGHT: f64 = 1.2;

// Traffic
pub const ENEMY_SPEED: f64 = 8.0; // segments per second
pub const HIT_SPEED: f64 = 20.0;
pub const COLLISION_COOLDOWN_MS: f64 = 1000.0;
pub const COLLISION_OFFSET_RATIO: f64 = 5.0;
pub const COLLISION_HALF_WIDTH: f64 = 0.5;
pub const SLOW_RESPAWN_SPEED: f64 = 30.0;
pub const RESPAWN_TRAILING_GAP: usize = 2;
pub const INITIAL_CAR_SLOTS: [(f64, usize); 7] = [
    (30.0, 0),
    (35.0, 2),
    (40.0, 1),
    (50.0, 0),
    (55.0, 2),
    (65.0, 1),
    (70.0, 0),
];

// Powerups
pub const POWERUP_SPAWN_COOLDOWN_MS: f64 = 5000.0;
pub const POWERUP_SPAWN_CHANCE: f64 = 0.02;
pub const POWERUP_SPAWN_AHEAD_MIN: f64 = 60.0; // segments
pub const POWERUP_SPAWN_AHEAD_SPAN: f64 = 20.0;
pub const POWERUP_EXPIRY_MARGIN: f64 = 10.0;
pub const POWERUP_BASE_POINTS: u32 = 500;
pub const POWERUP_VEHICLE_BONUS: u32 = 250;
pub const POWERUP_DRIVER_BONUS: u32 = 250;
pub const INVINCIBILITY_MS: f64 = 10_000.0;

// Track generation
pub const TRACK_LENGTH: i32 = 15_000;
pub const SECTION_GAP: (i32, i32) = (0, 50);
pub const SECTION_LENGTH: (i32, i32) = (300, 600);
pub const SECTION_HEIGHT: (i32, i32) = (-5, 5);
pub const SECTION_CURVE: (i32, i32) = (5, 30);
pub const SECTION_INTERVAL: (i32, i32) = (20, 40);
pub const SINE_AMPLITUDE: f64 = 1000.0;

// Race
pub const TICK_HZ: f64 = 25.0;
pub const COUNTDOWN_SECS: u32 = 3;
pub const TIME_BUDGET_DIVISOR: f64 = 130.0;
pub const TIME_BUDGET_PADDING_SECS: f64 = 10.0;
pub const STARTING_LIVES: u32 = 3;
pub const MAX_LIVES: u32 = 10;
pub const LIFE_BONUS: u32 = 100;
pub const COMPLETION_BONUS: u32 = 1000;

// Presentation
pub const SPRITE_REFERENCE_WIDTH: f64 = 200.0;
pub const SPRITE_BASELINE_NUDGE: f64 = 4.0;
pub const TREE_SIZE: (f64, f64) = (132.0, 192.0);
pub const TREE_SPACING: usize = 10;
pub const TREE_OFFSETS: (f64, f64) = (-2.0, 1.3);
pub const FINISH_SIZE: (f64, f64) = (339.0, 180.0);
pub const FINISH_OFFSET: f64 = -0.5;
pub const HERO_WIDTH_SCALE: f64 = 1.75;
pub const HERO_LATERAL_SCALE: f64 = 125.0;
pub const CLOUD_PARALLAX: f64 = 0.13;
pub const ENGINE_PITCH_SCALE: f64 = 8.0;

// Profile limits
pub const PLAYER_NAME_MAX_CHARS: usize = 255;
pub const HANDLE_MAX_CHARS: usize = 39;

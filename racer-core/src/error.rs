use std::fmt;

/// Invariants a live race must hold after every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceRule {
    SpeedRange,
    LateralRange,
    LivesRange,
    CameraPosition,
    SectionCursor,
    TrafficPosition,
    PowerupPosition,
}

impl fmt::Display for RaceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeedRange => write!(f, "SPEED_RANGE"),
            Self::LateralRange => write!(f, "LATERAL_RANGE"),
            Self::LivesRange => write!(f, "LIVES_RANGE"),
            Self::CameraPosition => write!(f, "CAMERA_POSITION"),
            Self::SectionCursor => write!(f, "SECTION_CURSOR"),
            Self::TrafficPosition => write!(f, "TRAFFIC_POSITION"),
            Self::PowerupPosition => write!(f, "POWERUP_POSITION"),
        }
    }
}

impl std::error::Error for RaceRule {}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ScreenTooSmall { width: f64, height: f64 },
    SegmentCountTooSmall { count: usize, min: usize },
    NonPositive { field: &'static str, value: f64 },
    EmptyRoster { roster: &'static str },
    LivesOutOfRange { vehicle: String, lives: u32, max: u32 },
    EmptyRange { field: &'static str, min: i32, max: i32 },
    UnknownAffinity { powerup: String, name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenTooSmall { width, height } => {
                write!(f, "screen too small: {width}x{height}")
            }
            Self::SegmentCountTooSmall { count, min } => {
                write!(f, "segment count {count} below minimum {min}")
            }
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::EmptyRoster { roster } => write!(f, "{roster} roster is empty"),
            Self::LivesOutOfRange {
                vehicle,
                lives,
                max,
            } => write!(
                f,
                "vehicle '{vehicle}' starts with {lives} lives (allowed 1..={max})"
            ),
            Self::EmptyRange { field, min, max } => {
                write!(f, "{field} range [{min}, {max}) is empty")
            }
            Self::UnknownAffinity { powerup, name } => {
                write!(f, "powerup '{powerup}' references unknown roster entry '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileError {
    MissingName,
    NameTooLong { chars: usize, max: usize },
    MissingHandle,
    HandleTooLong { chars: usize, max: usize },
    InvalidHandle,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "player name is required"),
            Self::NameTooLong { chars, max } => {
                write!(f, "player name too long: {chars} characters (max {max})")
            }
            Self::MissingHandle => write!(f, "github handle is required"),
            Self::HandleTooLong { chars, max } => {
                write!(f, "github handle too long: {chars} characters (max {max})")
            }
            Self::InvalidHandle => write!(
                f,
                "github handle may only contain letters, digits and inner hyphens"
            ),
        }
    }
}

impl std::error::Error for ProfileError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionError {
    UnknownVehicle(String),
    UnknownDriver(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVehicle(name) => write!(f, "unknown vehicle: {name}"),
            Self::UnknownDriver(name) => write!(f, "unknown driver: {name}"),
        }
    }
}

impl std::error::Error for SelectionError {}

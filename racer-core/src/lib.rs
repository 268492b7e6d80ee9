pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod input;
pub mod physics;
pub mod profile;
pub mod projection;
pub mod race;
pub mod result;
pub mod rng;
pub mod road;
pub mod track;
pub mod traffic;

pub use config::{EngineConfig, VehicleSpec};
pub use error::{ConfigError, ProfileError, RaceRule, SelectionError};
pub use events::{GameEvent, SoundCue};
pub use game::{FrameGate, Game, Screen, Update};
pub use input::{Action, ControlState};
pub use race::{HudSnapshot, RaceOutcome, RaceSnapshot, RaceState};
pub use result::{RaceResult, RecordingSink, ResultSink, SubmissionStatus};
pub use rng::SeededRng;

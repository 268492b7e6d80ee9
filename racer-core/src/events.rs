use serde::Serialize;

use crate::game::Screen;

/// Audio the host should play. Playback and asset loading live outside the
/// engine; a cue for a missing asset is simply dropped there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum SoundCue {
    Engine { pitch: f64 },
    Honk,
    HonkAlt,
    Powerup,
    Invincible,
    MenuNavigate,
    MenuSelect,
    GameOver,
    Win,
    Countdown,
}

impl SoundCue {
    pub fn asset_key(&self) -> &'static str {
        match self {
            Self::Engine { .. } => "engine",
            Self::Honk => "honk",
            Self::HonkAlt => "honk2",
            Self::Powerup => "powerup",
            Self::Invincible => "invincible",
            Self::MenuNavigate => "menu1",
            Self::MenuSelect => "menu2",
            Self::GameOver => "gameover",
            Self::Win => "win",
            Self::Countdown => "countdown",
        }
    }

    pub fn volume(&self) -> f64 {
        match self {
            Self::Engine { .. } => 0.3,
            Self::Powerup => 0.6,
            Self::Invincible | Self::Countdown => 0.7,
            Self::MenuNavigate | Self::MenuSelect => 0.5,
            Self::Honk | Self::HonkAlt | Self::GameOver | Self::Win => 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    ScreenChanged { from: Screen, to: Screen },
    MenuMoved { screen: Screen, index: usize },
    CountdownTick { remaining: u32 },
    RaceStarted,
    Collision { lives_remaining: u32 },
    PowerupCollected { kind: String, points: u32, invincible: bool },
    InvincibilityEnded,
    RaceFinished { completed: bool, final_score: u32 },
    ResultSubmitted { accepted: bool },
    MuteToggled { muted: bool },
}

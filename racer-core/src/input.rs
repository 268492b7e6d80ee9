use serde::{Deserialize, Serialize};

/// Live control snapshot, sampled once per frame from whatever device the
/// host polls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub steer_left: bool,
    pub steer_right: bool,
    pub throttle: bool,
    pub brake: bool,
    pub confirm: bool,
    pub back: bool,
    pub mute: bool,
}

impl ControlState {
    pub fn steer(&self) -> Steer {
        if self.steer_right {
            Steer::Right
        } else if self.steer_left {
            Steer::Left
        } else {
            Steer::Straight
        }
    }
}

/// Right wins when both directions are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Steer {
    Left,
    #[default]
    Straight,
    Right,
}

/// One-shot menu and toggle actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left,
    Right,
    Confirm,
    Back,
    ToggleMute,
}

/// Turns held buttons into press events.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    previous: ControlState,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions whose button went down since the previous sample.
    pub fn pressed(&mut self, now: &ControlState) -> Vec<Action> {
        let before = self.previous;
        self.previous = *now;

        let mut actions = Vec::new();
        if now.steer_left && !before.steer_left {
            actions.push(Action::Left);
        }
        if now.steer_right && !before.steer_right {
            actions.push(Action::Right);
        }
        if now.confirm && !before.confirm {
            actions.push(Action::Confirm);
        }
        if now.back && !before.back {
            actions.push(Action::Back);
        }
        if now.mute && !before.mute {
            actions.push(Action::ToggleMute);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_fires_once() {
        let mut edges = EdgeDetector::new();
        let held = ControlState {
            confirm: true,
            ..Default::default()
        };
        assert_eq!(edges.pressed(&held), vec![Action::Confirm]);
        assert!(edges.pressed(&held).is_empty());
        assert!(edges.pressed(&ControlState::default()).is_empty());
        assert_eq!(edges.pressed(&held), vec![Action::Confirm]);
    }

    #[test]
    fn right_overrides_left() {
        let both = ControlState {
            steer_left: true,
            steer_right: true,
            ..Default::default()
        };
        assert_eq!(both.steer(), Steer::Right);
    }
}

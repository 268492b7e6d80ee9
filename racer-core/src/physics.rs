use serde::Serialize;

use crate::config::{PhysicsConfig, VehicleSpec};
use crate::input::{ControlState, Steer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PlayerState {
    /// World units advanced per tick.
    pub speed: f64,
    /// Lateral offset from the road center, in road half-widths.
    pub lateral: f64,
    pub steer: Steer,
}

impl PlayerState {
    pub fn is_off_road(&self, physics: &PhysicsConfig) -> bool {
        self.lateral.abs() > physics.off_road_threshold
    }
}

#[inline]
fn accelerate(speed: f64, rate: f64, step: f64) -> f64 {
    speed + rate * step
}

/// One tick of vehicle integration. `curvature` is the road under the camera;
/// throttle only counts once the race is `active`.
pub fn integrate(
    player: &mut PlayerState,
    controls: &ControlState,
    curvature: f64,
    active: bool,
    step: f64,
    physics: &PhysicsConfig,
    vehicle: &VehicleSpec,
) {
    player.lateral -= curvature / physics.curve_drift_divisor * step * player.speed;

    player.steer = controls.steer();
    match player.steer {
        Steer::Right => player.lateral += physics.steer_rate * step * player.speed,
        Steer::Left => player.lateral -= physics.steer_rate * step * player.speed,
        Steer::Straight => {}
    }
    player.lateral = player
        .lateral
        .clamp(-physics.lateral_limit, physics.lateral_limit);

    player.speed = if active && controls.throttle {
        accelerate(player.speed, vehicle.acceleration, step)
    } else if controls.brake {
        accelerate(player.speed, physics.braking, step)
    } else {
        accelerate(player.speed, physics.deceleration, step)
    };

    if player.is_off_road(physics) && player.speed >= physics.max_off_road_speed {
        player.speed = accelerate(player.speed, physics.off_road_deceleration, step);
    }

    player.speed = player.speed.clamp(0.0, vehicle.top_speed);
}

/// Extra decay applied while the race is not yet live.
pub fn settle_inactive(player: &mut PlayerState, step: f64, physics: &PhysicsConfig) {
    player.speed = accelerate(player.speed, physics.braking, step).clamp(0.0, physics.max_speed);
}

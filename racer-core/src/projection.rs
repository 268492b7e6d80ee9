//! Segment projection and draw-list assembly.
//!
//! Each visible segment is projected near to far. Horizontal curvature is
//! integrated twice (`x += dx; dx += curvature`) so curves bend smoothly, and
//! road polygons hidden behind a crest are culled by tracking the highest
//! screen row drawn so far.

use serde::Serialize;

use crate::config::{EngineConfig, SpriteSize, VehicleSpec};
use crate::input::Steer;
use crate::road::SegmentRing;
use crate::track::SpecialMarker;
use crate::traffic::{Powerup, TrafficCar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Grass,
    Rumble,
    Road,
    LaneMarker,
    LaneInfill,
}

/// Trapezoid between two projected rows: `(x1, y1, w1)` is the nearer edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quad {
    pub surface: Surface,
    pub color: usize,
    pub depth: i32,
    pub x1: f64,
    pub y1: f64,
    pub w1: f64,
    pub x2: f64,
    pub y2: f64,
    pub w2: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "sprite", rename_all = "snake_case")]
pub enum SpriteKind {
    Tree,
    Finish,
    Car { index: usize },
    Powerup { kind: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpriteDraw {
    pub kind: SpriteKind,
    pub depth: i32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "draw", rename_all = "snake_case")]
pub enum DrawCommand {
    Sky { cloud_offset: f64 },
    Quad(Quad),
    Sprite(SpriteDraw),
}

impl DrawCommand {
    fn sort_key(&self) -> (i32, u8) {
        match self {
            Self::Sky { .. } => (i32::MIN, 0),
            Self::Quad(quad) => (quad.depth, 1),
            Self::Sprite(sprite) => (sprite.depth, 2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeroPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub pose: Steer,
}

/// Draw commands for one frame, back to front.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub hero: Option<HeroPlacement>,
}

impl Frame {
    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Quad(quad) => Some(quad),
            _ => None,
        })
    }

    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Sprite(sprite) => Some(sprite),
            _ => None,
        })
    }
}

/// Everything outside the ring that shows up in a frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub camera_segment: usize,
    pub camera_travel: f64,
    pub lateral: f64,
    pub cloud_offset: f64,
    pub cars: &'a [TrafficCar],
    pub powerups: &'a [Powerup],
    pub hero: Option<(&'a VehicleSpec, Steer)>,
}

/// Where one road point lands on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Perspective divide for one world point. `world_z` must lie ahead of the camera.
pub fn project_point(
    world_x: f64,
    world_y: f64,
    world_z: f64,
    camera: CameraPose,
    config: &EngineConfig,
) -> ScreenPoint {
    let half_width = config.screen.half_width();
    let scale = config.road.camera_depth / (world_z - camera.z);
    ScreenPoint {
        x: (1.0 + scale * (world_x - camera.x)) * half_width,
        y: config
            .screen
            .rounding
            .apply((1.0 - scale * (world_y - camera.y)) * config.screen.height / 2.0),
        w: scale * config.road.road_width * half_width,
        scale,
    }
}

/// Screen rectangle for a sprite standing on a projected segment.
/// `offset` is in lane units; the sprite also shifts by its own width so
/// roadside props clear the rumble strip.
pub fn sprite_rect(
    point: &ScreenPoint,
    size: SpriteSize,
    offset: f64,
    config: &EngineConfig,
) -> (f64, f64, f64, f64) {
    let reference = config.scenery.sprite_reference_width;
    let width = size.width * point.w / reference;
    let height = size.height * point.w / reference;
    let x = point.x + point.scale * config.screen.half_width() * offset + width * offset;
    let y = point.y + crate::constants::SPRITE_BASELINE_NUDGE - height;
    (x, y, width, height)
}

pub fn hero_placement(
    vehicle: &VehicleSpec,
    lateral: f64,
    pose: Steer,
    config: &EngineConfig,
) -> HeroPlacement {
    let half = vehicle.sprite.width * config.scenery.hero_width_scale / 2.0;
    HeroPlacement {
        x: config.screen.half_width() - half + lateral * config.scenery.hero_lateral_scale,
        y: config.screen.height - 100.0,
        width: vehicle.sprite.width,
        height: vehicle.sprite.height,
        pose,
    }
}

/// Projects the ring from the camera segment forward and builds the frame.
pub fn render(ring: &SegmentRing, scene: &Scene<'_>, config: &EngineConfig) -> Frame {
    let count = ring.len();
    let start = scene.camera_segment;
    let segment_length = config.road.segment_length;
    let half_width = config.screen.half_width();
    let scenery = &config.scenery;

    let mut commands = Vec::with_capacity(count * 7 + 1);
    commands.push(DrawCommand::Sky {
        cloud_offset: scene.cloud_offset,
    });

    let camera_y = config.road.camera_height + ring.get(start as isize).world_y;
    let camera_slot = scene.camera_travel.floor();
    let mut max_y = config.screen.height;
    let mut last_point: Option<ScreenPoint> = None;
    let mut x = 0.0;
    let mut dx = 0.0;

    for n in start..start + count {
        let depth = (count * 2) as i32 - n as i32;
        let wrap = if n >= count { count as f64 } else { 0.0 };
        let camera_z = (start as f64 - wrap) * segment_length;
        let camera = CameraPose {
            x: scene.lateral * config.road.road_width - x,
            y: camera_y,
            z: camera_z,
        };

        let segment = *ring.get(n as isize);
        let point = project_point(0.0, segment.world_y, segment.world_z, camera, config);
        // The camera segment has nothing nearer to join to.
        let previous = last_point.replace(point).unwrap_or(point);
        x += dx;
        dx += segment.curvature;

        let mut sprite = |kind: SpriteKind, size: SpriteSize, offset: f64| {
            let (x, y, width, height) = sprite_rect(&point, size, offset, config);
            commands.push(DrawCommand::Sprite(SpriteDraw {
                kind,
                depth,
                x,
                y,
                width,
                height,
            }));
        };

        if scenery.tree_spacing > 0 {
            if n % scenery.tree_spacing == 0 {
                sprite(SpriteKind::Tree, scenery.tree, scenery.tree_offsets.0);
            }
            if (n + scenery.tree_spacing / 2) % scenery.tree_spacing == 0 {
                sprite(SpriteKind::Tree, scenery.tree, scenery.tree_offsets.1);
            }
        }
        if segment.special == Some(SpecialMarker::Finish) {
            sprite(SpriteKind::Finish, scenery.finish, scenery.finish_offset);
        }

        let slot = n % count;
        for (index, car) in scene.cars.iter().enumerate() {
            if car.position.floor() as usize == slot {
                let size = config
                    .obstacles
                    .get(car.sprite)
                    .copied()
                    .unwrap_or(SpriteSize::new(0.0, 0.0));
                sprite(
                    SpriteKind::Car { index },
                    size,
                    car.lane.offset(&config.traffic),
                );
            }
        }

        let ahead = (n - start) as f64;
        for powerup in scene.powerups {
            if powerup.collected || powerup.position.floor() - camera_slot != ahead {
                continue;
            }
            if let Some(spec) = config.powerups.get(powerup.kind) {
                sprite(
                    SpriteKind::Powerup { kind: powerup.kind },
                    spec.sprite,
                    powerup.lane.offset(&config.traffic),
                );
            }
        }

        if point.y >= max_y {
            continue;
        }
        max_y = point.y;

        let band = (n / 2) % 2;
        let mut quad = |surface: Surface, color: usize, x1: f64, w1: f64, x2: f64, w2: f64| {
            commands.push(DrawCommand::Quad(Quad {
                surface,
                color,
                depth,
                x1,
                y1: previous.y,
                w1,
                x2,
                y2: point.y,
                w2,
            }));
        };

        let width = config.screen.width;
        quad(Surface::Grass, band, width / 4.0, half_width + 2.0, width / 4.0, half_width);
        quad(
            Surface::Grass,
            band,
            width / 4.0 * 3.0,
            half_width + 2.0,
            width / 4.0 * 3.0,
            half_width,
        );
        quad(
            Surface::Rumble,
            band,
            previous.x,
            previous.w * 1.15,
            point.x,
            point.w * 1.15,
        );
        quad(Surface::Road, band, previous.x, previous.w, point.x, point.w);
        if band == 0 {
            quad(
                Surface::LaneMarker,
                1,
                previous.x,
                previous.w * 0.4,
                point.x,
                point.w * 0.4,
            );
            quad(
                Surface::LaneInfill,
                band,
                previous.x,
                previous.w * 0.35,
                point.x,
                point.w * 0.35,
            );
        }
    }

    commands.sort_by_key(DrawCommand::sort_key);

    Frame {
        commands,
        hero: scene
            .hero
            .map(|(vehicle, pose)| hero_placement(vehicle, scene.lateral, pose, config)),
    }
}

impl EngineConfig {
    /// Hex color for a quad's surface and band.
    pub fn surface_color(&self, surface: Surface, color: usize) -> &str {
        let band = color.min(1);
        match surface {
            Surface::Grass => &self.palette.grass[band],
            Surface::Rumble | Surface::LaneMarker => &self.palette.rumble[band],
            Surface::Road | Surface::LaneInfill => &self.palette.tar[band],
        }
    }
}

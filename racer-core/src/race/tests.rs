use super::*;
use crate::track::{SectionShape, TrackSection};
use crate::traffic::{Lane, Powerup, TrafficCar};

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::arcade();
    config.race.countdown_secs = 0;
    config.traffic.initial_slots.clear();
    config.pickups.enabled = false;
    config
}

fn flat(start: f64, end: f64, special: Option<SpecialMarker>) -> TrackSection {
    TrackSection {
        start,
        end,
        shape: SectionShape::Flat,
        special,
    }
}

fn sentinel() -> TrackSection {
    flat(f64::INFINITY, f64::INFINITY, None)
}

fn race_on(config: &EngineConfig, track: Track) -> RaceState {
    let mut vehicle = config.vehicles[0].clone();
    vehicle.top_speed = 200.0;
    RaceState::with_track(
        config,
        vehicle,
        config.drivers[0].clone(),
        track,
        &mut SeededRng::new(7),
    )
}

fn throttle() -> ControlState {
    ControlState {
        throttle: true,
        ..Default::default()
    }
}

fn step(
    race: &mut RaceState,
    config: &EngineConfig,
    rng: &mut SeededRng,
    controls: &ControlState,
) -> (Vec<GameEvent>, Vec<SoundCue>) {
    let mut events = Vec::new();
    let mut cues = Vec::new();
    race.tick(controls, 0.04, config, rng, &mut events, &mut cues);
    (events, cues)
}

#[test]
fn countdown_ticks_then_starts_once() {
    let config = EngineConfig::arcade();
    let mut rng = SeededRng::new(1);
    let mut race = RaceState::new(
        &config,
        config.vehicles[0].clone(),
        "ADAM WATHAN".into(),
        &mut rng,
    );
    assert_eq!(race.hud().countdown, Some(3));

    let mut events = Vec::new();
    for _ in 0..90 {
        let (mut tick_events, _) = step(&mut race, &config, &mut rng, &throttle());
        events.append(&mut tick_events);
    }

    let countdown: Vec<_> = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                GameEvent::CountdownTick { .. } | GameEvent::RaceStarted
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        countdown,
        vec![
            GameEvent::CountdownTick { remaining: 2 },
            GameEvent::CountdownTick { remaining: 1 },
            GameEvent::RaceStarted,
        ]
    );
    assert!(race.is_active());
    assert_eq!(race.hud().countdown, None);
}

#[test]
fn throttle_does_nothing_during_countdown() {
    let config = EngineConfig::arcade();
    let mut rng = SeededRng::new(2);
    let mut race = RaceState::new(
        &config,
        config.vehicles[1].clone(),
        "EVAN YOU".into(),
        &mut rng,
    );
    for _ in 0..20 {
        let (_, cues) = step(&mut race, &config, &mut rng, &throttle());
        assert!(cues.is_empty());
    }
    assert_eq!(race.player().speed, 0.0);
    assert!(race.elapsed_ms > 0.0);
}

#[test]
fn finish_marker_ends_race_when_camera_reaches_it() {
    let config = quiet_config();
    let track = Track::from_sections(vec![
        flat(0.0, 1.0, None),
        flat(1.0, 71.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    race.force_state(200.0, 0.0, 3);
    let mut rng = SeededRng::new(3);

    for _ in 0..69 {
        step(&mut race, &config, &mut rng, &throttle());
        assert!(!race.is_finished());
    }
    assert_eq!(race.road().get(0).special, Some(SpecialMarker::Finish));

    step(&mut race, &config, &mut rng, &throttle());
    assert_eq!(race.outcome(), Some(RaceOutcome::Completed));
    assert!(race.snapshot(&config).time_remaining_secs > 0.0);
}

#[test]
fn expired_time_budget_counts_as_completed() {
    let mut config = quiet_config();
    config.race.time_budget_padding_secs = 0.0;
    let track = Track::from_sections(vec![
        flat(0.0, 13.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    let mut rng = SeededRng::new(4);

    for _ in 0..5 {
        step(&mut race, &config, &mut rng, &ControlState::default());
    }
    assert_eq!(race.outcome(), Some(RaceOutcome::Completed));
    assert_eq!(race.score_breakdown(&config).completion_bonus, 1000);

    let frozen = race.snapshot(&config);
    step(&mut race, &config, &mut rng, &throttle());
    assert_eq!(race.snapshot(&config), frozen);
}

#[test]
fn losing_last_life_wrecks_the_race_once() {
    let config = quiet_config();
    let track = Track::from_sections(vec![
        flat(0.0, 5000.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    race.force_state(0.0, 0.0, 1);
    race.traffic_mut().set_cars(vec![TrafficCar {
        position: 0.5,
        lane: Lane::Center,
        sprite: 0,
    }]);
    let mut rng = SeededRng::new(5);

    let (events, cues) = step(&mut race, &config, &mut rng, &ControlState::default());
    assert!(events.contains(&GameEvent::Collision { lives_remaining: 0 }));
    assert!(cues
        .iter()
        .any(|cue| matches!(cue, SoundCue::Honk | SoundCue::HonkAlt)));
    assert_eq!(race.outcome(), Some(RaceOutcome::Wrecked));
    assert!(!race.finish(RaceOutcome::Completed));
    assert_eq!(race.outcome(), Some(RaceOutcome::Wrecked));
    assert_eq!(race.score_breakdown(&config).completion_bonus, 0);
}

#[test]
fn section_shape_is_written_to_trailing_segment() {
    let config = quiet_config();
    let track = Track::from_sections(vec![
        TrackSection {
            start: 0.0,
            end: 500.0,
            shape: SectionShape::CurvedHill {
                curve: 12.0,
                height: 4.0,
            },
            special: None,
        },
        flat(500.0, 600.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    race.force_state(100.0, 0.0, 3);
    let mut rng = SeededRng::new(6);

    step(&mut race, &config, &mut rng, &throttle());
    let trailing = race.road().trailing(race.camera_segment());
    let segment = race.road().get(trailing as isize);
    assert_eq!(segment.curvature, 12.0);
    assert_eq!(segment.world_y, 4.0);
}

#[test]
fn pickup_points_drive_the_odometer_and_the_track_cursor() {
    let mut config = quiet_config();
    config.pickups.enabled = true;
    config.pickups.spawn_chance = 0.0;
    let track = Track::from_sections(vec![
        TrackSection {
            start: 0.0,
            end: 100.0,
            shape: SectionShape::ConstantCurve { curve: 3.0 },
            special: None,
        },
        flat(200.0, 270.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    race.traffic_mut().push_powerup(Powerup {
        position: 0.4,
        lane: Lane::Center,
        kind: 0,
        collected: false,
    });
    let mut rng = SeededRng::new(10);

    let (events, _) = step(&mut race, &config, &mut rng, &ControlState::default());
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::PowerupCollected { points: 1000, .. })));
    step(&mut race, &config, &mut rng, &ControlState::default());

    let snapshot = race.snapshot(&config);
    assert_eq!(race.player().speed, 0.0);
    assert_eq!(race.score(), 1000.0);
    assert_eq!(snapshot.distance, 1000.0);
    assert!(snapshot.section_index > 0);
    assert_eq!(race.hud().distance, "1000m");
    assert_eq!(race.hud().score, "00001000");
    assert_eq!(race.score_breakdown(&config).base_score, 1000);
}

#[test]
fn engine_cue_tracks_speed() {
    let config = quiet_config();
    let track = Track::from_sections(vec![
        flat(0.0, 5000.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let mut race = race_on(&config, track);
    race.force_state(50.0, 0.0, 3);
    let mut rng = SeededRng::new(8);

    let (_, cues) = step(&mut race, &config, &mut rng, &throttle());
    let pitch = race.player().speed * ENGINE_PITCH_SCALE;
    assert_eq!(cues, vec![SoundCue::Engine { pitch }]);
}

#[test]
fn hud_formats_fields() {
    assert_eq!(format_lap(62_345), "1'02\"345");
    assert_eq!(format_lap(3_600_000), "0'00\"000");
    assert_eq!(format_lap(9_007), "0'09\"007");

    let config = quiet_config();
    let track = Track::from_sections(vec![
        flat(0.0, 5000.0, Some(SpecialMarker::Finish)),
        sentinel(),
    ]);
    let race = race_on(&config, track);
    let hud = race.hud();
    assert_eq!(hud.score, "00000000");
    assert_eq!(hud.speed, "0 MPH");
    assert_eq!(hud.distance, "0m");
    assert_eq!(hud.lives, 3);
    assert_eq!(hud.countdown, None);
}

#[test]
fn invariants_hold_through_a_seeded_drive() {
    let config = EngineConfig::arcade();
    let mut rng = SeededRng::new(0x5eed);
    let mut race = RaceState::new(
        &config,
        config.vehicles[2].clone(),
        config.drivers[1].clone(),
        &mut rng,
    );

    for tick in 0..2_000u32 {
        let controls = ControlState {
            throttle: tick % 7 != 0,
            brake: tick % 31 == 0,
            steer_left: (tick / 40) % 3 == 0,
            steer_right: (tick / 40) % 3 == 2,
            ..Default::default()
        };
        step(&mut race, &config, &mut rng, &controls);
        assert_eq!(race.validate(&config), Ok(()), "tick {tick}");
        if race.is_finished() {
            break;
        }
    }
}

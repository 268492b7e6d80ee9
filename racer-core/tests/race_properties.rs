use racer_core::config::EngineConfig;
use racer_core::game::{Game, Screen};
use racer_core::input::{Action, ControlState};
use racer_core::race::{RaceOutcome, RaceState};
use racer_core::result::{RaceResult, RecordingSink};
use racer_core::rng::SeededRng;
use racer_core::track::Track;

fn weaving(tick: u32) -> ControlState {
    ControlState {
        throttle: tick % 11 != 0,
        brake: tick % 97 == 0,
        steer_left: (tick / 25) % 4 == 1,
        steer_right: (tick / 25) % 4 == 3,
        ..Default::default()
    }
}

fn play_to_end(seed: u32, vehicle: &str) -> (Game<RecordingSink>, u32) {
    let mut game = Game::new(
        EngineConfig::arcade(),
        SeededRng::new(seed),
        RecordingSink::default(),
    )
    .expect("arcade config is valid");
    game.enter_player("Grace Hopper", "@grace");
    game.press(Action::Confirm);
    game.select_vehicle(vehicle).expect("vehicle exists");
    game.press(Action::Confirm);
    game.press(Action::Confirm);

    let mut tick = 0;
    while game.screen() == Screen::Racing && tick < 20_000 {
        game.step(&weaving(tick), 0.04);
        tick += 1;
    }
    (game, tick)
}

#[test]
fn speed_and_lateral_stay_bounded_every_tick() {
    let config = EngineConfig::arcade();
    for seed in [1, 7, 0xC0FFEE] {
        for vehicle in &config.vehicles {
            let mut rng = SeededRng::new(seed);
            let mut race = RaceState::new(&config, vehicle.clone(), config.drivers[0].clone(), &mut rng);
            let mut events = Vec::new();
            let mut cues = Vec::new();

            for tick in 0..3_000 {
                race.tick(&weaving(tick), 0.04, &config, &mut rng, &mut events, &mut cues);
                let player = race.player();
                assert!(
                    (0.0..=vehicle.top_speed).contains(&player.speed),
                    "seed {seed} {} tick {tick}: speed {}",
                    vehicle.name,
                    player.speed
                );
                assert!((-3.0..=3.0).contains(&player.lateral));
                assert_eq!(race.validate(&config), Ok(()));
                if race.is_finished() {
                    break;
                }
            }
        }
    }
}

#[test]
fn generated_tracks_are_ordered_and_terminated() {
    let config = EngineConfig::arcade();
    for seed in 1..40 {
        let track = Track::generate(
            &config.track,
            config.road.segment_count,
            &mut SeededRng::new(seed),
        );
        let sections = track.sections();
        assert!(sections.len() >= 3);

        for pair in sections.windows(2) {
            assert!(pair[0].start < pair[0].end || pair[0].is_sentinel());
            assert!(pair[0].end <= pair[1].start, "seed {seed} overlaps");
        }

        let finish = &sections[sections.len() - 2];
        assert!(finish.special.is_some());
        assert!(finish.start >= f64::from(config.track.length));
        assert!(sections[sections.len() - 1].is_sentinel());
        assert_eq!(track.finish_distance(), finish.end);
    }
}

#[test]
fn full_games_submit_one_consistent_result() {
    for (seed, vehicle) in [(3, "Laravel Lambo"), (11, "TypeScript Truck"), (29, "CSS Cycle")] {
        let (mut game, ticks) = play_to_end(seed, vehicle);
        assert_eq!(game.screen(), Screen::GameOver, "seed {seed} ran {ticks} ticks");
        assert_eq!(game.sink().results.len(), 1);

        let result: RaceResult = game.sink().results[0].clone();
        assert_eq!(result.vehicle_name, vehicle);
        assert_eq!(result.github_handle, "grace");
        assert_eq!(result.life_bonus, result.lives_remaining * 100);
        assert!(result.completion_bonus == 0 || result.completion_bonus == 1000);
        assert_eq!(
            i64::from(result.final_score),
            (i64::from(result.base_score) - i64::from(result.time_penalty)
                + i64::from(result.life_bonus)
                + i64::from(result.completion_bonus))
            .max(0)
        );

        game.finish_race(RaceOutcome::Completed);
        game.finish_race(RaceOutcome::Wrecked);
        assert_eq!(game.sink().results.len(), 1);
    }
}

#[test]
fn same_seed_replays_identically() {
    let (first, first_ticks) = play_to_end(0x5EED, "CSS Cycle");
    let (second, second_ticks) = play_to_end(0x5EED, "CSS Cycle");
    assert_eq!(first_ticks, second_ticks);
    assert_eq!(first.sink().results, second.sink().results);
}

#[test]
fn result_serializes_for_the_leaderboard() {
    let (game, _) = play_to_end(5, "Laravel Lambo");
    let value = serde_json::to_value(&game.sink().results[0]).unwrap();
    for key in [
        "player_name",
        "github_username",
        "base_score",
        "time_penalty",
        "life_bonus",
        "completion_bonus",
        "final_score",
        "race_time",
        "vehicle",
        "driver",
        "lives_remaining",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

use super::*;
use crate::result::RecordingSink;

fn new_game(sink: RecordingSink) -> Game<RecordingSink> {
    Game::new(EngineConfig::arcade(), SeededRng::new(42), sink).unwrap()
}

fn racing_game(sink: RecordingSink) -> Game<RecordingSink> {
    let mut game = new_game(sink);
    game.enter_player("Ada", "@ada");
    game.press(Action::Confirm);
    game.press(Action::Confirm);
    game.press(Action::Confirm);
    assert_eq!(game.screen(), Screen::Racing);
    game
}

fn throttle() -> ControlState {
    ControlState {
        throttle: true,
        ..Default::default()
    }
}

#[test]
fn gate_skips_early_calls_and_drops_drift() {
    let mut gate = FrameGate::new(25.0);
    assert_eq!(gate.period_ms(), 40.0);
    assert_eq!(gate.poll(0.0), None);
    assert_eq!(gate.poll(30.0), None);
    assert_eq!(gate.poll(41.0), Some(41.0 / 1000.0));
    assert_eq!(gate.poll(81.0), Some(41.0 / 1000.0));
    assert_eq!(gate.poll(500.0), Some(420.0 / 1000.0));
    assert_eq!(gate.poll(510.0), None);
    assert!(gate.poll(521.0).is_some());
}

#[test]
fn intro_needs_a_valid_profile() {
    let mut game = new_game(RecordingSink::default());
    game.press(Action::Confirm);
    assert_eq!(game.screen(), Screen::Intro);
    assert_eq!(game.profile_error(), Some(ProfileError::MissingName));

    game.enter_player("Ada", "-bad-");
    game.press(Action::Confirm);
    assert_eq!(game.profile_error(), Some(ProfileError::InvalidHandle));

    game.enter_player("Ada", "@ada");
    let update = game.press(Action::Confirm);
    assert_eq!(game.screen(), Screen::VehicleSelect);
    assert_eq!(game.profile().map(|p| p.handle.as_str()), Some("ada"));
    assert_eq!(game.profile_error(), None);
    assert!(update.events.contains(&GameEvent::ScreenChanged {
        from: Screen::Intro,
        to: Screen::VehicleSelect,
    }));
    assert_eq!(update.cues, vec![SoundCue::MenuSelect]);
}

#[test]
fn menus_wrap_and_back_out() {
    let mut game = new_game(RecordingSink::default());
    game.enter_player("Ada", "ada");
    game.press(Action::Confirm);

    let update = game.press(Action::Left);
    assert_eq!(game.vehicle_index(), 2);
    assert_eq!(update.cues, vec![SoundCue::MenuNavigate]);
    game.press(Action::Right);
    assert_eq!(game.vehicle_index(), 0);
    game.press(Action::Right);
    assert_eq!(game.selected_vehicle().name, "TypeScript Truck");

    game.press(Action::Confirm);
    assert_eq!(game.screen(), Screen::DriverSelect);
    game.press(Action::Right);
    game.press(Action::Right);
    game.press(Action::Right);
    assert_eq!(game.driver_index(), 0);

    game.press(Action::Back);
    assert_eq!(game.screen(), Screen::VehicleSelect);
    game.press(Action::Back);
    assert_eq!(game.screen(), Screen::Intro);
}

#[test]
fn entering_race_starts_countdown() {
    let mut game = new_game(RecordingSink::default());
    game.enter_player("Ada", "ada");
    game.press(Action::Confirm);
    game.press(Action::Confirm);
    let update = game.press(Action::Confirm);

    assert_eq!(game.screen(), Screen::Racing);
    assert!(update.events.contains(&GameEvent::CountdownTick { remaining: 3 }));
    assert!(update.cues.contains(&SoundCue::Countdown));
    assert!(game.race().is_some_and(|race| !race.is_active()));
}

#[test]
fn menu_steps_do_not_tick() {
    let mut game = new_game(RecordingSink::default());
    let update = game.step(&throttle(), 0.04);
    assert!(!update.ticked);
    assert!(update.frame.is_none());
}

#[test]
fn race_submits_exactly_once() {
    let mut game = racing_game(RecordingSink::default());

    let mut finished = None;
    for tick in 0..10_000 {
        let update = game.step(&throttle(), 0.04);
        assert!(update.ticked);
        assert!(update.frame.is_some());
        assert_eq!(game.validate(), Ok(()));
        if game.screen() == Screen::GameOver {
            finished = Some((tick, update));
            break;
        }
    }
    let (_, update) = finished.expect("race never ended");

    assert_eq!(game.sink().results.len(), 1);
    assert_eq!(game.submission(), SubmissionStatus::Accepted);
    assert!(update.events.contains(&GameEvent::ResultSubmitted { accepted: true }));
    let result = game.last_result().cloned().unwrap();
    assert_eq!(result.player_name, "Ada");
    assert_eq!(result.github_handle, "ada");
    assert_eq!(result.vehicle_name, "Laravel Lambo");
    assert_eq!(
        result.final_score,
        (i64::from(result.base_score) - i64::from(result.time_penalty)
            + i64::from(result.life_bonus)
            + i64::from(result.completion_bonus))
        .max(0) as u32
    );

    let again = game.finish_race(RaceOutcome::Wrecked);
    assert!(again.events.is_empty());
    let after = game.step(&throttle(), 0.04);
    assert!(!after.ticked);
    assert_eq!(game.sink().results.len(), 1);
}

#[test]
fn double_game_over_submits_once() {
    let mut game = racing_game(RecordingSink::default());
    game.step(&throttle(), 0.04);

    let first = game.finish_race(RaceOutcome::Wrecked);
    let second = game.finish_race(RaceOutcome::Completed);

    assert_eq!(game.screen(), Screen::GameOver);
    assert!(first.events.iter().any(|event| matches!(
        event,
        GameEvent::RaceFinished {
            completed: false,
            ..
        }
    )));
    assert!(second.events.is_empty());
    assert_eq!(game.sink().results.len(), 1);
    let result = &game.sink().results[0];
    assert_eq!(result.completion_bonus, 0);
    assert_eq!(result.lives_remaining, 3);
    assert_eq!(result.life_bonus, 300);
}

#[test]
fn rejected_submission_does_not_block_the_game() {
    let mut game = racing_game(RecordingSink {
        reject: true,
        ..Default::default()
    });
    let update = game.finish_race(RaceOutcome::Completed);
    assert!(update.events.contains(&GameEvent::ResultSubmitted { accepted: false }));
    assert_eq!(game.submission(), SubmissionStatus::Failed);
    assert_eq!(game.screen(), Screen::GameOver);

    game.press(Action::Confirm);
    assert_eq!(game.screen(), Screen::Intro);
    assert!(game.race().is_none());
    assert!(game.profile().is_some());
}

#[test]
fn muted_game_emits_no_cues() {
    let mut game = new_game(RecordingSink::default());
    let update = game.press(Action::ToggleMute);
    assert_eq!(update.events, vec![GameEvent::MuteToggled { muted: true }]);
    assert!(game.is_muted());

    game.enter_player("Ada", "ada");
    let update = game.press(Action::Confirm);
    assert!(update.cues.is_empty());
    assert!(!update.events.is_empty());
}

#[test]
fn held_buttons_press_once() {
    let mut game = new_game(RecordingSink::default());
    game.enter_player("Ada", "ada");
    let confirm = ControlState {
        confirm: true,
        ..Default::default()
    };
    game.update(0.0, &confirm);
    game.update(16.0, &confirm);
    game.update(32.0, &confirm);
    assert_eq!(game.screen(), Screen::VehicleSelect);

    game.update(48.0, &ControlState::default());
    game.update(64.0, &confirm);
    assert_eq!(game.screen(), Screen::DriverSelect);
}

#[test]
fn update_ticks_at_the_gate_rate() {
    let mut game = racing_game(RecordingSink::default());
    let mut ticks = 0;
    for frame in 0..=60 {
        let update = game.update(f64::from(frame) * 1000.0 / 60.0, &throttle());
        if update.ticked {
            ticks += 1;
        }
    }
    assert!((23..=25).contains(&ticks), "ticks {ticks}");
}

#[test]
fn restart_abandons_without_submitting() {
    let mut game = racing_game(RecordingSink::default());
    game.step(&throttle(), 0.04);
    game.restart();
    assert_eq!(game.screen(), Screen::Intro);
    assert!(game.sink().results.is_empty());
}

#[test]
fn roster_selection_by_name() {
    let mut game = new_game(RecordingSink::default());
    game.select_vehicle("css cycle").unwrap();
    game.select_driver("Evan You").unwrap();
    assert_eq!(game.vehicle_index(), 2);
    assert_eq!(game.selected_driver(), "EVAN YOU");
    assert_eq!(
        game.select_vehicle("Hover Board"),
        Err(SelectionError::UnknownVehicle("Hover Board".to_string()))
    );
    assert_eq!(game.vehicle_index(), 2);
}

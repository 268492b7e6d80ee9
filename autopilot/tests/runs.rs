use autopilot::benchmark::{run_benchmark, BenchmarkConfig, Objective};
use autopilot::bots::bot_ids;
use autopilot::runner::{run_bot, RunSetup, BOT_HANDLE};
use racer_core::config::EngineConfig;
use tempfile::TempDir;

const MAX_TICKS: u32 = 20_000;

#[test]
fn every_bot_finishes_a_race_and_submits_once() {
    let config = EngineConfig::arcade();
    for bot in bot_ids() {
        let artifact = run_bot(bot, 0xA57E_0001, MAX_TICKS, &config, &RunSetup::default())
            .unwrap_or_else(|err| panic!("{bot}: {err:#}"));
        let metrics = &artifact.metrics;

        assert!(metrics.finished, "{bot} never finished");
        assert!(metrics.tick_count <= MAX_TICKS);
        let result = artifact.result.expect("finished race submits a result");
        assert_eq!(result.final_score, metrics.final_score);
        assert_eq!(result.lives_remaining, metrics.lives_remaining);
        assert_eq!(result.github_handle, BOT_HANDLE.trim_start_matches('@'));
        assert_eq!(result.race_time_ms, metrics.race_time_ms);
    }
}

#[test]
fn idle_bot_never_moves_but_still_ends_the_race() {
    let config = EngineConfig::arcade();
    let artifact = run_bot("idle", 5, MAX_TICKS, &config, &RunSetup::default()).unwrap();

    assert_eq!(artifact.metrics.throttle_ticks, 0);
    assert_eq!(artifact.metrics.distance, 0.0);
    assert!(artifact.metrics.finished);
    assert!(artifact.result.is_some());
}

#[test]
fn runs_are_reproducible_per_seed() {
    let config = EngineConfig::arcade();
    let first = run_bot("wanderer", 99, MAX_TICKS, &config, &RunSetup::default()).unwrap();
    let second = run_bot("wanderer", 99, MAX_TICKS, &config, &RunSetup::default()).unwrap();

    assert_eq!(first.metrics.tick_count, second.metrics.tick_count);
    assert_eq!(first.metrics.final_score, second.metrics.final_score);
    assert_eq!(first.result, second.result);
}

#[test]
fn tick_cap_leaves_the_race_unsubmitted() {
    let config = EngineConfig::arcade();
    let artifact = run_bot("cruiser", 1, 10, &config, &RunSetup::default()).unwrap();

    assert_eq!(artifact.metrics.tick_count, 10);
    assert!(!artifact.metrics.finished);
    assert!(artifact.result.is_none());
}

#[test]
fn run_honours_vehicle_choice_and_rejects_unknown_ones() {
    let config = EngineConfig::arcade();
    let setup = RunSetup {
        vehicle: Some("css cycle".to_string()),
        driver: None,
    };
    let artifact = run_bot("cruiser", 2, 50, &config, &setup).unwrap();
    assert_eq!(artifact.metrics.vehicle, "CSS Cycle");

    let bad = RunSetup {
        vehicle: Some("Hover Board".to_string()),
        driver: None,
    };
    assert!(run_bot("cruiser", 2, 50, &config, &bad).is_err());
    assert!(run_bot("nobody", 2, 50, &config, &RunSetup::default()).is_err());
    assert!(run_bot("cruiser", 2, 0, &config, &RunSetup::default()).is_err());
}

#[test]
fn benchmark_writes_reports() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("bench");
    let report = run_benchmark(BenchmarkConfig {
        bots: vec!["cruiser".to_string(), "dodger".to_string()],
        seeds: vec![1, 2],
        max_ticks: MAX_TICKS,
        objective: Objective::Hybrid,
        engine: EngineConfig::arcade(),
        setup: RunSetup::default(),
        out_dir: out_dir.clone(),
        save_top: 1,
        jobs: Some(2),
    })
    .unwrap();

    assert_eq!(report.run_count, 4);
    assert_eq!(report.bot_rankings.len(), 2);
    assert!(report.bot_rankings[0].objective_value >= report.bot_rankings[1].objective_value);
    assert_eq!(report.saved_results.len(), 2);

    let runs_csv = std::fs::read_to_string(out_dir.join("runs.csv")).unwrap();
    assert_eq!(runs_csv.lines().count(), 5);
    assert!(out_dir.join("rankings.csv").exists());

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out_dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["objective"], "hybrid");
    assert_eq!(summary["runs"].as_array().map(Vec::len), Some(4));
}

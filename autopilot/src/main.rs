use anyhow::{anyhow, Result};
use autopilot::benchmark::{resolve_bots, run_benchmark, BenchmarkConfig, Objective};
use autopilot::bots::{bot_ids, create_bot, describe_bots};
use autopilot::runner::{run_bot, RunSetup};
use autopilot::util::{load_engine_config, parse_seed, resolve_seeds, seed_to_hex, unix_now_s};
use clap::{Parser, Subcommand, ValueEnum};
use racer_core::config::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "autopilot")]
#[command(about = "Headless bot driver and benchmark runner for the racer core")]
struct Cli {
    /// Engine config JSON; sections left out use the preset's values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = Preset::Arcade)]
    preset: Preset,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available bots
    ListBots,
    /// Drive one race and print its result
    Run {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u32,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        driver: Option<String>,
        /// Write the leaderboard payload here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run multi-seed benchmark across one or more bots
    Benchmark {
        #[arg(long)]
        bots: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u32,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long, value_enum, default_value_t = CliObjective::Score)]
        objective: CliObjective,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Arcade,
    Classic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliObjective {
    Score,
    Survival,
    Hybrid,
}

impl From<CliObjective> for Objective {
    fn from(value: CliObjective) -> Self {
        match value {
            CliObjective::Score => Objective::Score,
            CliObjective::Survival => Objective::Survival,
            CliObjective::Hybrid => Objective::Hybrid,
        }
    }
}

fn engine_config(path: Option<&Path>, preset: Preset) -> Result<EngineConfig> {
    match path {
        Some(path) => load_engine_config(path),
        None => Ok(match preset {
            Preset::Arcade => EngineConfig::arcade(),
            Preset::Classic => EngineConfig::classic(),
        }),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        config,
        preset,
        command,
    } = Cli::parse();

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:20} {description}");
            }
        }
        Commands::Run {
            bot,
            seed,
            max_ticks,
            vehicle,
            driver,
            output,
        } => {
            if create_bot(&bot).is_none() {
                let available = bot_ids().join(", ");
                return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
            }
            let engine = engine_config(config.as_deref(), preset)?;
            let seed = parse_seed(&seed)?;
            let artifact = run_bot(&bot, seed, max_ticks, &engine, &RunSetup { vehicle, driver })?;
            let metrics = &artifact.metrics;

            println!("bot={}", metrics.bot_id);
            println!("seed={}", seed_to_hex(seed));
            println!("vehicle={}", metrics.vehicle);
            println!("driver={}", metrics.driver);
            println!("ticks={}", metrics.tick_count);
            println!("distance={:.0}", metrics.distance);
            println!("race_time_ms={}", metrics.race_time_ms);
            println!("lives={}", metrics.lives_remaining);
            println!("completed={}", metrics.completed);
            println!("score={}", metrics.final_score);

            match (&artifact.result, output) {
                (Some(result), Some(path)) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, serde_json::to_vec_pretty(result)?)?;
                    println!("output={}", path.display());
                }
                (Some(result), None) => println!("{}", serde_json::to_string_pretty(result)?),
                (None, _) => println!("result=none (max ticks reached before the finish)"),
            }
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            max_ticks,
            vehicle,
            objective,
            out_dir,
            save_top,
            jobs,
        } => {
            let engine = engine_config(config.as_deref(), preset)?;
            let bots = resolve_bots(bots.as_deref())?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let objective: Objective = objective.into();

            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!("benchmarks/{}-{}", objective.as_str(), unix_now_s()))
            });

            let report = run_benchmark(BenchmarkConfig {
                bots,
                seeds,
                max_ticks,
                objective,
                engine,
                setup: RunSetup {
                    vehicle,
                    driver: None,
                },
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("objective={}", objective.as_str());
            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("top bots:");
            for (idx, bot) in report.bot_rankings.iter().take(5).enumerate() {
                println!(
                    "  {}. {}  objective={:.2} avg_score={:.1} max_score={} avg_lives={:.2} avg_hits={:.2} completed={:.0}%",
                    idx + 1,
                    bot.bot_id,
                    bot.objective_value,
                    bot.avg_score,
                    bot.max_score,
                    bot.avg_lives,
                    bot.avg_hits,
                    bot.completion_rate * 100.0,
                );
            }

            println!("saved results:");
            for saved in report.saved_results.iter().take(10) {
                println!(
                    "  [{} #{:02}] {} {} score={}",
                    saved.metric, saved.rank, saved.bot_id, saved.seed_hex, saved.score,
                );
            }
        }
    }

    Ok(())
}

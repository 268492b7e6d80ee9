use crate::bots::bot_ids;
use crate::runner::{run_bot, RunMetrics, RunSetup};
use crate::util::{seed_to_hex, unix_now_s};
use anyhow::{anyhow, Context, Result};
use racer_core::config::EngineConfig;
use racer_core::result::RaceResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Score,
    Survival,
    Hybrid,
}

impl Objective {
    pub fn run_value(self, metrics: &RunMetrics) -> f64 {
        let completed = if metrics.completed { 1.0 } else { 0.0 };
        match self {
            Self::Score => metrics.final_score as f64,
            Self::Survival => {
                (metrics.lives_remaining as f64) * 1000.0
                    + completed * 500.0
                    + metrics.distance * 0.01
            }
            Self::Hybrid => {
                (metrics.final_score as f64) * 0.6
                    + (metrics.lives_remaining as f64) * 250.0
                    + completed * 400.0
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Survival => "survival",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub max_ticks: u32,
    pub objective: Objective,
    pub engine: EngineConfig,
    pub setup: RunSetup,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub vehicle: String,
    pub tick_count: u32,
    pub final_score: u32,
    pub race_time_ms: u64,
    pub lives_remaining: u32,
    pub hits: u32,
    pub completed: bool,
    pub finished: bool,
    pub objective_value: f64,
    pub throttle_ticks: u32,
    pub brake_ticks: u32,
    pub steer_ticks: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub runs: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_ticks: f64,
    pub avg_race_time_ms: f64,
    pub avg_lives: f64,
    pub min_lives: u32,
    pub avg_hits: f64,
    pub completion_rate: f64,
    pub objective_value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedResultRecord {
    pub rank: usize,
    pub metric: String,
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub score: u32,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub objective: Objective,
    pub max_ticks: u32,
    pub jobs: Option<usize>,
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub bot_rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_results: Vec<SavedResultRecord>,
}

#[derive(Clone, Debug)]
struct InternalRun {
    metrics: RunMetrics,
    objective_value: f64,
    result: Option<RaceResult>,
}

pub fn resolve_bots(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(bot_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let bots: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect();
            if bots.is_empty() {
                return Err(anyhow!("--bots resolved to empty list"));
            }
            Ok(bots)
        }
    }
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark requires at least one bot"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_jobs: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();
    tracing::info!(
        runs = run_jobs.len(),
        objective = config.objective.as_str(),
        "benchmark started"
    );

    let run_one = |(bot_id, seed): &(String, u32)| -> Result<InternalRun> {
        let artifact = run_bot(bot_id, *seed, config.max_ticks, &config.engine, &config.setup)
            .with_context(|| format!("benchmark run failed for bot={bot_id} seed={seed:#x}"))?;
        let objective_value = config.objective.run_value(&artifact.metrics);
        Ok(InternalRun {
            metrics: artifact.metrics,
            objective_value,
            result: artifact.result,
        })
    };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };
    let runs = run_results.into_iter().collect::<Result<Vec<_>>>()?;

    let rankings = rank_bots(&runs);

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            bot_id: run.metrics.bot_id.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            vehicle: run.metrics.vehicle.clone(),
            tick_count: run.metrics.tick_count,
            final_score: run.metrics.final_score,
            race_time_ms: run.metrics.race_time_ms,
            lives_remaining: run.metrics.lives_remaining,
            hits: run.metrics.hits,
            completed: run.metrics.completed,
            finished: run.metrics.finished,
            objective_value: run.objective_value,
            throttle_ticks: run.metrics.throttle_ticks,
            brake_ticks: run.metrics.brake_ticks,
            steer_ticks: run.metrics.steer_ticks,
        })
        .collect();

    run_records.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.final_score.cmp(&a.final_score))
            .then_with(|| a.race_time_ms.cmp(&b.race_time_ms))
    });

    let mut saved_results = Vec::new();
    if config.save_top > 0 {
        save_top_results(
            &config.out_dir,
            &runs,
            "objective",
            config.save_top,
            |run| run.objective_value,
            &mut saved_results,
        )?;
        save_top_results(
            &config.out_dir,
            &runs,
            "score",
            config.save_top,
            |run| run.metrics.final_score as f64,
            &mut saved_results,
        )?;
    }

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: unix_now_s(),
        objective: config.objective,
        max_ticks: config.max_ticks,
        jobs: config.jobs,
        bots: config.bots,
        seeds: config.seeds,
        run_count: run_records.len(),
        bot_rankings: rankings,
        runs: run_records,
        saved_results,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn rank_bots(runs: &[InternalRun]) -> Vec<BotAggregate> {
    let mut grouped: HashMap<&str, Vec<&InternalRun>> = HashMap::new();
    for run in runs {
        grouped
            .entry(run.metrics.bot_id.as_str())
            .or_default()
            .push(run);
    }

    let mut rankings: Vec<BotAggregate> = grouped
        .into_iter()
        .map(|(bot_id, bot_runs)| {
            let n = bot_runs.len() as f64;
            let mean = |value: fn(&InternalRun) -> f64| {
                bot_runs.iter().map(|run| value(run)).sum::<f64>() / n
            };
            BotAggregate {
                bot_id: bot_id.to_string(),
                runs: bot_runs.len(),
                avg_score: mean(|run| run.metrics.final_score as f64),
                max_score: bot_runs
                    .iter()
                    .map(|run| run.metrics.final_score)
                    .max()
                    .unwrap_or_default(),
                avg_ticks: mean(|run| run.metrics.tick_count as f64),
                avg_race_time_ms: mean(|run| run.metrics.race_time_ms as f64),
                avg_lives: mean(|run| run.metrics.lives_remaining as f64),
                min_lives: bot_runs
                    .iter()
                    .map(|run| run.metrics.lives_remaining)
                    .min()
                    .unwrap_or_default(),
                avg_hits: mean(|run| run.metrics.hits as f64),
                completion_rate: mean(|run| if run.metrics.completed { 1.0 } else { 0.0 }),
                objective_value: mean(|run| run.objective_value),
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.avg_score.total_cmp(&a.avg_score))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });
    rankings
}

/// Writes the leaderboard payload of the best finished runs by `metric`.
fn save_top_results<F>(
    out_dir: &Path,
    runs: &[InternalRun],
    metric_name: &str,
    count: usize,
    metric: F,
    saved: &mut Vec<SavedResultRecord>,
) -> Result<()>
where
    F: Fn(&InternalRun) -> f64,
{
    let mut order: Vec<(&InternalRun, &RaceResult)> = runs
        .iter()
        .filter_map(|run| run.result.as_ref().map(|result| (run, result)))
        .collect();
    order.sort_by(|(a, _), (b, _)| {
        metric(b)
            .total_cmp(&metric(a))
            .then_with(|| b.metrics.final_score.cmp(&a.metrics.final_score))
            .then_with(|| a.metrics.race_time_ms.cmp(&b.metrics.race_time_ms))
    });

    let save_dir = out_dir.join(format!("top-{metric_name}"));
    fs::create_dir_all(&save_dir)
        .with_context(|| format!("failed creating {}", save_dir.display()))?;

    for (idx, (run, result)) in order.into_iter().take(count).enumerate() {
        let rank = idx + 1;
        let path = save_dir.join(format!(
            "rank{rank:02}-{}-seed{:08x}-score{}.json",
            run.metrics.bot_id, run.metrics.seed, run.metrics.final_score
        ));
        fs::write(
            &path,
            serde_json::to_vec_pretty(result).context("failed to serialize race result")?,
        )
        .with_context(|| format!("failed writing {}", path.display()))?;

        saved.push(SavedResultRecord {
            rank,
            metric: metric_name.to_string(),
            bot_id: run.metrics.bot_id.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            score: run.metrics.final_score,
            path: path.to_string_lossy().into_owned(),
        });
    }

    Ok(())
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "bot_id,seed_hex,seed,vehicle,tick_count,final_score,race_time_ms,lives_remaining,hits,completed,finished,objective_value,throttle_ticks,brake_ticks,steer_ticks\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            row.bot_id,
            row.seed_hex,
            row.seed,
            row.vehicle,
            row.tick_count,
            row.final_score,
            row.race_time_ms,
            row.lives_remaining,
            row.hits,
            row.completed,
            row.finished,
            row.objective_value,
            row.throttle_ticks,
            row.brake_ticks,
            row.steer_ticks
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[BotAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,bot_id,runs,avg_score,max_score,avg_ticks,avg_race_time_ms,avg_lives,min_lives,avg_hits,completion_rate,objective_value\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{:.2},{},{:.2},{:.1},{:.2},{},{:.2},{:.4},{:.4}\n",
            idx + 1,
            row.bot_id,
            row.runs,
            row.avg_score,
            row.max_score,
            row.avg_ticks,
            row.avg_race_time_ms,
            row.avg_lives,
            row.min_lives,
            row.avg_hits,
            row.completion_rate,
            row.objective_value
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

//! Optimize command - search for a low-loss schedule and export it
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_search_config(), run_search(), save_results()
//! - Level 3: load_roster(), load_weights(), progress bar
//! - Level 4: file I/O, formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use matchmaker_batch::BatchConfig;
use matchmaker_core::{MetricWeights, Roster, DEFAULT_MAX_REJECTIONS};
use matchmaker_search::{
    optimize_batched_with_callback, optimize_parallel, optimize_with_callback, SearchConfig,
    SearchResult,
};
use matchmaker_stats::StatisticsReport;

use crate::export::{schedule_entries, Export, ExportParameters};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct OptimizeArgs {
    /// Comma-separated player names
    #[arg(long, value_delimiter = ',', conflicts_with = "players_file")]
    pub players: Vec<String>,

    /// File with one player name per line
    #[arg(long, value_name = "FILE")]
    pub players_file: Option<PathBuf>,

    /// Rounds per schedule
    #[arg(long, default_value = "10")]
    pub rounds: usize,

    /// Simultaneous fields per round
    #[arg(long, default_value = "1")]
    pub fields: usize,

    /// Schedules sampled per run
    #[arg(long, default_value = "1000")]
    pub iterations: usize,

    /// Loss weights as a JSON object of metric name to weight
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Rejected draws allowed per round before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_REJECTIONS)]
    pub max_rejections: u32,

    /// Independent seeded runs on all cores
    #[arg(long, default_value = "1")]
    pub runs: usize,

    /// Score candidates in batches with the vectorized scorer
    #[arg(long, conflicts_with = "runs")]
    pub batched: bool,

    /// Schedules per batch with --batched
    #[arg(long, default_value_t = BatchConfig::default().batch_size)]
    pub batch_size: usize,

    /// Output JSON file
    #[arg(long, default_value = "schedule.json")]
    pub output: PathBuf,

    /// Print the full export to stdout as well
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run optimize command
///
/// 1. Load players and weights
/// 2. Run the search (single, parallel or batched)
/// 3. Save the export
pub fn run(args: OptimizeArgs, seed: Option<u64>) -> Result<()> {
    let roster = load_roster(&args)?;
    let config = build_search_config(&args)?;
    let config = config.with_seed(resolve_seed(seed));

    tracing::info!(
        "Optimizing {} players: rounds={}, fields={}, iterations={}",
        roster.len(),
        args.rounds,
        args.fields,
        args.iterations
    );

    let result = run_search(&roster, &config, &args)?;

    save_results(&result, &roster, &config, &args)?;

    print_summary(&result, &roster, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build search configuration from command arguments
fn build_search_config(args: &OptimizeArgs) -> Result<SearchConfig> {
    let weights = match &args.weights {
        Some(path) => load_weights(path)?,
        None => MetricWeights::default(),
    };

    let config = SearchConfig::new(args.rounds, args.fields, args.iterations)
        .with_weights(weights)
        .with_max_rejections(args.max_rejections);
    config.validate()?;

    Ok(config)
}

/// Dispatch to the requested search mode, seeded from `config.seed`
fn run_search(roster: &Roster, config: &SearchConfig, args: &OptimizeArgs) -> Result<SearchResult> {
    if args.runs > 1 {
        let seed = config.seed.unwrap_or_default();
        tracing::info!("Running {} parallel searches", args.runs);
        let parallel = optimize_parallel(roster, config, args.runs, seed)?;
        tracing::info!(
            "Best run {} of {} (seed {})",
            parallel.best_run,
            args.runs,
            seed.wrapping_add(parallel.best_run as u64)
        );
        return Ok(parallel.best);
    }

    let mut rng = config.create_rng();
    let progress = create_progress_bar(config.num_iterations as u64);
    let callback = |iteration: usize, best: f64| {
        progress.set_position(iteration as u64 + 1);
        progress.set_message(format!("best loss {:.4}", best));
    };

    let result = if args.batched {
        optimize_batched_with_callback(roster, config, args.batch_size, &mut rng, callback)
    } else {
        optimize_with_callback(roster, config, &mut rng, callback)
    };
    progress.finish_and_clear();

    Ok(result?)
}

/// Write the export file (and stdout copy if requested)
fn save_results(
    result: &SearchResult,
    roster: &Roster,
    config: &SearchConfig,
    args: &OptimizeArgs,
) -> Result<()> {
    let export = Export {
        generated_at: Utc::now(),
        parameters: ExportParameters {
            players: roster.players().iter().map(|p| p.name.clone()).collect(),
            num_rounds: config.num_rounds,
            num_fields: config.num_fields,
            num_iterations: config.num_iterations,
            runs: args.runs,
            batch_size: args.batched.then_some(args.batch_size),
            seed: config.seed.unwrap_or_default(),
            weights: config.weights.clone(),
        },
        loss: result.best_loss,
        schedule: schedule_entries(&result.best_schedule, roster),
        statistics: StatisticsReport::new(&result.best_score, roster),
        trace: &result.trace,
    };

    let json = serde_json::to_string_pretty(&export)?;
    write_file(&args.output, &json)?;
    tracing::info!("Saved schedule to {}", args.output.display());

    if args.json {
        println!("{}", json);
    }

    Ok(())
}

/// Print summary to console
fn print_summary(result: &SearchResult, roster: &Roster, args: &OptimizeArgs) {
    println!("\n=== Optimization Complete ===");
    println!("Best loss:    {:.6}", result.best_loss);
    println!("Improvements: {}", result.trace.len());
    println!("Output file:  {}", args.output.display());
    println!();

    for (round, matchups) in result.best_schedule.rounds().enumerate() {
        let labels: Vec<String> = matchups.iter().map(|m| roster.matchup_label(m)).collect();
        println!("Round {:>3}: {}", round + 1, labels.join(" | "));
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Players from --players or --players-file
fn load_roster(args: &OptimizeArgs) -> Result<Roster> {
    let names = match &args.players_file {
        Some(path) => read_player_file(path)?,
        None => args.players.iter().map(|s| s.trim().to_string()).collect(),
    };

    if names.is_empty() {
        anyhow::bail!("No players given; use --players or --players-file");
    }

    Roster::new(names).context("Invalid player list")
}

/// One name per line; blank lines and `#` comments are skipped
fn read_player_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read player file {}", path.display()))?;

    Ok(parse_player_lines(&text))
}

fn parse_player_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load metric weights from a JSON file
fn load_weights(path: &Path) -> Result<MetricWeights> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read weights file {}", path.display()))?;
    let weights = MetricWeights::from_json(&text)
        .with_context(|| format!("Invalid weights in {}", path.display()))?;
    tracing::info!("Loaded weights from {}", path.display());

    Ok(weights)
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Use the given seed, or draw one and log it so the run can be repeated
fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) => s,
        None => {
            let s = rand::random();
            tracing::info!("No seed given, using {}", s);
            s
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

// ============================================================================
// TESTS
// ============================================================================

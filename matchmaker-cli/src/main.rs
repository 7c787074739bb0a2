//! Matchmaker CLI - Command-line interface
//!
//! Commands:
//! - optimize: Search for a low-loss 2v2 schedule and export it as JSON
//! - verify: Check an exported schedule for repeats and double bookings

mod export;
mod optimize;
mod verify;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "matchmaker")]
#[command(about = "2v2 round-robin schedule optimizer")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a low-loss schedule
    Optimize(optimize::OptimizeArgs),
    /// Verify an exported schedule
    Verify(verify::VerifyArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Optimize(args) => optimize::run(args, cli.seed),
        Commands::Verify(args) => verify::run(args),
    }
}

/// RUST_LOG wins unless --verbose is given
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

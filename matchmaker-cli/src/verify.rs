//! Verify command - check an exported schedule
//!
//! Reads the `schedule` array of an `optimize` export back and reports
//! repeated matchups, double bookings and games per player.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use matchmaker_core::{verify_schedule, Roster, VerificationReport};

use crate::export::ImportedSchedule;

#[derive(Args)]
pub struct VerifyArgs {
    /// Schedule JSON written by `optimize`
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Fail unless every player has the same number of games
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let imported = ImportedSchedule::load(&args.input)?;
    let roster = imported.roster()?;
    let schedule = imported.to_schedule(&roster)?;
    tracing::info!(
        "Loaded {} rounds x {} field(s) from {}",
        schedule.num_rounds(),
        schedule.num_fields(),
        args.input.display()
    );

    let report = verify_schedule(&schedule, &roster);
    print_report(&report, &roster);

    if !report.is_valid() {
        anyhow::bail!("Schedule is invalid");
    }
    if args.strict && !report.is_fair() {
        anyhow::bail!(
            "Schedule is unfair: {} to {} games per player",
            report.min_games(),
            report.max_games()
        );
    }

    Ok(())
}

fn print_report(report: &VerificationReport, roster: &Roster) {
    let name = |id| roster.name(id).unwrap_or("?");

    println!("\n=== Schedule Verification ===");
    println!(
        "Matchups: {} total, {} unique",
        report.total_matchups, report.unique_matchups
    );

    for (matchup, count) in &report.duplicates {
        println!("  repeated {}x: {}", count, roster.matchup_label(matchup));
    }
    for booking in &report.double_bookings {
        println!(
            "  round {}: {} on {} fields",
            booking.round + 1,
            name(booking.player),
            booking.fields
        );
    }

    println!("\nGames per player:");
    for (&id, games) in &report.games_per_player {
        println!("  {:<20} {}", name(id), games);
    }

    println!();
    println!("Valid: {}", if report.is_valid() { "yes" } else { "NO" });
    println!(
        "Fair:  {} ({}-{} games)",
        if report.is_fair() { "yes" } else { "no" },
        report.min_games(),
        report.max_games()
    );
}

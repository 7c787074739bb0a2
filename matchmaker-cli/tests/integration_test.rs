//! Integration tests for the matchmaker
//!
//! Tests the full stack: roster, sampler, statistics, batched scoring and search

use std::collections::BTreeSet;

use matchmaker_batch::BatchScorer;
use matchmaker_core::{
    verify_schedule, Matchup, MatchmakerError, MetricKey, MetricWeights, PlayerId, Roster,
    RoundSampler, Schedule,
};
use matchmaker_search::{optimize, optimize_batched, optimize_parallel, SearchConfig};
use matchmaker_stats::{score_schedule, StatisticsReport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn roster(n: usize) -> Roster {
    Roster::new((0..n).map(|i| format!("Player{:02}", i))).unwrap()
}

/// Three rounds on one field over five players, scored by hand
fn fixed_schedule() -> Schedule {
    let rows: [[PlayerId; 4]; 3] = [[0, 1, 2, 3], [0, 2, 1, 4], [0, 1, 3, 4]];
    let matchups = rows
        .iter()
        .map(|&p| Matchup::from_players(p).unwrap())
        .collect();
    Schedule::from_matchups(1, matchups).unwrap()
}

const FIXED_SCHEDULE_LOSS: f64 = 50_499.794_855_663_56;

// ============================================================================
// PRECONDITIONS
// ============================================================================

#[test]
fn test_too_few_players_for_fields() {
    let config = SearchConfig::new(3, 2, 10);
    let err = optimize(&roster(6), &config, &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();

    assert_eq!(
        err,
        MatchmakerError::InsufficientPlayers {
            available: 6,
            required: 8,
            num_fields: 2,
        }
    );
}

#[test]
fn test_exhausted_matchups_fail_with_context() {
    // Four players form only three distinct matchups
    let config = SearchConfig::new(50, 1, 1).with_max_rejections(200);
    let err = optimize(&roster(4), &config, &mut ChaCha8Rng::seed_from_u64(5)).unwrap_err();

    match err {
        MatchmakerError::ScheduleInfeasible {
            round,
            num_rounds,
            num_players,
            used_matchups,
            attempts,
            ..
        } => {
            assert_eq!(round, 3);
            assert_eq!(num_rounds, 50);
            assert_eq!(num_players, 4);
            assert_eq!(used_matchups, 3);
            assert_eq!(attempts, 200);
        }
        other => panic!("expected ScheduleInfeasible, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_names_rejected() {
    assert!(matches!(
        Roster::new(["Al", "Alice", "Bob", "Cy"]),
        Err(MatchmakerError::AmbiguousIdentifier { .. })
    ));
    assert!(matches!(
        Roster::new(["Ann", "Bob", "Ann", "Cy"]),
        Err(MatchmakerError::AmbiguousIdentifier { .. })
    ));
}

#[test]
fn test_unknown_weight_key_rejected() {
    let err = MetricWeights::from_json(r#"{"played-matches": 1.0, "global_break_occurrence_index": 2.0}"#)
        .unwrap_err();
    assert!(matches!(err, MatchmakerError::UnknownMetric(_)));
}

// ============================================================================
// SCHEDULE INVARIANTS
// ============================================================================

#[test]
fn test_sampled_schedule_invariants() {
    let roster = roster(13);
    let sampler = RoundSampler::new(&roster, 3).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    for _ in 0..20 {
        let schedule = sampler.sample_schedule(8, &mut rng).unwrap();
        assert_eq!(schedule.num_rounds(), 8);

        for round in schedule.rounds() {
            assert_eq!(round.len(), 3);
            let players: BTreeSet<PlayerId> = round.iter().flat_map(|m| m.slots()).collect();
            assert_eq!(players.len(), 12, "a player is booked twice in one round");
            assert!(players.iter().all(|&p| (p as usize) < roster.len()));
        }

        let report = verify_schedule(&schedule, &roster);
        assert!(report.is_valid());
        assert_eq!(report.unique_matchups, 24);
    }
}

#[test]
fn test_teams_are_canonical() {
    let a = Matchup::from_players([3, 1, 4, 0]).unwrap();
    let b = Matchup::from_players([0, 4, 1, 3]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.teammate_of(1), Some(3));
    assert!(a.opponents_of(2).is_none());
}

// ============================================================================
// SCORING
// ============================================================================

#[test]
fn test_fixed_schedule_loss_regression() {
    let schedule = fixed_schedule();
    let weights = MetricWeights::default();

    let scalar = score_schedule(&schedule, 5, &weights);
    assert!((scalar.loss - FIXED_SCHEDULE_LOSS).abs() < 1e-6);

    let batched = BatchScorer::new(5, weights)
        .score_schedules(std::slice::from_ref(&schedule))
        .unwrap();
    assert!(batched[0].max_abs_diff(&scalar.global) < 1e-6);
}

#[test]
fn test_report_keys_players_by_name() {
    let roster = Roster::new(["Ann", "Bob", "Cid", "Dee", "Eve"]).unwrap();
    let score = score_schedule(&fixed_schedule(), roster.len(), &MetricWeights::default());
    let report = StatisticsReport::new(&score, &roster);

    let json = serde_json::to_value(&report).unwrap();
    let object = json.as_object().unwrap();
    assert!(object.contains_key("global"));
    assert!(object.contains_key("Eve"));
    assert_eq!(object.len(), 6);
    assert_eq!(
        json["global"]["not-played-with"].as_f64(),
        Some(score.global.get(MetricKey::NotPlayedWith))
    );
}

// ============================================================================
// SEARCH
// ============================================================================

#[test]
fn test_search_is_deterministic_per_seed() {
    let roster = roster(10);
    let config = SearchConfig::new(6, 2, 60);

    let a = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
    let b = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();

    assert_eq!(a.best_schedule, b.best_schedule);
    assert_eq!(a.best_loss, b.best_loss);
    assert_eq!(a.trace, b.trace);
}

#[test]
fn test_six_player_reference_run_is_reproducible() {
    let roster = roster(6);
    let config = SearchConfig::new(10, 1, 100).with_weights(MetricWeights::default());

    let first = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(1234)).unwrap();
    let second = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(1234)).unwrap();

    assert_eq!(first.best_loss.to_bits(), second.best_loss.to_bits());
    // Reference value: any change to a metric formula or to the sampler's draw
    // order must update it deliberately
    assert_eq!(first.best_loss.to_bits(), 0x40e7a0e5f089eb80); // 48391.18561264034
    assert_eq!(first.best_schedule, second.best_schedule);
    assert_eq!(first.best_schedule.num_rounds(), 10);
    // Two sit out each round, yet everyone plays at some point
    assert_eq!(first.best_score.global.get(MetricKey::NotPlayingPlayers), 0.0);
}

#[test]
fn test_search_result_is_valid_and_non_increasing() {
    let roster = roster(9);
    let config = SearchConfig::new(9, 2, 80);
    let result = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();

    assert!(verify_schedule(&result.best_schedule, &roster).is_valid());
    assert!(result.trace.losses.windows(2).all(|w| w[1] < w[0]));
    let rescored = score_schedule(&result.best_schedule, roster.len(), &config.weights);
    assert_eq!(rescored.loss, result.best_loss);
}

#[test]
fn test_parallel_search_is_min_of_seeded_runs() {
    let roster = roster(8);
    let config = SearchConfig::new(5, 1, 30);
    let parallel = optimize_parallel(&roster, &config, 3, 40).unwrap();

    let losses: Vec<f64> = (0..3u64)
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(40 + i);
            optimize(&roster, &config, &mut rng).unwrap().best_loss
        })
        .collect();

    assert_eq!(parallel.run_losses, losses);
    let first_min = losses
        .iter()
        .position(|&l| l == losses.iter().cloned().fold(f64::INFINITY, f64::min))
        .unwrap();
    assert_eq!(parallel.best_run, first_min);
}

#[test]
fn test_batched_search_agrees_with_scalar_search() {
    let roster = roster(9);
    let config = SearchConfig::new(6, 2, 120);

    let scalar = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
    let batched = optimize_batched(&roster, &config, 32, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();

    assert!((scalar.best_loss - batched.best_loss).abs() < 1e-6);
    assert_eq!(batched.iterations, 120);
}

//! Error taxonomy shared by every matchmaker crate

/// Errors raised while building rosters, sampling schedules or loading configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchmakerError {
    #[error("invalid composition: {0}")]
    InvalidComposition(String),

    #[error("ambiguous player identifier '{name}': {reason}")]
    AmbiguousIdentifier { name: String, reason: String },

    #[error(
        "insufficient players: {num_fields} field(s) need at least {required} players, pool has {available}"
    )]
    InsufficientPlayers {
        available: usize,
        required: usize,
        num_fields: usize,
    },

    #[error(
        "schedule infeasible: round {round} of {num_rounds} could not be sampled after {attempts} rejected draws \
         ({num_players} players, {num_fields} field(s), {used_matchups} matchups already used)"
    )]
    ScheduleInfeasible {
        round: usize,
        num_rounds: usize,
        num_fields: usize,
        num_players: usize,
        used_matchups: usize,
        attempts: u32,
    },

    #[error("unknown metric key '{0}'")]
    UnknownMetric(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed schedule: {0}")]
    MalformedSchedule(String),
}

pub type Result<T> = std::result::Result<T, MatchmakerError>;

//! Roster - the validated player pool of one run

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{MatchmakerError, Result};
use crate::player::{Matchup, Player, PlayerId, Team};

/// Key under which global statistics are reported next to player names
pub const RESERVED_REPORT_KEY: &str = "global";

/// Separator between the two player names of a team label
pub const TEAM_SEPARATOR: &str = " & ";

/// Separator between the two team labels of a matchup label
pub const MATCHUP_SEPARATOR: &str = " vs. ";

/// Ordered, validated list of players with dense numeric ids
#[derive(Clone, Debug, Serialize)]
pub struct Roster {
    players: Vec<Player>,
    #[serde(skip)]
    by_name: FxHashMap<String, PlayerId>,
}

impl Roster {
    /// Build a roster, assigning ids in input order
    ///
    /// Fails with `AmbiguousIdentifier` when a name is empty, repeated,
    /// contained in another name, or equal to the reserved report key.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        check_names(&names)?;

        let players: Vec<Player> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(name, i as PlayerId))
            .collect();
        let by_name = players
            .iter()
            .map(|p| (p.name.clone(), p.id))
            .collect();

        Ok(Self { players, by_name })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn name(&self, id: PlayerId) -> Option<&str> {
        self.player(id).map(|p| p.name.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<PlayerId> {
        self.by_name.get(name).copied()
    }

    /// Fail with `InsufficientPlayers` unless every field can be filled
    pub fn check_capacity(&self, num_fields: usize) -> Result<()> {
        if num_fields == 0 {
            return Err(MatchmakerError::InvalidConfig(
                "at least one field is required".to_string(),
            ));
        }
        let required = 4 * num_fields;
        if self.len() < required {
            return Err(MatchmakerError::InsufficientPlayers {
                available: self.len(),
                required,
                num_fields,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Name-based construction
    // ------------------------------------------------------------------------

    fn require_id(&self, name: &str) -> Result<PlayerId> {
        self.id_of(name).ok_or_else(|| {
            MatchmakerError::InvalidComposition(format!("'{}' is not on the roster", name))
        })
    }

    pub fn team_from_names(&self, a: &str, b: &str) -> Result<Team> {
        Team::new(self.require_id(a)?, self.require_id(b)?)
    }

    /// Build `[0] & [1]` against `[2] & [3]`
    pub fn matchup_from_names(&self, names: [&str; 4]) -> Result<Matchup> {
        let t1 = self.team_from_names(names[0], names[1])?;
        let t2 = self.team_from_names(names[2], names[3])?;
        Matchup::new(t1, t2)
    }

    // ------------------------------------------------------------------------
    // Canonical labels
    // ------------------------------------------------------------------------

    fn display_name(&self, id: PlayerId) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => format!("#{}", id),
        }
    }

    /// Canonical team identifier: names sorted lexicographically, joined
    pub fn team_label(&self, team: &Team) -> String {
        let [a, b] = team.players();
        let mut names = [self.display_name(a), self.display_name(b)];
        names.sort();
        names.join(TEAM_SEPARATOR)
    }

    /// Canonical matchup identifier: team labels sorted, joined
    pub fn matchup_label(&self, matchup: &Matchup) -> String {
        let mut labels = [
            self.team_label(&matchup.team_a()),
            self.team_label(&matchup.team_b()),
        ];
        labels.sort();
        labels.join(MATCHUP_SEPARATOR)
    }
}

/// Number of distinct matchups a pool of `n` players can form (`C(n, 4) * 3`)
///
/// Saturates at `u64::MAX` for pools too large to count exactly.
pub fn max_unique_matchups(n: usize) -> u64 {
    if n < 4 {
        return 0;
    }
    let n = n as u128;
    (1..4)
        .try_fold(n, |acc, k| acc.checked_mul(n - k))
        .and_then(|product| u64::try_from(product / 24 * 3).ok())
        .unwrap_or(u64::MAX)
}

fn check_names(names: &[String]) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(ambiguous(name, "empty names cannot identify a player"));
        }
        if name == RESERVED_REPORT_KEY {
            return Err(ambiguous(name, "name is reserved for global statistics"));
        }
        for (j, other) in names.iter().enumerate() {
            if i == j {
                continue;
            }
            if name == other {
                return Err(ambiguous(name, "name appears more than once"));
            }
            if other.contains(name.as_str()) {
                return Err(ambiguous(
                    name,
                    &format!("name is contained in '{}'", other),
                ));
            }
        }
    }
    Ok(())
}

fn ambiguous(name: &str, reason: &str) -> MatchmakerError {
    MatchmakerError::AmbiguousIdentifier {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

//! Player, team and matchup value types
//!
//! Teams and matchups are stored in canonical order (ascending player ids,
//! then ascending teams), so two values describing the same pairing compare
//! equal and hash identically regardless of construction order.

use serde::Serialize;

use crate::error::{MatchmakerError, Result};

/// Dense numeric player identifier, assigned by the roster (0..N)
pub type PlayerId = u32;

/// A named participant
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Player {
    /// Display name, used verbatim as the player's identity
    pub name: String,
    /// Dense id, stable for one roster
    pub id: PlayerId,
}

impl Player {
    pub fn new(name: impl Into<String>, id: PlayerId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

// ============================================================================
// TEAM
// ============================================================================

/// Unordered pair of two distinct players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Team {
    players: [PlayerId; 2],
}

impl Team {
    /// Build a team; fails if both slots hold the same player
    pub fn new(a: PlayerId, b: PlayerId) -> Result<Self> {
        if a == b {
            return Err(MatchmakerError::InvalidComposition(format!(
                "team needs two distinct players, got player {} twice",
                a
            )));
        }
        Ok(Self {
            players: [a.min(b), a.max(b)],
        })
    }

    /// Both players, ascending
    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players[0] == player || self.players[1] == player
    }

    /// The other member of the team, if `player` belongs to it
    pub fn partner_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.players {
            [a, b] if a == player => Some(b),
            [a, b] if b == player => Some(a),
            _ => None,
        }
    }

    /// Dense pair code (`lo * num_players + hi`), used by array-based scorers
    pub fn pair_code(&self, num_players: usize) -> usize {
        self.players[0] as usize * num_players + self.players[1] as usize
    }
}

// ============================================================================
// MATCHUP
// ============================================================================

/// Two teams facing each other on one field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Matchup {
    team_a: Team,
    team_b: Team,
}

impl Matchup {
    /// Build a matchup; the teams must not share a player
    pub fn new(t1: Team, t2: Team) -> Result<Self> {
        if t1.players().iter().any(|&p| t2.contains(p)) {
            return Err(MatchmakerError::InvalidComposition(format!(
                "matchup needs four distinct players, teams {:?} and {:?} overlap",
                t1.players(),
                t2.players()
            )));
        }
        let (team_a, team_b) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        Ok(Self { team_a, team_b })
    }

    /// Build from four players: `[0, 1]` against `[2, 3]`
    pub fn from_players(players: [PlayerId; 4]) -> Result<Self> {
        let t1 = Team::new(players[0], players[1])?;
        let t2 = Team::new(players[2], players[3])?;
        Self::new(t1, t2)
    }

    pub fn team_a(&self) -> Team {
        self.team_a
    }

    pub fn team_b(&self) -> Team {
        self.team_b
    }

    pub fn teams(&self) -> [Team; 2] {
        [self.team_a, self.team_b]
    }

    /// Player slots in field order: `[team_a.0, team_a.1, team_b.0, team_b.1]`
    pub fn slots(&self) -> [PlayerId; 4] {
        let [a0, a1] = self.team_a.players();
        let [b0, b1] = self.team_b.players();
        [a0, a1, b0, b1]
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.team_a.contains(player) || self.team_b.contains(player)
    }

    /// Teammate of `player`, or `None` if the player is not on this field
    pub fn teammate_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.team_a
            .partner_of(player)
            .or_else(|| self.team_b.partner_of(player))
    }

    /// The team `player` plays against, or `None` if the player is not on this field
    ///
    /// Membership is tested on the set of player ids, never on joined labels,
    /// so names that contain each other cannot be confused.
    pub fn opponents_of(&self, player: PlayerId) -> Option<Team> {
        if self.team_a.contains(player) {
            Some(self.team_b)
        } else if self.team_b.contains(player) {
            Some(self.team_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_is_symmetric() {
        let ab = Team::new(3, 1).unwrap();
        let ba = Team::new(1, 3).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.players(), [1, 3]);
    }

    #[test]
    fn test_team_rejects_same_player() {
        assert!(matches!(
            Team::new(2, 2),
            Err(MatchmakerError::InvalidComposition(_))
        ));
    }

    #[test]
    fn test_matchup_is_symmetric() {
        let t1 = Team::new(0, 1).unwrap();
        let t2 = Team::new(2, 3).unwrap();
        assert_eq!(Matchup::new(t1, t2).unwrap(), Matchup::new(t2, t1).unwrap());
        assert_eq!(
            Matchup::from_players([3, 2, 1, 0]).unwrap(),
            Matchup::from_players([0, 1, 2, 3]).unwrap()
        );
    }

    #[test]
    fn test_matchup_rejects_overlap() {
        let t1 = Team::new(0, 1).unwrap();
        let t2 = Team::new(1, 2).unwrap();
        assert!(Matchup::new(t1, t2).is_err());
    }

    #[test]
    fn test_teammate_and_opponents() {
        let m = Matchup::from_players([4, 0, 2, 7]).unwrap();
        assert_eq!(m.teammate_of(0), Some(4));
        assert_eq!(m.teammate_of(7), Some(2));
        assert_eq!(m.teammate_of(5), None);
        assert_eq!(m.opponents_of(4), Some(Team::new(2, 7).unwrap()));
        assert_eq!(m.opponents_of(2), Some(Team::new(0, 4).unwrap()));
        assert_eq!(m.opponents_of(1), None);
    }

    #[test]
    fn test_slots_follow_canonical_order() {
        let m = Matchup::from_players([5, 4, 1, 0]).unwrap();
        assert_eq!(m.slots(), [0, 1, 4, 5]);
    }
}

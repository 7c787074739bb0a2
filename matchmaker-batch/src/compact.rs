//! Dense session arrays
//!
//! A batch of schedules with equal shape is packed into one
//! `Array4<u32>` of shape `(sessions, rounds, fields, SLOTS)`. Slot order
//! inside a field is `[team_a.0, team_a.1, team_b.0, team_b.1]`, the order
//! of `Matchup::slots`.

use ndarray::{Array2, Array4, ArrayView3, Axis};

use matchmaker_core::{MatchmakerError, Matchup, Result, Schedule};

/// Player slots per field
pub const SLOTS: usize = 4;

/// Teammate slot of each slot
pub const PARTNER_SLOT: [usize; SLOTS] = [1, 0, 3, 2];

/// First slot of the opposing team for each slot
pub const OPPONENT_SLOT: [usize; SLOTS] = [2, 2, 0, 0];

/// Pack schedules into a session array; all must share rounds and fields
pub fn to_tensor(schedules: &[Schedule]) -> Result<Array4<u32>> {
    let (num_rounds, num_fields) = match schedules.first() {
        Some(s) => (s.num_rounds(), s.num_fields()),
        None => return Ok(Array4::zeros((0, 0, 0, SLOTS))),
    };

    let mut tensor = Array4::zeros((schedules.len(), num_rounds, num_fields, SLOTS));
    for (s, schedule) in schedules.iter().enumerate() {
        if schedule.num_rounds() != num_rounds || schedule.num_fields() != num_fields {
            return Err(MatchmakerError::MalformedSchedule(format!(
                "session {} has shape {}x{}, batch expects {}x{}",
                s,
                schedule.num_rounds(),
                schedule.num_fields(),
                num_rounds,
                num_fields
            )));
        }
        for (i, matchup) in schedule.matchups().iter().enumerate() {
            let (r, f) = (i / num_fields, i % num_fields);
            for (slot, player) in matchup.slots().into_iter().enumerate() {
                tensor[[s, r, f, slot]] = player;
            }
        }
    }
    Ok(tensor)
}

/// Rebuild the schedule of one session
pub fn session_schedule(session: ArrayView3<u32>) -> Result<Schedule> {
    let (_, num_fields, slots) = session.dim();
    check_slots(slots)?;

    let mut matchups = Vec::with_capacity(session.len() / SLOTS);
    for round in session.axis_iter(Axis(0)) {
        for field in round.axis_iter(Axis(0)) {
            matchups.push(Matchup::from_players([field[0], field[1], field[2], field[3]])?);
        }
    }
    Schedule::from_matchups(num_fields.max(1), matchups)
}

/// Presence mask of shape `(num_players, rounds)`
///
/// Fails if a player id is out of range or a player fills two slots of
/// the same round.
pub fn presence_mask(session: ArrayView3<u32>, num_players: usize) -> Result<Array2<u8>> {
    let (num_rounds, _, slots) = session.dim();
    check_slots(slots)?;

    let mut mask = Array2::<u8>::zeros((num_players, num_rounds));
    for (r, round) in session.axis_iter(Axis(0)).enumerate() {
        for &player in round.iter() {
            let p = player as usize;
            if p >= num_players {
                return Err(MatchmakerError::MalformedSchedule(format!(
                    "player id {} in round {} is outside the roster of {}",
                    player, r, num_players
                )));
            }
            if mask[[p, r]] != 0 {
                return Err(MatchmakerError::MalformedSchedule(format!(
                    "player {} fills two slots in round {}",
                    player, r
                )));
            }
            mask[[p, r]] = 1;
        }
    }
    Ok(mask)
}

fn check_slots(slots: usize) -> Result<()> {
    if slots != SLOTS {
        return Err(MatchmakerError::MalformedSchedule(format!(
            "fields must have {} slots, got {}",
            SLOTS, slots
        )));
    }
    Ok(())
}

//! Match-scoped roster state.
//!
//! One `RosterState` exists per match and tracks, for each team, the players
//! currently on the pitch together with their normalized position values.
//! The encoder mutates it when it sees lineup, tactical-shift and
//! substitution events, and the roster-aware feature parsers read it while
//! encoding every other event.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, TokenizeError};

/// Number of distinct StatsBomb position ids; positions normalize to
/// `id / 25`.
pub const NUM_POSITIONS: i64 = 25;

/// Normalize a StatsBomb position id. Unknown ids encode as 0 (absent), the
/// same convention as every other categorical feature.
pub fn normalized_position(position_id: i64) -> f64 {
    if (1..=NUM_POSITIONS).contains(&position_id) {
        position_id as f64 / NUM_POSITIONS as f64
    } else {
        0.0
    }
}

/// Per-match mapping of `team id -> {player id -> normalized position}`.
///
/// Teams are kept in a `BTreeMap` so the team-rank feature (rank of the team
/// id among the sorted team ids) is deterministic without re-sorting.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RosterState {
    teams: BTreeMap<i64, HashMap<i64, f64>>,
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Wholesale-replace one team's fielded players, as a `starting_xi` or
    /// `tactical_shift` event does. Entries are `(player id, position id)`.
    pub fn apply_lineup(&mut self, team_id: i64, lineup: &[(i64, i64)]) {
        let players = lineup
            .iter()
            .map(|&(player_id, position_id)| (player_id, normalized_position(position_id)))
            .collect();
        self.teams.insert(team_id, players);
    }

    /// Phase one of a substitution: the incoming player joins the roster
    /// under the outgoing player's stored position value. The outgoing entry
    /// stays in place so the substitution event's own features (which refer
    /// to the outgoing player) still resolve.
    ///
    /// When the replacement id equals the outgoing id, phase two removes the
    /// player outright; that matches feeds where a player leaves without a
    /// replacement.
    pub fn stage_substitution(&mut self, team_id: i64, out_id: i64, in_id: i64) -> Result<()> {
        let players = self
            .teams
            .get_mut(&team_id)
            .ok_or(TokenizeError::TeamNotInRoster { team_id })?;
        let position = *players
            .get(&out_id)
            .ok_or(TokenizeError::PlayerNotInRoster { team_id, player_id: out_id })?;
        players.insert(in_id, position);
        Ok(())
    }

    /// Phase two of a substitution: drop the outgoing player, after the
    /// substitution event itself has been encoded.
    pub fn complete_substitution(&mut self, team_id: i64, out_id: i64) {
        if let Some(players) = self.teams.get_mut(&team_id) {
            players.remove(&out_id);
        }
    }

    /// Rank of a team id among the sorted roster team ids, normalized by the
    /// team count.
    pub fn team_rank(&self, team_id: i64) -> Result<f64> {
        let rank = self
            .teams
            .keys()
            .position(|&id| id == team_id)
            .ok_or(TokenizeError::TeamNotInRoster { team_id })?;
        Ok((rank + 1) as f64 / self.teams.len() as f64)
    }

    /// Stored normalized position of a fielded player.
    pub fn position(&self, team_id: i64, player_id: i64) -> Result<f64> {
        let players = self
            .teams
            .get(&team_id)
            .ok_or(TokenizeError::TeamNotInRoster { team_id })?;
        players
            .get(&player_id)
            .copied()
            .ok_or(TokenizeError::PlayerNotInRoster { team_id, player_id })
    }

    /// Direct access for tests and for callers that seed a roster from an
    /// external lineup source. Values are already-normalized positions.
    pub fn set_team(&mut self, team_id: i64, players: HashMap<i64, f64>) {
        self.teams.insert(team_id, players);
    }

    pub fn team(&self, team_id: i64) -> Option<&HashMap<i64, f64>> {
        self.teams.get(&team_id)
    }
}

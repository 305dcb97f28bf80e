//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::{RosterError, RosterResult};
use crate::identity::models::PlayerId;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournament player ID type
pub type TournamentPlayerId = i64;

/// A named competition context.
///
/// `players` is the tournament roster. It is a projection of the
/// tournament's [`TournamentPlayer`] records, ordered by player id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: String,
    /// Target team size
    pub teams_n: i32,
    pub created_at: DateTime<Utc>,
    pub players: Vec<PlayerId>,
}

/// Tournament-scoped identity of a player.
///
/// Exactly one exists per (player, tournament) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentPlayer {
    pub id: TournamentPlayerId,
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub created_at: DateTime<Utc>,
}

/// Tournament creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub teams_n: i32,
    #[serde(default)]
    pub initial_players: BTreeSet<PlayerId>,
}

impl NewTournament {
    /// Create a tournament request with an empty initial roster
    pub fn new(name: impl Into<String>, description: impl Into<String>, teams_n: i32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            teams_n,
            initial_players: BTreeSet::new(),
        }
    }

    /// Add players to register alongside creation
    pub fn with_players(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.initial_players.extend(players);
        self
    }

    /// Trim the name and check required fields and team size
    pub fn validate(mut self) -> RosterResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(RosterError::MissingField("name"));
        }
        validate_teams_n(self.teams_n)?;
        Ok(self)
    }
}

/// Partial tournament update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub teams_n: Option<i32>,
}

impl TournamentChanges {
    /// Check the fields that are present
    pub fn validate(mut self) -> RosterResult<Self> {
        if let Some(name) = self.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RosterError::MissingField("name"));
            }
            self.name = Some(name);
        }
        if let Some(teams_n) = self.teams_n {
            validate_teams_n(teams_n)?;
        }
        Ok(self)
    }
}

fn validate_teams_n(teams_n: i32) -> RosterResult<()> {
    if teams_n < 1 {
        return Err(RosterError::InvalidTeamSize(teams_n));
    }
    Ok(())
}

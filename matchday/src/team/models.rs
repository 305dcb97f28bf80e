//! Team data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::event::models::EventId;
use crate::tournament::models::TournamentPlayerId;

/// Team ID type
pub type TeamId = i64;

/// A named grouping of tournament players within one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub event_id: EventId,
    pub name: String,
    pub players: BTreeSet<TournamentPlayerId>,
}

/// One group passed to team assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub players: BTreeSet<TournamentPlayerId>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>, players: impl IntoIterator<Item = TournamentPlayerId>) -> Self {
        Self {
            name: name.into(),
            players: players.into_iter().collect(),
        }
    }
}

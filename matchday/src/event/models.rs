//! Event data models and the event status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::auth::models::AccountId;
use crate::errors::{RosterError, RosterResult};
use crate::tournament::models::{TournamentId, TournamentPlayerId};

/// Event ID type
pub type EventId = i64;

/// Event status
///
/// Progresses `Open -> InProgress -> Completed`, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Accepting participants
    #[default]
    Open,
    /// Matches being played
    InProgress,
    /// Finished
    Completed,
}

impl EventStatus {
    /// Next status. `Completed` stays `Completed`.
    pub fn advance(self) -> Self {
        match self {
            EventStatus::Open => EventStatus::InProgress,
            EventStatus::InProgress => EventStatus::Completed,
            EventStatus::Completed => EventStatus::Completed,
        }
    }

    /// Whether the status is terminal
    pub fn is_terminal(self) -> bool {
        self == EventStatus::Completed
    }

    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::InProgress => "in_progress",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for EventStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(EventStatus::Open),
            "in_progress" => Ok(EventStatus::InProgress),
            "completed" => Ok(EventStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A scheduled instance within a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub sport: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: EventStatus,
    pub created_by: AccountId,
    pub created_at: DateTime<Utc>,
    /// Admitted tournament players
    pub players: BTreeSet<TournamentPlayerId>,
}

/// Event creation request.
///
/// Dates are optional here so that a missing date can be reported as a
/// missing field rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub tournament_id: TournamentId,
    pub name: String,
    pub sport: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: AccountId,
}

/// Validated event ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub tournament_id: TournamentId,
    pub name: String,
    pub sport: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: AccountId,
}

impl NewEvent {
    /// Check required fields and the date range
    ///
    /// # Errors
    ///
    /// * `RosterError::MissingField` - Blank name or sport, or a missing date
    /// * `RosterError::InvalidRange` - End date before start date
    pub fn validate(self) -> RosterResult<EventDraft> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RosterError::MissingField("name"));
        }
        let sport = self.sport.trim().to_string();
        if sport.is_empty() {
            return Err(RosterError::MissingField("sport"));
        }
        let start_date = self.start_date.ok_or(RosterError::MissingField("start_date"))?;
        let end_date = self.end_date.ok_or(RosterError::MissingField("end_date"))?;
        if end_date < start_date {
            return Err(RosterError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(EventDraft {
            tournament_id: self.tournament_id,
            name,
            sport,
            start_date,
            end_date,
            created_by: self.created_by,
        })
    }
}

//! Roster error types shared by the tournament, event and team managers.

use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::event::models::EventId;
use crate::identity::models::PlayerId;
use crate::tournament::models::{TournamentId, TournamentPlayerId};

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Player,
    Tournament,
    TournamentPlayer,
    Event,
    Team,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Account => "Account",
            Entity::Player => "Player",
            Entity::Tournament => "Tournament",
            Entity::TournamentPlayer => "Tournament player",
            Entity::Event => "Event",
            Entity::Team => "Team",
        };
        f.write_str(name)
    }
}

/// Coarse error category, used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: missing field, bad date range, duplicate event name
    Validation,
    /// A referenced record does not exist
    NotFound,
    /// A uniqueness rule was violated
    Conflict,
    /// A membership rule was violated
    Membership,
    /// Storage failure
    Internal,
}

/// Roster errors
#[derive(Debug, Error)]
pub enum RosterError {
    /// Required field missing or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// End date before start date
    #[error("Invalid date range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Tournament team size below 1
    #[error("Invalid team size: {0} (must be at least 1)")]
    InvalidTeamSize(i32),

    /// Unique name already taken (team names are unique per event)
    #[error("{entity} name already exists: {name}")]
    DuplicateName { entity: Entity, name: String },

    /// Referenced record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },

    /// Unique constraint violated on insert
    #[error("Unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    /// Caller has no tournament player record for the tournament
    #[error("Player {player_id} is not registered to tournament {tournament_id}")]
    NotRegistered {
        player_id: PlayerId,
        tournament_id: TournamentId,
    },

    /// Tournament player from another tournament
    #[error("Tournament player {tournament_player_id} does not belong to tournament {tournament_id}")]
    CrossTournamentReference {
        tournament_player_id: TournamentPlayerId,
        tournament_id: TournamentId,
    },

    /// Team larger than the tournament allows
    #[error("Team '{team}' has {size} players, tournament allows at most {limit}")]
    TeamSizeExceeded {
        team: String,
        size: usize,
        limit: i32,
    },

    /// Team member not admitted to the event
    #[error("Tournament player {tournament_player_id} is not a participant of event {event_id}")]
    NotEventParticipant {
        tournament_player_id: TournamentPlayerId,
        event_id: EventId,
    },

    /// Same tournament player placed in two teams of one assembly
    #[error("Tournament player {0} appears in more than one team")]
    DuplicateTeamMember(TournamentPlayerId),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

impl RosterError {
    /// Shorthand for a not-found error
    pub fn not_found(entity: Entity, id: i64) -> Self {
        RosterError::NotFound { entity, id }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RosterError::MissingField(_)
            | RosterError::InvalidRange { .. }
            | RosterError::InvalidTeamSize(_) => ErrorKind::Validation,
            // Event and team names are validated like any other field; tournament names
            // and account emails are identity and surface as conflicts.
            RosterError::DuplicateName { entity, .. } => match entity {
                Entity::Event | Entity::Team => ErrorKind::Validation,
                _ => ErrorKind::Conflict,
            },
            RosterError::NotFound { .. } => ErrorKind::NotFound,
            RosterError::UniqueConstraintViolation(_) | RosterError::NotRegistered { .. } => {
                ErrorKind::Conflict
            }
            RosterError::CrossTournamentReference { .. }
            | RosterError::TeamSizeExceeded { .. }
            | RosterError::NotEventParticipant { .. }
            | RosterError::DuplicateTeamMember(_) => ErrorKind::Membership,
            RosterError::Database(_) | RosterError::Timeout(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            RosterError::Database(_) => "Internal server error".to_string(),
            RosterError::Timeout(_) => "Service temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<TimeoutError> for RosterError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => RosterError::Timeout(duration),
            TimeoutError::Database(e) => RosterError::Database(e),
        }
    }
}

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_kind_depends_on_entity() {
        let event = RosterError::DuplicateName {
            entity: Entity::Event,
            name: "Finals".to_string(),
        };
        let tournament = RosterError::DuplicateName {
            entity: Entity::Tournament,
            name: "Ranking".to_string(),
        };
        assert_eq!(event.kind(), ErrorKind::Validation);
        assert_eq!(tournament.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_client_message_sanitizes_database_errors() {
        let err = RosterError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_not_found_message() {
        let err = RosterError::not_found(Entity::TournamentPlayer, 42);
        assert_eq!(err.to_string(), "Tournament player not found: 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_timeout_conversion() {
        let err: RosterError = TimeoutError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, RosterError::Timeout(d) if d.as_secs() == 5));
    }
}

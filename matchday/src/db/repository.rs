//! Repository trait definitions for testability and dependency injection.
//!
//! Each mutating method is one atomic unit of work: implementations either
//! apply all of its effects or none. [`PgRepository`](super::PgRepository)
//! backs them with PostgreSQL transactions and row locks;
//! [`MemoryRepository`](super::MemoryRepository) with a single async mutex.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::auth::models::{Account, AccountCredentials, AccountId, NewAccount};
use crate::errors::RosterResult;
use crate::event::models::{Event, EventDraft, EventId};
use crate::identity::models::{Player, PlayerId};
use crate::team::models::{NewTeam, Team};
use crate::tournament::models::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
    TournamentPlayerId,
};

/// Account and player storage
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert an account. Duplicate email fails with `DuplicateName`.
    async fn create_account(&self, account: &NewAccount) -> RosterResult<Account>;

    /// Delete an account and everything it owns
    async fn delete_account(&self, account_id: AccountId) -> RosterResult<()>;

    /// Find account by ID
    async fn find_account(&self, account_id: AccountId) -> RosterResult<Option<Account>>;

    /// Find account and password hash by normalized email
    async fn find_credentials(&self, email: &str) -> RosterResult<Option<AccountCredentials>>;

    /// Update name and/or password hash
    async fn update_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> RosterResult<Account>;

    /// Insert the player owned by an account.
    /// A second player for the same account fails with `UniqueConstraintViolation`.
    async fn insert_player(&self, account_id: AccountId) -> RosterResult<Player>;

    /// Find the player owned by an account
    async fn find_player_by_account(&self, account_id: AccountId) -> RosterResult<Option<Player>>;
}

/// Tournament and tournament roster storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Insert a tournament and register its initial players in the same unit of work
    async fn insert_tournament(&self, tournament: &NewTournament) -> RosterResult<Tournament>;

    /// Get tournament by ID
    async fn get_tournament(&self, tournament_id: TournamentId) -> RosterResult<Tournament>;

    /// List tournaments ordered by ID
    async fn list_tournaments(&self) -> RosterResult<Vec<Tournament>>;

    /// Apply a partial update
    async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        changes: &TournamentChanges,
    ) -> RosterResult<Tournament>;

    /// Delete a tournament with its roster, events and teams
    async fn delete_tournament(&self, tournament_id: TournamentId) -> RosterResult<()>;

    /// Create or reuse the tournament player of each player.
    ///
    /// This is the only write path for tournament membership. Returns one
    /// record per requested player, ordered by player ID.
    async fn register_players(
        &self,
        tournament_id: TournamentId,
        players: &BTreeSet<PlayerId>,
    ) -> RosterResult<Vec<TournamentPlayer>>;

    /// Players registered to the tournament, ordered by ID
    async fn roster(&self, tournament_id: TournamentId) -> RosterResult<Vec<Player>>;

    /// Tournament player records, ordered by ID
    async fn tournament_players(
        &self,
        tournament_id: TournamentId,
    ) -> RosterResult<Vec<TournamentPlayer>>;

    /// Find the tournament player of one player
    async fn find_tournament_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> RosterResult<Option<TournamentPlayer>>;
}

/// Event storage
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert an event in the `open` status
    async fn insert_event(&self, event: &EventDraft) -> RosterResult<Event>;

    /// Get event by ID, with its participants
    async fn get_event(&self, event_id: EventId) -> RosterResult<Event>;

    /// List events ordered by ID, optionally for one tournament
    async fn list_events(&self, tournament_id: Option<TournamentId>) -> RosterResult<Vec<Event>>;

    /// Delete an event with its participants and teams
    async fn delete_event(&self, event_id: EventId) -> RosterResult<()>;

    /// Move the event status one step forward
    async fn advance_event(&self, event_id: EventId) -> RosterResult<Event>;

    /// Flip the event membership of each requested tournament player
    async fn toggle_event_players(
        &self,
        event_id: EventId,
        players: &BTreeSet<TournamentPlayerId>,
    ) -> RosterResult<Event>;
}

/// Team storage
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Check and insert teams for an event, in input order
    async fn insert_teams(&self, event_id: EventId, teams: &[NewTeam]) -> RosterResult<Vec<Team>>;

    /// Teams of an event ordered by ID
    async fn list_teams(&self, event_id: EventId) -> RosterResult<Vec<Team>>;
}

/// Complete storage backend
#[async_trait]
pub trait Repository:
    AccountRepository + TournamentRepository + EventRepository + TeamRepository
{
    /// Check that storage is reachable
    async fn health_check(&self) -> RosterResult<()>;
}

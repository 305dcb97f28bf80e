//! Tournament manager: tournament CRUD and the tournament roster.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::models::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
};
use crate::db::Repository;
use crate::errors::{Entity, RosterError, RosterResult};
use crate::identity::models::{Player, PlayerId};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn Repository>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create a tournament and register its initial players in one unit of work
    ///
    /// # Errors
    ///
    /// * `RosterError::MissingField` - Blank name
    /// * `RosterError::InvalidTeamSize` - `teams_n` below 1
    /// * `RosterError::DuplicateName` - Name already taken
    /// * `RosterError::NotFound` - An initial player does not exist
    pub async fn create_tournament(&self, request: NewTournament) -> RosterResult<Tournament> {
        let request = request.validate()?;
        let tournament = self.repo.insert_tournament(&request).await?;

        log::info!(
            "Created tournament {} '{}' with {} players",
            tournament.id,
            tournament.name,
            tournament.players.len()
        );
        Ok(tournament)
    }

    /// Register one player. Idempotent: an existing record is returned unchanged.
    pub async fn register(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> RosterResult<TournamentPlayer> {
        let records = self
            .repo
            .register_players(tournament_id, &BTreeSet::from([player_id]))
            .await?;

        let record = records
            .into_iter()
            .next()
            .ok_or(RosterError::not_found(Entity::TournamentPlayer, player_id))?;

        log::info!(
            "Registered player {} to tournament {} as tournament player {}",
            player_id,
            tournament_id,
            record.id
        );
        Ok(record)
    }

    /// Register a batch of players. Additive only: nobody is removed.
    pub async fn update_tournament_players(
        &self,
        tournament_id: TournamentId,
        players: BTreeSet<PlayerId>,
    ) -> RosterResult<Tournament> {
        let records = self.repo.register_players(tournament_id, &players).await?;
        log::info!(
            "Registered {} players to tournament {}",
            records.len(),
            tournament_id
        );
        self.repo.get_tournament(tournament_id).await
    }

    /// Players registered to a tournament, ordered by player id
    pub async fn roster(&self, tournament_id: TournamentId) -> RosterResult<Vec<Player>> {
        self.repo.roster(tournament_id).await
    }

    /// Tournament player records of a tournament
    pub async fn tournament_players(
        &self,
        tournament_id: TournamentId,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        self.repo.tournament_players(tournament_id).await
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> RosterResult<Tournament> {
        self.repo.get_tournament(tournament_id).await
    }

    pub async fn list_tournaments(&self) -> RosterResult<Vec<Tournament>> {
        self.repo.list_tournaments().await
    }

    /// Update name, description and/or team size
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        changes: TournamentChanges,
    ) -> RosterResult<Tournament> {
        let changes = changes.validate()?;
        let tournament = self.repo.update_tournament(tournament_id, &changes).await?;
        log::info!("Updated tournament {}", tournament_id);
        Ok(tournament)
    }

    /// Delete a tournament with its roster, events and teams
    pub async fn delete_tournament(&self, tournament_id: TournamentId) -> RosterResult<()> {
        self.repo.delete_tournament(tournament_id).await?;
        log::info!("Deleted tournament {}", tournament_id);
        Ok(())
    }
}

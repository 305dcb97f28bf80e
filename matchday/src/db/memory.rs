//! In-memory repository.
//!
//! Holds every table behind one async mutex, so each repository call is
//! serialized and atomic the way a PostgreSQL transaction with row locks is.
//! Used by the test suites and by `matchday_server --in-memory`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

use super::repository::{
    AccountRepository, EventRepository, Repository, TeamRepository, TournamentRepository,
};
use crate::auth::models::{Account, AccountCredentials, AccountId, NewAccount};
use crate::errors::{Entity, RosterError, RosterResult};
use crate::event::models::{Event, EventDraft, EventId, EventStatus};
use crate::identity::models::{Player, PlayerId};
use crate::membership::{self, TogglePlan};
use crate::team::assembler;
use crate::team::models::{NewTeam, Team, TeamId};
use crate::tournament::models::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
    TournamentPlayerId,
};

#[derive(Debug, Clone)]
struct AccountRow {
    account: Account,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct TournamentRow {
    id: TournamentId,
    name: String,
    description: String,
    teams_n: i32,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    account_ids: Sequence,
    player_ids: Sequence,
    tournament_ids: Sequence,
    tournament_player_ids: Sequence,
    event_ids: Sequence,
    team_ids: Sequence,

    accounts: BTreeMap<AccountId, AccountRow>,
    /// player id -> owning account id
    players: BTreeMap<PlayerId, AccountId>,
    tournaments: BTreeMap<TournamentId, TournamentRow>,
    tournament_players: BTreeMap<TournamentPlayerId, TournamentPlayer>,
    events: BTreeMap<EventId, Event>,
    teams: BTreeMap<TeamId, Team>,
}

impl MemoryState {
    fn player(&self, player_id: PlayerId) -> Option<Player> {
        let account_id = *self.players.get(&player_id)?;
        let row = self.accounts.get(&account_id)?;
        Some(Player {
            id: player_id,
            account_id,
            name: row.account.name.clone(),
        })
    }

    fn tournament(&self, tournament_id: TournamentId) -> RosterResult<Tournament> {
        let row = self
            .tournaments
            .get(&tournament_id)
            .ok_or(RosterError::not_found(Entity::Tournament, tournament_id))?;

        let players: BTreeSet<PlayerId> = self
            .records_of(tournament_id)
            .map(|record| record.player_id)
            .collect();

        Ok(Tournament {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            teams_n: row.teams_n,
            created_at: row.created_at,
            players: players.into_iter().collect(),
        })
    }

    fn records_of(&self, tournament_id: TournamentId) -> impl Iterator<Item = &TournamentPlayer> {
        self.tournament_players
            .values()
            .filter(move |record| record.tournament_id == tournament_id)
    }

    fn name_taken(&self, name: &str, except: Option<TournamentId>) -> bool {
        self.tournaments
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }

    fn register(
        &mut self,
        tournament_id: TournamentId,
        players: &BTreeSet<PlayerId>,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        if !self.tournaments.contains_key(&tournament_id) {
            return Err(RosterError::not_found(Entity::Tournament, tournament_id));
        }
        if let Some(&missing) = players.iter().find(|id| !self.players.contains_key(*id)) {
            return Err(RosterError::not_found(Entity::Player, missing));
        }

        let mut records = Vec::with_capacity(players.len());
        for &player_id in players {
            let existing = self
                .records_of(tournament_id)
                .find(|record| record.player_id == player_id)
                .cloned();

            let record = match existing {
                Some(record) => record,
                None => {
                    let record = TournamentPlayer {
                        id: self.tournament_player_ids.next(),
                        player_id,
                        tournament_id,
                        created_at: Utc::now(),
                    };
                    self.tournament_players.insert(record.id, record.clone());
                    record
                }
            };
            records.push(record);
        }
        Ok(records)
    }

    fn remove_events(&mut self, doomed: &BTreeSet<EventId>) {
        self.events.retain(|id, _| !doomed.contains(id));
        self.teams.retain(|_, team| !doomed.contains(&team.event_id));
    }

    fn remove_tournament_players(&mut self, doomed: &BTreeSet<TournamentPlayerId>) {
        self.tournament_players.retain(|id, _| !doomed.contains(id));
        for event in self.events.values_mut() {
            event.players.retain(|id| !doomed.contains(id));
        }
        for team in self.teams.values_mut() {
            team.players.retain(|id| !doomed.contains(id));
        }
    }

    fn event_mut(&mut self, event_id: EventId) -> RosterResult<&mut Event> {
        self.events
            .get_mut(&event_id)
            .ok_or(RosterError::not_found(Entity::Event, event_id))
    }
}

/// Repository keeping all state in process memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn create_account(&self, new: &NewAccount) -> RosterResult<Account> {
        let mut state = self.state.lock().await;

        if state.accounts.values().any(|row| row.account.email == new.email) {
            return Err(RosterError::DuplicateName {
                entity: Entity::Account,
                name: new.email.clone(),
            });
        }

        let account = Account {
            id: state.account_ids.next(),
            email: new.email.clone(),
            name: new.name.clone(),
            is_active: true,
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        state.accounts.insert(
            account.id,
            AccountRow {
                account: account.clone(),
                password_hash: new.password_hash.clone(),
            },
        );
        Ok(account)
    }

    async fn delete_account(&self, account_id: AccountId) -> RosterResult<()> {
        let mut state = self.state.lock().await;

        if state.accounts.remove(&account_id).is_none() {
            return Err(RosterError::not_found(Entity::Account, account_id));
        }

        let owned_players: BTreeSet<PlayerId> = state
            .players
            .iter()
            .filter(|(_, owner)| **owner == account_id)
            .map(|(id, _)| *id)
            .collect();
        state.players.retain(|id, _| !owned_players.contains(id));

        let created_events: BTreeSet<EventId> = state
            .events
            .values()
            .filter(|event| event.created_by == account_id)
            .map(|event| event.id)
            .collect();
        state.remove_events(&created_events);

        let records: BTreeSet<TournamentPlayerId> = state
            .tournament_players
            .values()
            .filter(|record| owned_players.contains(&record.player_id))
            .map(|record| record.id)
            .collect();
        state.remove_tournament_players(&records);

        Ok(())
    }

    async fn find_account(&self, account_id: AccountId) -> RosterResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&account_id).map(|row| row.account.clone()))
    }

    async fn find_credentials(&self, email: &str) -> RosterResult<Option<AccountCredentials>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|row| row.account.email == email)
            .map(|row| AccountCredentials {
                account: row.account.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn update_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> RosterResult<Account> {
        let mut state = self.state.lock().await;
        let row = state
            .accounts
            .get_mut(&account_id)
            .ok_or(RosterError::not_found(Entity::Account, account_id))?;

        if let Some(name) = name {
            row.account.name = name.to_string();
        }
        if let Some(hash) = password_hash {
            row.password_hash = hash.to_string();
        }
        Ok(row.account.clone())
    }

    async fn insert_player(&self, account_id: AccountId) -> RosterResult<Player> {
        let mut state = self.state.lock().await;

        if !state.accounts.contains_key(&account_id) {
            return Err(RosterError::not_found(Entity::Account, account_id));
        }
        if state.players.values().any(|owner| *owner == account_id) {
            return Err(RosterError::UniqueConstraintViolation(format!(
                "account {account_id} already has a player"
            )));
        }

        let player_id = state.player_ids.next();
        state.players.insert(player_id, account_id);
        state
            .player(player_id)
            .ok_or(RosterError::not_found(Entity::Player, player_id))
    }

    async fn find_player_by_account(&self, account_id: AccountId) -> RosterResult<Option<Player>> {
        let state = self.state.lock().await;
        Ok(state
            .players
            .iter()
            .find(|(_, owner)| **owner == account_id)
            .and_then(|(id, _)| state.player(*id)))
    }
}

#[async_trait]
impl TournamentRepository for MemoryRepository {
    async fn insert_tournament(&self, new: &NewTournament) -> RosterResult<Tournament> {
        let mut state = self.state.lock().await;

        if state.name_taken(&new.name, None) {
            return Err(RosterError::DuplicateName {
                entity: Entity::Tournament,
                name: new.name.clone(),
            });
        }
        if let Some(&missing) = new
            .initial_players
            .iter()
            .find(|id| !state.players.contains_key(*id))
        {
            return Err(RosterError::not_found(Entity::Player, missing));
        }

        let id = state.tournament_ids.next();
        state.tournaments.insert(
            id,
            TournamentRow {
                id,
                name: new.name.clone(),
                description: new.description.clone(),
                teams_n: new.teams_n,
                created_at: Utc::now(),
            },
        );
        state.register(id, &new.initial_players)?;
        state.tournament(id)
    }

    async fn get_tournament(&self, tournament_id: TournamentId) -> RosterResult<Tournament> {
        self.state.lock().await.tournament(tournament_id)
    }

    async fn list_tournaments(&self) -> RosterResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        state
            .tournaments
            .keys()
            .map(|id| state.tournament(*id))
            .collect()
    }

    async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        changes: &TournamentChanges,
    ) -> RosterResult<Tournament> {
        let mut state = self.state.lock().await;

        if let Some(name) = &changes.name {
            if state.name_taken(name, Some(tournament_id)) {
                return Err(RosterError::DuplicateName {
                    entity: Entity::Tournament,
                    name: name.clone(),
                });
            }
        }

        let row = state
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(RosterError::not_found(Entity::Tournament, tournament_id))?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(teams_n) = changes.teams_n {
            row.teams_n = teams_n;
        }
        state.tournament(tournament_id)
    }

    async fn delete_tournament(&self, tournament_id: TournamentId) -> RosterResult<()> {
        let mut state = self.state.lock().await;

        if state.tournaments.remove(&tournament_id).is_none() {
            return Err(RosterError::not_found(Entity::Tournament, tournament_id));
        }

        let events: BTreeSet<EventId> = state
            .events
            .values()
            .filter(|event| event.tournament_id == tournament_id)
            .map(|event| event.id)
            .collect();
        state.remove_events(&events);

        let records: BTreeSet<TournamentPlayerId> =
            state.records_of(tournament_id).map(|record| record.id).collect();
        state.remove_tournament_players(&records);

        Ok(())
    }

    async fn register_players(
        &self,
        tournament_id: TournamentId,
        players: &BTreeSet<PlayerId>,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        self.state.lock().await.register(tournament_id, players)
    }

    async fn roster(&self, tournament_id: TournamentId) -> RosterResult<Vec<Player>> {
        let state = self.state.lock().await;
        let tournament = state.tournament(tournament_id)?;
        Ok(tournament
            .players
            .iter()
            .filter_map(|id| state.player(*id))
            .collect())
    }

    async fn tournament_players(
        &self,
        tournament_id: TournamentId,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        let state = self.state.lock().await;
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(RosterError::not_found(Entity::Tournament, tournament_id));
        }
        Ok(state.records_of(tournament_id).cloned().collect())
    }

    async fn find_tournament_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> RosterResult<Option<TournamentPlayer>> {
        let state = self.state.lock().await;
        Ok(state
            .records_of(tournament_id)
            .find(|record| record.player_id == player_id)
            .cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryRepository {
    async fn insert_event(&self, draft: &EventDraft) -> RosterResult<Event> {
        let mut state = self.state.lock().await;

        if !state.tournaments.contains_key(&draft.tournament_id) {
            return Err(RosterError::not_found(Entity::Tournament, draft.tournament_id));
        }
        if !state.accounts.contains_key(&draft.created_by) {
            return Err(RosterError::not_found(Entity::Account, draft.created_by));
        }
        if state.events.values().any(|event| event.name == draft.name) {
            return Err(RosterError::DuplicateName {
                entity: Entity::Event,
                name: draft.name.clone(),
            });
        }

        let event = Event {
            id: state.event_ids.next(),
            tournament_id: draft.tournament_id,
            name: draft.name.clone(),
            sport: draft.sport.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: EventStatus::Open,
            created_by: draft.created_by,
            created_at: Utc::now(),
            players: BTreeSet::new(),
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> RosterResult<Event> {
        let state = self.state.lock().await;
        state
            .events
            .get(&event_id)
            .cloned()
            .ok_or(RosterError::not_found(Entity::Event, event_id))
    }

    async fn list_events(&self, tournament_id: Option<TournamentId>) -> RosterResult<Vec<Event>> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .values()
            .filter(|event| tournament_id.is_none_or(|id| event.tournament_id == id))
            .cloned()
            .collect())
    }

    async fn delete_event(&self, event_id: EventId) -> RosterResult<()> {
        let mut state = self.state.lock().await;
        if !state.events.contains_key(&event_id) {
            return Err(RosterError::not_found(Entity::Event, event_id));
        }
        state.remove_events(&BTreeSet::from([event_id]));
        Ok(())
    }

    async fn advance_event(&self, event_id: EventId) -> RosterResult<Event> {
        let mut state = self.state.lock().await;
        let event = state.event_mut(event_id)?;
        event.status = event.status.advance();
        Ok(event.clone())
    }

    async fn toggle_event_players(
        &self,
        event_id: EventId,
        players: &BTreeSet<TournamentPlayerId>,
    ) -> RosterResult<Event> {
        let mut state = self.state.lock().await;

        let tournament_id = state.event_mut(event_id)?.tournament_id;
        let scope: BTreeSet<TournamentPlayerId> =
            state.records_of(tournament_id).map(|record| record.id).collect();
        membership::check_scope(tournament_id, &scope, players)?;

        let event = state.event_mut(event_id)?;
        let plan = TogglePlan::new(&event.players, players);
        plan.apply(&mut event.players);
        let event = event.clone();

        for team in state.teams.values_mut().filter(|team| team.event_id == event_id) {
            team.players.retain(|id| !plan.release.contains(id));
        }
        Ok(event)
    }
}

#[async_trait]
impl TeamRepository for MemoryRepository {
    async fn insert_teams(&self, event_id: EventId, teams: &[NewTeam]) -> RosterResult<Vec<Team>> {
        let mut state = self.state.lock().await;

        let event = state
            .events
            .get(&event_id)
            .ok_or(RosterError::not_found(Entity::Event, event_id))?;
        let teams_n = state
            .tournaments
            .get(&event.tournament_id)
            .map(|t| t.teams_n)
            .ok_or(RosterError::not_found(Entity::Tournament, event.tournament_id))?;
        let existing: Vec<Team> = state
            .teams
            .values()
            .filter(|team| team.event_id == event_id)
            .cloned()
            .collect();
        assembler::check_groups(event_id, teams_n, &event.players, &existing, teams)?;

        let mut created = Vec::with_capacity(teams.len());
        for group in teams {
            let team = Team {
                id: state.team_ids.next(),
                event_id,
                name: group.name.trim().to_string(),
                players: group.players.clone(),
            };
            state.teams.insert(team.id, team.clone());
            created.push(team);
        }
        Ok(created)
    }

    async fn list_teams(&self, event_id: EventId) -> RosterResult<Vec<Team>> {
        let state = self.state.lock().await;
        if !state.events.contains_key(&event_id) {
            return Err(RosterError::not_found(Entity::Event, event_id));
        }
        Ok(state
            .teams
            .values()
            .filter(|team| team.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn health_check(&self) -> RosterResult<()> {
        Ok(())
    }
}

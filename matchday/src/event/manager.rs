//! Event manager: event lifecycle and event membership.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::models::{Event, EventId, NewEvent};
use crate::auth::models::AccountId;
use crate::db::Repository;
use crate::errors::{Entity, RosterError, RosterResult};
use crate::tournament::models::{TournamentId, TournamentPlayerId};

/// Event manager
#[derive(Clone)]
pub struct EventManager {
    repo: Arc<dyn Repository>,
}

impl EventManager {
    /// Create a new event manager
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create an event in the `open` status
    ///
    /// # Errors
    ///
    /// * `RosterError::MissingField` - Blank name or sport, missing date
    /// * `RosterError::InvalidRange` - End date before start date
    /// * `RosterError::DuplicateName` - Event name already taken
    /// * `RosterError::NotFound` - Unknown tournament
    pub async fn create_event(&self, request: NewEvent) -> RosterResult<Event> {
        let draft = request.validate()?;
        let event = self.repo.insert_event(&draft).await?;

        log::info!(
            "Created event {} '{}' in tournament {}",
            event.id,
            event.name,
            event.tournament_id
        );
        Ok(event)
    }

    /// Flip the membership of every named tournament player.
    ///
    /// Members are released and non-members admitted, all or nothing.
    ///
    /// # Errors
    ///
    /// * `RosterError::NotFound` - Unknown event
    /// * `RosterError::CrossTournamentReference` - An id is not a tournament
    ///   player of the event's tournament
    pub async fn reconcile_event_players(
        &self,
        event_id: EventId,
        players: BTreeSet<TournamentPlayerId>,
    ) -> RosterResult<Event> {
        match self.repo.toggle_event_players(event_id, &players).await {
            Ok(event) => {
                log::info!(
                    "Toggled {} players in event {} ({} participants)",
                    players.len(),
                    event_id,
                    event.players.len()
                );
                Ok(event)
            }
            Err(err) => {
                if matches!(err, RosterError::CrossTournamentReference { .. }) {
                    log::warn!("Rejected reconcile of event {}: {}", event_id, err);
                }
                Err(err)
            }
        }
    }

    /// Toggle the caller's own membership in an event
    ///
    /// # Errors
    ///
    /// * `RosterError::NotFound` - Unknown event, or the account has no player
    /// * `RosterError::NotRegistered` - The caller's player is not registered
    ///   to the event's tournament
    pub async fn toggle_self_in_event(
        &self,
        event_id: EventId,
        account_id: AccountId,
    ) -> RosterResult<Event> {
        let player = self
            .repo
            .find_player_by_account(account_id)
            .await?
            .ok_or(RosterError::not_found(Entity::Player, account_id))?;
        let event = self.repo.get_event(event_id).await?;

        let Some(record) = self
            .repo
            .find_tournament_player(event.tournament_id, player.id)
            .await?
        else {
            log::warn!(
                "Player {} tried to join event {} without registering to tournament {}",
                player.id,
                event_id,
                event.tournament_id
            );
            return Err(RosterError::NotRegistered {
                player_id: player.id,
                tournament_id: event.tournament_id,
            });
        };

        let event = self
            .repo
            .toggle_event_players(event_id, &BTreeSet::from([record.id]))
            .await?;
        log::info!(
            "Tournament player {} toggled own membership in event {}",
            record.id,
            event_id
        );
        Ok(event)
    }

    /// Move the event one status forward. A completed event stays completed.
    pub async fn advance_event(&self, event_id: EventId) -> RosterResult<Event> {
        let event = self.repo.advance_event(event_id).await?;
        log::info!("Event {} is now {}", event_id, event.status);
        Ok(event)
    }

    pub async fn get_event(&self, event_id: EventId) -> RosterResult<Event> {
        self.repo.get_event(event_id).await
    }

    /// List events, optionally for one tournament
    pub async fn list_events(
        &self,
        tournament_id: Option<TournamentId>,
    ) -> RosterResult<Vec<Event>> {
        self.repo.list_events(tournament_id).await
    }

    /// Delete an event with its participants and teams
    pub async fn delete_event(&self, event_id: EventId) -> RosterResult<()> {
        self.repo.delete_event(event_id).await?;
        log::info!("Deleted event {}", event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::NewAccount;
    use crate::db::{AccountRepository, MemoryRepository, TournamentRepository};
    use crate::errors::ErrorKind;
    use crate::event::models::EventStatus;
    use crate::tournament::models::NewTournament;
    use chrono::NaiveDate;

    struct Fixture {
        repo: Arc<MemoryRepository>,
        events: EventManager,
        admin: AccountId,
        tournament: TournamentId,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(MemoryRepository::new());
        let admin = repo
            .create_account(&NewAccount {
                email: "admin@example.com".to_string(),
                name: "Admin".to_string(),
                password_hash: "hash".to_string(),
                is_admin: true,
            })
            .await
            .unwrap();
        let tournament = repo
            .insert_tournament(&NewTournament::new("Ranking", "", 2))
            .await
            .unwrap();
        Fixture {
            events: EventManager::new(repo.clone()),
            repo,
            admin: admin.id,
            tournament: tournament.id,
        }
    }

    fn new_event(f: &Fixture, name: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> NewEvent {
        NewEvent {
            tournament_id: f.tournament,
            name: name.to_string(),
            sport: "Padel".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            created_by: f.admin,
        }
    }

    #[tokio::test]
    async fn test_create_event_starts_open() {
        let f = fixture().await;
        let event = f
            .events
            .create_event(new_event(&f, "Finals", (2025, 5, 17), (2025, 10, 25)))
            .await
            .unwrap();
        assert_eq!(event.status, EventStatus::Open);
        assert!(event.players.is_empty());
    }

    #[tokio::test]
    async fn test_single_day_event_is_valid() {
        let f = fixture().await;
        assert!(f
            .events
            .create_event(new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 17)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected() {
        let f = fixture().await;
        let err = f
            .events
            .create_event(new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 16)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_event_name_is_validation_error() {
        let f = fixture().await;
        f.events
            .create_event(new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 18)))
            .await
            .unwrap();
        let err = f
            .events
            .create_event(new_event(&f, "Cup", (2025, 6, 1), (2025, 6, 2)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RosterError::DuplicateName {
                entity: Entity::Event,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let f = fixture().await;
        let mut request = new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 18));
        request.tournament_id = 404;
        let err = f.events.create_event(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_advance_stops_at_completed() {
        let f = fixture().await;
        let event = f
            .events
            .create_event(new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 18)))
            .await
            .unwrap();

        let mut statuses = Vec::new();
        for _ in 0..4 {
            statuses.push(f.events.advance_event(event.id).await.unwrap().status);
        }
        assert_eq!(
            statuses,
            vec![
                EventStatus::InProgress,
                EventStatus::Completed,
                EventStatus::Completed,
                EventStatus::Completed
            ]
        );
    }

    #[tokio::test]
    async fn test_toggle_self_requires_registration() {
        let f = fixture().await;
        let event = f
            .events
            .create_event(new_event(&f, "Cup", (2025, 5, 17), (2025, 5, 18)))
            .await
            .unwrap();

        // Admin has no player yet
        let err = f.events.toggle_self_in_event(event.id, f.admin).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let player = f.repo.insert_player(f.admin).await.unwrap();
        let err = f.events.toggle_self_in_event(event.id, f.admin).await.unwrap_err();
        assert!(matches!(err, RosterError::NotRegistered { player_id, .. } if player_id == player.id));

        let records = f
            .repo
            .register_players(f.tournament, &BTreeSet::from([player.id]))
            .await
            .unwrap();
        let joined = f.events.toggle_self_in_event(event.id, f.admin).await.unwrap();
        assert_eq!(joined.players, BTreeSet::from([records[0].id]));

        let left = f.events.toggle_self_in_event(event.id, f.admin).await.unwrap();
        assert!(left.players.is_empty());
    }
}

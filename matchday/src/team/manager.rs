//! Team manager.

use std::sync::Arc;

use super::models::{NewTeam, Team};
use crate::db::Repository;
use crate::errors::RosterResult;
use crate::event::models::EventId;

/// Team manager
#[derive(Clone)]
pub struct TeamManager {
    repo: Arc<dyn Repository>,
}

impl TeamManager {
    /// Create a new team manager
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create one team per group, in input order, all or nothing
    ///
    /// # Errors
    ///
    /// * `RosterError::NotFound` - Unknown event
    /// * `RosterError::MissingField` - Group with a blank name
    /// * `RosterError::DuplicateName` - Team name already used in the event
    /// * `RosterError::TeamSizeExceeded` - Group larger than the tournament team size
    /// * `RosterError::NotEventParticipant` - Member not admitted to the event
    /// * `RosterError::DuplicateTeamMember` - Member placed in two teams of the event
    pub async fn assemble_teams(
        &self,
        event_id: EventId,
        groups: Vec<NewTeam>,
    ) -> RosterResult<Vec<Team>> {
        match self.repo.insert_teams(event_id, &groups).await {
            Ok(teams) => {
                log::info!("Assembled {} teams for event {}", teams.len(), event_id);
                Ok(teams)
            }
            Err(err) => {
                log::warn!("Rejected team assembly for event {}: {}", event_id, err);
                Err(err)
            }
        }
    }

    /// Teams of an event ordered by id
    pub async fn list_teams(&self, event_id: EventId) -> RosterResult<Vec<Team>> {
        self.repo.list_teams(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::NewAccount;
    use crate::db::{
        AccountRepository, EventRepository, MemoryRepository, TournamentRepository,
    };
    use crate::errors::{ErrorKind, RosterError};
    use crate::event::models::EventDraft;
    use crate::tournament::models::{NewTournament, TournamentPlayerId};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    /// Event with three admitted tournament players, teams of two
    async fn seeded() -> (TeamManager, EventId, Vec<TournamentPlayerId>) {
        let repo = Arc::new(MemoryRepository::new());
        let mut players = BTreeSet::new();
        let mut creator = 0;
        for name in ["a", "b", "c"] {
            let account = repo
                .create_account(&NewAccount {
                    email: format!("{name}@example.com"),
                    name: name.to_string(),
                    password_hash: "hash".to_string(),
                    is_admin: false,
                })
                .await
                .unwrap();
            creator = account.id;
            players.insert(repo.insert_player(account.id).await.unwrap().id);
        }

        let tournament = repo
            .insert_tournament(&NewTournament::new("Ranking", "", 2).with_players(players))
            .await
            .unwrap();
        let records: Vec<TournamentPlayerId> = repo
            .tournament_players(tournament.id)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();

        let event = repo
            .insert_event(&EventDraft {
                tournament_id: tournament.id,
                name: "Finals".to_string(),
                sport: "Padel".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 5, 17).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 10, 25).unwrap(),
                created_by: creator,
            })
            .await
            .unwrap();
        let admitted: BTreeSet<TournamentPlayerId> = records.iter().copied().collect();
        repo.toggle_event_players(event.id, &admitted).await.unwrap();

        (TeamManager::new(repo), event.id, records)
    }

    #[tokio::test]
    async fn test_assemble_in_input_order() {
        let (teams, event_id, tp) = seeded().await;
        let created = teams
            .assemble_teams(
                event_id,
                vec![NewTeam::new("Red", [tp[0], tp[1]]), NewTeam::new("Blue", [tp[2]])],
            )
            .await
            .unwrap();

        let names: Vec<_> = created.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Blue"]);
        assert_eq!(teams.list_teams(event_id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_oversized_team_applies_nothing() {
        let (teams, event_id, tp) = seeded().await;
        let err = teams
            .assemble_teams(
                event_id,
                vec![NewTeam::new("Blue", [tp[2]]), NewTeam::new("Red", tp.clone())],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RosterError::TeamSizeExceeded { size: 3, limit: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Membership);
        assert!(teams.list_teams(event_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let (teams, _, _) = seeded().await;
        let err = teams.assemble_teams(999, Vec::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

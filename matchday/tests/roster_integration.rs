//! Integration tests for the roster engine.
//!
//! These run the managers end to end against the in-memory repository:
//! account provisioning, tournament registration, event reconciliation,
//! lifecycle and team assembly.

use chrono::NaiveDate;
use matchday::auth::{AccountManager, RegisterRequest};
use matchday::db::{MemoryRepository, Repository};
use matchday::event::{EventStatus, NewEvent};
use matchday::identity::Player;
use matchday::team::NewTeam;
use matchday::tournament::{NewTournament, TournamentPlayerId};
use matchday::{
    Entity, ErrorKind, EventManager, IdentityAdapter, RosterError, TeamManager, TournamentManager,
};
use std::collections::BTreeSet;
use std::sync::Arc;

struct Engine {
    accounts: AccountManager,
    identity: IdentityAdapter,
    tournaments: TournamentManager,
    events: EventManager,
    teams: TeamManager,
}

fn engine() -> Engine {
    let repo: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
    Engine {
        accounts: AccountManager::new(
            repo.clone(),
            "integration_secret_at_least_32_chars".to_string(),
        ),
        identity: IdentityAdapter::new(repo.clone()),
        tournaments: TournamentManager::new(repo.clone()),
        events: EventManager::new(repo.clone()),
        teams: TeamManager::new(repo),
    }
}

async fn signup(engine: &Engine, email: &str) -> (i64, Player) {
    let (account, player) = engine
        .accounts
        .register(RegisterRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            name: email.split('@').next().unwrap_or_default().to_string(),
        })
        .await
        .expect("register");
    (account.id, player)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn finals(tournament_id: i64, created_by: i64) -> NewEvent {
    NewEvent {
        tournament_id,
        name: "Finals".to_string(),
        sport: "Padel".to_string(),
        start_date: date(2025, 5, 17),
        end_date: date(2025, 10, 25),
        created_by,
    }
}

#[tokio::test]
async fn test_ranking_finals_scenario() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2))
        .await
        .unwrap();
    let tp_a = engine.tournaments.register(ranking.id, a.id).await.unwrap();

    assert_eq!(engine.tournaments.roster(ranking.id).await.unwrap(), vec![a.clone()]);
    assert_eq!(
        engine.tournaments.tournament_players(ranking.id).await.unwrap(),
        vec![tp_a.clone()]
    );

    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();
    assert_eq!(event.status, EventStatus::Open);

    let once = engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();
    assert_eq!(once.players, BTreeSet::from([tp_a.id]));

    let twice = engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();
    assert!(twice.players.is_empty());

    assert_eq!(
        engine.events.advance_event(event.id).await.unwrap().status,
        EventStatus::InProgress
    );
    assert_eq!(
        engine.events.advance_event(event.id).await.unwrap().status,
        EventStatus::Completed
    );
}

#[tokio::test]
async fn test_every_account_has_exactly_one_player() {
    let engine = engine();
    let (account_id, player) = signup(&engine, "solo@example.com").await;

    let resolved = engine.identity.player_for_account(account_id).await.unwrap();
    assert_eq!(resolved, player);

    let account = engine.accounts.profile(account_id).await.unwrap();
    let err = engine.identity.on_account_created(&account).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(engine.identity.player_for_account(account_id).await.unwrap(), player);
}

#[tokio::test]
async fn test_cross_tournament_ids_rejected_atomically() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;
    let (_, b) = signup(&engine, "b@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id]))
        .await
        .unwrap();
    let friendly = engine
        .tournaments
        .create_tournament(NewTournament::new("Friendly", "", 2).with_players([b.id]))
        .await
        .unwrap();
    let local = engine.tournaments.register(ranking.id, a.id).await.unwrap();
    let foreign = engine.tournaments.register(friendly.id, b.id).await.unwrap();

    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();

    let err = engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([local.id, foreign.id]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RosterError::CrossTournamentReference { tournament_player_id, tournament_id }
            if tournament_player_id == foreign.id && tournament_id == ranking.id
    ));
    assert_eq!(err.kind(), ErrorKind::Membership);

    let unchanged = engine.events.get_event(event.id).await.unwrap();
    assert!(unchanged.players.is_empty());
}

#[tokio::test]
async fn test_concurrent_self_toggles_are_both_applied() {
    let engine = Arc::new(engine());
    let (admin, a) = signup(&engine, "a@example.com").await;
    let (b_account, b) = signup(&engine, "b@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id, b.id]))
        .await
        .unwrap();
    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.events.toggle_self_in_event(event.id, admin).await })
    };
    let second = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.events.toggle_self_in_event(event.id, b_account).await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let expected: BTreeSet<TournamentPlayerId> = engine
        .tournaments
        .tournament_players(ranking.id)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(engine.events.get_event(event.id).await.unwrap().players, expected);
}

#[tokio::test]
async fn test_teams_only_hold_participants() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;
    let (_, b) = signup(&engine, "b@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id, b.id]))
        .await
        .unwrap();
    let tp_a = engine.tournaments.register(ranking.id, a.id).await.unwrap();
    let tp_b = engine.tournaments.register(ranking.id, b.id).await.unwrap();
    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();
    engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();

    let err = engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Red", [tp_a.id, tp_b.id])])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RosterError::NotEventParticipant { tournament_player_id, .. } if tournament_player_id == tp_b.id
    ));

    let err = engine
        .teams
        .assemble_teams(
            event.id,
            vec![NewTeam::new("Red", [tp_a.id]), NewTeam::new("Blue", [tp_a.id])],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::DuplicateTeamMember(id) if id == tp_a.id));
    assert!(engine.teams.list_teams(event.id).await.unwrap().is_empty());

    let teams = engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Red", [tp_a.id])])
        .await
        .unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].players, BTreeSet::from([tp_a.id]));
}

#[tokio::test]
async fn test_deleting_event_keeps_tournament_roster() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;
    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id]))
        .await
        .unwrap();
    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();

    engine.events.delete_event(event.id).await.unwrap();

    let err = engine.events.get_event(event.id).await.unwrap_err();
    assert!(matches!(err, RosterError::NotFound { entity: Entity::Event, .. }));
    assert_eq!(engine.tournaments.roster(ranking.id).await.unwrap(), vec![a]);
    assert!(engine.events.list_events(Some(ranking.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_released_participant_leaves_event_teams() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;
    let (_, b) = signup(&engine, "b@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id, b.id]))
        .await
        .unwrap();
    let tp_a = engine.tournaments.register(ranking.id, a.id).await.unwrap();
    let tp_b = engine.tournaments.register(ranking.id, b.id).await.unwrap();
    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();
    engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id, tp_b.id]))
        .await
        .unwrap();
    engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Red", [tp_a.id, tp_b.id])])
        .await
        .unwrap();

    let event = engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();
    assert_eq!(event.players, BTreeSet::from([tp_b.id]));

    let teams = engine.teams.list_teams(event.id).await.unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].players, BTreeSet::from([tp_b.id]));
    for team in &teams {
        assert!(team.players.is_subset(&event.players));
    }
}

#[tokio::test]
async fn test_player_cannot_join_a_second_team_of_the_event() {
    let engine = engine();
    let (admin, a) = signup(&engine, "a@example.com").await;
    let (_, b) = signup(&engine, "b@example.com").await;

    let ranking = engine
        .tournaments
        .create_tournament(NewTournament::new("Ranking", "", 2).with_players([a.id, b.id]))
        .await
        .unwrap();
    let tp_a = engine.tournaments.register(ranking.id, a.id).await.unwrap();
    let tp_b = engine.tournaments.register(ranking.id, b.id).await.unwrap();
    let event = engine
        .events
        .create_event(finals(ranking.id, admin))
        .await
        .unwrap();
    engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id, tp_b.id]))
        .await
        .unwrap();
    engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Red", [tp_a.id])])
        .await
        .unwrap();

    let err = engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Blue", [tp_b.id, tp_a.id])])
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::DuplicateTeamMember(id) if id == tp_a.id));
    assert_eq!(err.kind(), ErrorKind::Membership);

    let err = engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Red", [tp_b.id])])
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::DuplicateName { entity: Entity::Team, .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(engine.teams.list_teams(event.id).await.unwrap().len(), 1);

    // Leaving and rejoining the event frees the player for another team.
    engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();
    engine
        .events
        .reconcile_event_players(event.id, BTreeSet::from([tp_a.id]))
        .await
        .unwrap();
    let teams = engine
        .teams
        .assemble_teams(event.id, vec![NewTeam::new("Blue", [tp_b.id, tp_a.id])])
        .await
        .unwrap();
    assert_eq!(teams[0].players, BTreeSet::from([tp_a.id, tp_b.id]));
}

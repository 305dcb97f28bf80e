//! Tournament API handlers.
//!
//! Reading tournaments requires authentication; creating, changing and
//! deleting them, and registering players, is reserved to administrators.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use matchday::identity::PlayerId;
use matchday::tournament::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
};
use serde::Deserialize;
use std::collections::BTreeSet;

use super::AppState;
use super::errors::ApiResult;
use super::middleware::{AdminUser, AuthUser};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct CreateTournamentPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub teams_n: i32,
    /// Player ids registered together with the tournament
    #[serde(default)]
    pub players: BTreeSet<PlayerId>,
}

#[derive(Debug, Deserialize)]
pub struct PlayersPayload {
    pub players: BTreeSet<PlayerId>,
}

pub async fn list_tournaments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Tournament>>> {
    Ok(Json(state.tournaments.list_tournaments().await?))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<TournamentId>, PathRejection>,
) -> ApiResult<Json<Tournament>> {
    let Path(id) = path?;
    Ok(Json(state.tournaments.get_tournament(id).await?))
}

/// Tournament player records, the ids events and teams refer to
pub async fn list_tournament_players(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<TournamentId>, PathRejection>,
) -> ApiResult<Json<Vec<TournamentPlayer>>> {
    let Path(id) = path?;
    Ok(Json(state.tournaments.tournament_players(id).await?))
}

/// Create a tournament, optionally with its first players.
///
/// # Request Body
///
/// ```json
/// {"name": "Ranking", "description": "Weekly ladder", "teams_n": 2, "players": [1, 2]}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank name, `teams_n` below 1
/// - `404 Not Found`: Unknown player id
/// - `409 Conflict`: Name already taken
pub async fn create_tournament(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateTournamentPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let Json(payload) = payload?;
    let request = NewTournament::new(payload.name, payload.description, payload.teams_n)
        .with_players(payload.players);

    let tournament = state.tournaments.create_tournament(request).await?;
    metrics::tournament_registrations_total(tournament.players.len());
    tracing::info!(
        account_id = admin.account_id,
        tournament_id = tournament.id,
        "Tournament created"
    );

    Ok((StatusCode::CREATED, Json(tournament)))
}

pub async fn update_tournament(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<TournamentId>, PathRejection>,
    payload: Result<Json<TournamentChanges>, JsonRejection>,
) -> ApiResult<Json<Tournament>> {
    let Path(id) = path?;
    let Json(changes) = payload?;
    Ok(Json(state.tournaments.update_tournament(id, changes).await?))
}

/// Delete a tournament with its roster, events and teams
pub async fn delete_tournament(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<TournamentId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.tournaments.delete_tournament(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register players to a tournament. Players already registered are left alone
/// and nobody is removed.
///
/// # Request Body
///
/// ```json
/// {"players": [1, 2, 3]}
/// ```
pub async fn register_players(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<TournamentId>, PathRejection>,
    payload: Result<Json<PlayersPayload>, JsonRejection>,
) -> ApiResult<Json<Tournament>> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let before = state.tournaments.get_tournament(id).await?;

    let tournament = state
        .tournaments
        .update_tournament_players(id, payload.players)
        .await?;
    metrics::tournament_registrations_total(newly_registered(&before, &tournament));

    Ok(Json(tournament))
}

/// Players on the `after` roster that were not on the `before` roster
fn newly_registered(before: &Tournament, after: &Tournament) -> usize {
    let known: BTreeSet<PlayerId> = before.players.iter().copied().collect();
    after
        .players
        .iter()
        .filter(|id| !known.contains(id))
        .count()
}

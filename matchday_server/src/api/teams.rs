//! Team API handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use matchday::event::EventId;
use matchday::team::{NewTeam, Team};
use serde::Deserialize;

use super::AppState;
use super::errors::ApiResult;
use super::middleware::{AdminUser, AuthUser};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct AssemblePayload {
    pub teams: Vec<NewTeam>,
}

pub async fn list_teams(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<Json<Vec<Team>>> {
    let Path(id) = path?;
    Ok(Json(state.teams.list_teams(id).await?))
}

/// Create one team per group, all or nothing.
///
/// # Request Body
///
/// ```json
/// {"teams": [{"name": "Blue", "players": [4, 7]}, {"name": "Red", "players": [5, 9]}]}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank team name, or name already used in the event
/// - `404 Not Found`: Unknown event
/// - `422 Unprocessable Entity`: Group larger than the tournament team size,
///   member not participating in the event, or member already in a team
pub async fn assemble_teams(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<AssemblePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Team>>)> {
    let Path(id) = path?;
    let Json(payload) = payload?;

    let teams = state.teams.assemble_teams(id, payload.teams).await?;
    metrics::teams_assembled_total(teams.len());

    Ok((StatusCode::CREATED, Json(teams)))
}

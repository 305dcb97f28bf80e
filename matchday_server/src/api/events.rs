//! Event API handlers.
//!
//! Participants are managed by toggling: naming a participant releases it,
//! naming anyone else of the tournament admits it. Administrators toggle any
//! tournament player; every registered player may toggle themselves with
//! `POST /events/{id}/join`.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::NaiveDate;
use matchday::event::{Event, EventId, NewEvent};
use matchday::tournament::{TournamentId, TournamentPlayerId};
use serde::Deserialize;
use std::collections::BTreeSet;

use super::AppState;
use super::errors::ApiResult;
use super::middleware::{AdminUser, AuthUser};
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub tournament: Option<TournamentId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventPayload {
    pub tournament: TournamentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sport: String,
    /// `YYYY-MM-DD`
    pub start_date: Option<NaiveDate>,
    /// `YYYY-MM-DD`
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TogglePayload {
    pub players: BTreeSet<TournamentPlayerId>,
}

/// List events, all of them or those of `?tournament={id}`
pub async fn list_events(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Event>>> {
    let Query(query) = query?;
    Ok(Json(state.events.list_events(query.tournament).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<Json<Event>> {
    let Path(id) = path?;
    Ok(Json(state.events.get_event(id).await?))
}

/// Create an event in the `open` status, owned by the calling administrator.
///
/// # Request Body
///
/// ```json
/// {
///   "tournament": 1,
///   "name": "Finals",
///   "sport": "Padel",
///   "start_date": "2025-05-17",
///   "end_date": "2025-10-25"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank name or sport, missing date, end before start,
///   name already taken
/// - `404 Not Found`: Unknown tournament
pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateEventPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let Json(payload) = payload?;
    let request = NewEvent {
        tournament_id: payload.tournament,
        name: payload.name,
        sport: payload.sport,
        start_date: payload.start_date,
        end_date: payload.end_date,
        created_by: admin.account_id,
    };

    let event = state.events.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Delete an event with its participants and teams. The tournament roster is kept.
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.events.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the membership of tournament players in an event, all or nothing.
///
/// # Request Body
///
/// ```json
/// {"players": [4, 7]}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown event
/// - `422 Unprocessable Entity`: An id is not a tournament player of the
///   event's tournament
pub async fn toggle_players(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<TogglePayload>, JsonRejection>,
) -> ApiResult<Json<Event>> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let count = payload.players.len();

    let event = state.events.reconcile_event_players(id, payload.players).await?;
    metrics::event_toggles_total("admin", count);

    Ok(Json(event))
}

/// Join the event, or leave it when already participating.
///
/// # Errors
///
/// - `404 Not Found`: Unknown event
/// - `409 Conflict`: The caller is not registered to the event's tournament
pub async fn join_event(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<Json<Event>> {
    let Path(id) = path?;
    let event = state
        .events
        .toggle_self_in_event(id, user.account_id)
        .await?;
    metrics::event_toggles_total("self", 1);

    Ok(Json(event))
}

/// Move the event one step along `open -> in_progress -> completed`.
/// Advancing a completed event leaves it completed.
pub async fn advance_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<Json<Event>> {
    let Path(id) = path?;
    let event = state.events.advance_event(id).await?;
    metrics::event_advances_total(event.status.as_str());

    Ok(Json(event))
}

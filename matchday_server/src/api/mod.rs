//! HTTP API for the tournament roster engine.
//!
//! # Modules
//!
//! - [`users`]: Account creation, token issuance and the caller's profile
//! - [`tournaments`]: Tournaments and their rosters
//! - [`events`]: Event lifecycle and event membership
//! - [`teams`]: Team assembly within an event
//! - [`middleware`]: Bearer authentication, admin guard and request metrics
//! - [`request_id`]: `x-request-id` propagation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                              - Storage health (public)
//! POST   /api/v1/users                        - Create account (public)
//! POST   /api/v1/users/token                  - Issue access token (public)
//! GET    /api/v1/users/me                     - Caller's account and player
//! PATCH  /api/v1/users/me                     - Update name/password
//! GET    /api/v1/tournaments                  - List tournaments
//! POST   /api/v1/tournaments                  - Create tournament (admin)
//! GET    /api/v1/tournaments/{id}             - Get tournament
//! PATCH  /api/v1/tournaments/{id}             - Update tournament (admin)
//! DELETE /api/v1/tournaments/{id}             - Delete tournament (admin)
//! GET    /api/v1/tournaments/{id}/players     - Tournament player records
//! POST   /api/v1/tournaments/{id}/players     - Register players (admin)
//! GET    /api/v1/events?tournament={id}       - List events
//! POST   /api/v1/events                       - Create event (admin)
//! GET    /api/v1/events/{id}                  - Get event
//! DELETE /api/v1/events/{id}                  - Delete event (admin)
//! PATCH  /api/v1/events/{id}/players          - Toggle participants (admin)
//! POST   /api/v1/events/{id}/join             - Toggle own participation
//! POST   /api/v1/events/{id}/advance          - Advance status (admin)
//! GET    /api/v1/events/{id}/teams            - List teams
//! POST   /api/v1/events/{id}/teams            - Assemble teams (admin)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use matchday::db::MemoryRepository;
//! use matchday_server::api::{create_router, AppState};
//! use matchday_server::config::SecurityConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let security = SecurityConfig {
//!     jwt_secret: "a-secret-that-is-at-least-32-characters".to_string(),
//!     access_token_minutes: 60,
//! };
//! let state = AppState::new(Arc::new(MemoryRepository::new()), &security);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod errors;
pub mod events;
pub mod middleware;
pub mod request_id;
pub mod teams;
pub mod tournaments;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
};
use matchday::auth::AccountManager;
use matchday::db::Repository;
use matchday::{EventManager, TeamManager, TournamentManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::SecurityConfig;

/// Application state shared across all HTTP handlers.
///
/// Every manager shares the same storage backend.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub accounts: Arc<AccountManager>,
    pub tournaments: Arc<TournamentManager>,
    pub events: Arc<EventManager>,
    pub teams: Arc<TeamManager>,
}

impl AppState {
    /// Build the managers on top of one storage backend
    pub fn new(repo: Arc<dyn Repository>, security: &SecurityConfig) -> Self {
        let accounts = AccountManager::new(repo.clone(), security.jwt_secret.clone())
            .with_token_minutes(security.access_token_minutes);

        Self {
            accounts: Arc::new(accounts),
            tournaments: Arc::new(TournamentManager::new(repo.clone())),
            events: Arc::new(EventManager::new(repo.clone())),
            teams: Arc::new(TeamManager::new(repo.clone())),
            repo,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 routes.
///
/// Admin-only handlers take an [`middleware::AdminUser`], so admin and
/// member routes share paths behind the same authentication layer.
fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/token", post(users::issue_token));

    let protected_routes = Router::new()
        .route("/users/me", get(users::me).patch(users::update_me))
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{id}",
            get(tournaments::get_tournament)
                .patch(tournaments::update_tournament)
                .delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{id}/players",
            get(tournaments::list_tournament_players).post(tournaments::register_players),
        )
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event).delete(events::delete_event),
        )
        .route("/events/{id}/players", patch(events::toggle_players))
        .route("/events/{id}/join", post(events::join_event))
        .route("/events/{id}/advance", post(events::advance_event))
        .route(
            "/events/{id}/teams",
            get(teams::list_teams).post(teams::assemble_teams),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"0.4.0","database":true,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.repo.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

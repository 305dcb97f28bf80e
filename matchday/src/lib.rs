//! # Matchday
//!
//! Tournament membership and event roster engine for a sports-tournament backend.
//!
//! Players join tournaments, tournaments run events, and events group their
//! participants into teams. The engine keeps those rosters consistent: the
//! tournament roster is derived from its tournament player records, events
//! only admit players of their own tournament, and teams only contain event
//! participants.
//!
//! ## Core Modules
//!
//! - [`identity`]: One player per account, provisioned explicitly
//! - [`tournament`]: Tournaments and the tournament roster
//! - [`event`]: Event lifecycle (`open -> in_progress -> completed`)
//! - [`membership`]: Toggle-based event membership reconciliation
//! - [`team`]: Team assembly within an event
//! - [`auth`]: Accounts, password hashing and access tokens
//! - [`db`]: Repository traits with PostgreSQL and in-memory backends
//!
//! ## Example
//!
//! ```no_run
//! use matchday::db::MemoryRepository;
//! use matchday::tournament::{NewTournament, TournamentManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), matchday::RosterError> {
//! let tournaments = TournamentManager::new(Arc::new(MemoryRepository::new()));
//! let ranking = tournaments
//!     .create_tournament(NewTournament::new("Ranking", "", 2))
//!     .await?;
//! assert!(ranking.players.is_empty());
//! # Ok(())
//! # }
//! ```

/// Accounts and access tokens.
pub mod auth;

/// Storage backends.
pub mod db;

/// Roster error types.
pub mod errors;
pub use errors::{Entity, ErrorKind, RosterError, RosterResult};

pub mod event;
pub mod identity;
pub mod membership;
pub mod team;
pub mod tournament;

pub use event::EventManager;
pub use identity::IdentityAdapter;
pub use team::TeamManager;
pub use tournament::TournamentManager;

//! Tournament module: tournaments and their rosters.
//!
//! The roster is never stored on its own. It is read back from the
//! tournament's [`TournamentPlayer`] records, and
//! [`TournamentManager::register`] is the only way to create those.
//!
//! ## Example
//!
//! ```no_run
//! use matchday::db::MemoryRepository;
//! use matchday::tournament::{NewTournament, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tournaments = TournamentManager::new(Arc::new(MemoryRepository::new()));
//!
//!     let tournament = tournaments
//!         .create_tournament(NewTournament::new("Ranking", "Spring ladder", 2))
//!         .await?;
//!     println!("Created tournament: {}", tournament.id);
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::TournamentManager;
pub use models::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
    TournamentPlayerId,
};

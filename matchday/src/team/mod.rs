//! Team module: grouping event participants into teams.

pub mod assembler;
pub mod manager;
pub mod models;

pub use manager::TeamManager;
pub use models::{NewTeam, Team, TeamId};

//! Event module: scheduled instances within a tournament.
//!
//! Events move through `open -> in_progress -> completed` one step at a time
//! and keep their own participant set, drawn from the tournament's players.

pub mod manager;
pub mod models;

pub use manager::EventManager;
pub use models::{Event, EventDraft, EventId, EventStatus, NewEvent, ParseStatusError};

//! Identity adapter binding each account to exactly one player.
//!
//! Account creation calls [`IdentityAdapter::on_account_created`] explicitly;
//! nothing else provisions players.

pub mod adapter;
pub mod models;

pub use adapter::IdentityAdapter;
pub use models::{Player, PlayerId};

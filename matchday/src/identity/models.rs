//! Player data model.

use serde::{Deserialize, Serialize};

use crate::auth::models::AccountId;

/// Player ID type
pub type PlayerId = i64;

/// Domain representation of a person, independent of any tournament.
///
/// The display name is read from the owning account; it is never stored twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub account_id: AccountId,
    pub name: String,
}

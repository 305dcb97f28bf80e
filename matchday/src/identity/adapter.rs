//! Account to player provisioning.

use std::sync::Arc;

use super::models::Player;
use crate::auth::models::{Account, AccountId};
use crate::db::Repository;
use crate::errors::{Entity, RosterError, RosterResult};

/// Provisions and resolves the player owned by an account
#[derive(Clone)]
pub struct IdentityAdapter {
    repo: Arc<dyn Repository>,
}

impl IdentityAdapter {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create the player for a freshly created account.
    ///
    /// # Errors
    ///
    /// * `RosterError::UniqueConstraintViolation` - The account already has a player
    /// * `RosterError::NotFound` - The account does not exist
    pub async fn on_account_created(&self, account: &Account) -> RosterResult<Player> {
        let player = self.repo.insert_player(account.id).await?;
        log::info!(
            "Provisioned player {} for account {}",
            player.id,
            account.id
        );
        Ok(player)
    }

    /// Resolve the player owned by an account
    pub async fn player_for_account(&self, account_id: AccountId) -> RosterResult<Player> {
        self.repo
            .find_player_by_account(account_id)
            .await?
            .ok_or(RosterError::not_found(Entity::Player, account_id))
    }
}

//! Startup provisioning of the administrator account.

use matchday::auth::{AccountManager, AuthError, RegisterRequest};

use crate::config::AdminBootstrap;

/// Create the configured administrator unless the email is already taken.
///
/// Returns `true` when a new account was created.
pub async fn ensure_admin(
    accounts: &AccountManager,
    admin: &AdminBootstrap,
) -> Result<bool, AuthError> {
    let request = RegisterRequest {
        email: admin.email.clone(),
        password: admin.password.clone(),
        name: admin.name.clone(),
    };

    match accounts.create_admin(request).await {
        Ok((account, player)) => {
            tracing::info!(
                account_id = account.id,
                player_id = player.id,
                "Created bootstrap administrator {}",
                account.email
            );
            Ok(true)
        }
        Err(AuthError::EmailTaken) => {
            tracing::info!("Bootstrap administrator {} already exists", admin.email);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday::db::MemoryRepository;
    use std::sync::Arc;

    fn admin() -> AdminBootstrap {
        AdminBootstrap {
            email: "root@example.com".to_string(),
            password: "change me now".to_string(),
            name: "Root".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let accounts = AccountManager::new(
            Arc::new(MemoryRepository::new()),
            "test_secret_that_is_at_least_32_chars".to_string(),
        );

        assert!(ensure_admin(&accounts, &admin()).await.unwrap());
        assert!(!ensure_admin(&accounts, &admin()).await.unwrap());

        let account = accounts
            .authenticate("root@example.com", "change me now")
            .await
            .unwrap();
        assert!(account.is_admin);
    }

    #[tokio::test]
    async fn test_ensure_admin_rejects_weak_password() {
        let accounts = AccountManager::new(
            Arc::new(MemoryRepository::new()),
            "test_secret_that_is_at_least_32_chars".to_string(),
        );
        let mut weak = admin();
        weak.password = "1234".to_string();

        assert!(matches!(
            ensure_admin(&accounts, &weak).await,
            Err(AuthError::WeakPassword(_))
        ));
    }
}

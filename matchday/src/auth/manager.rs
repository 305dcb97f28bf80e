//! Account manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, Account, AccountId, NewAccount, ProfileUpdate, RegisterRequest},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

use crate::db::Repository;
use crate::errors::{Entity, RosterError};
use crate::identity::{IdentityAdapter, Player};

/// Default access token lifetime
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60;

/// Account manager
#[derive(Clone)]
pub struct AccountManager {
    repo: Arc<dyn Repository>,
    identity: IdentityAdapter,
    jwt_secret: String,
    access_token_duration: Duration,
}

impl AccountManager {
    /// Create a new account manager
    ///
    /// # Arguments
    ///
    /// * `repo` - Storage backend
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(repo: Arc<dyn Repository>, jwt_secret: String) -> Self {
        Self {
            identity: IdentityAdapter::new(repo.clone()),
            repo,
            jwt_secret,
            access_token_duration: Duration::minutes(DEFAULT_ACCESS_TOKEN_MINUTES),
        }
    }

    /// Override the access token lifetime
    pub fn with_token_minutes(mut self, minutes: i64) -> Self {
        self.access_token_duration = Duration::minutes(minutes);
        self
    }

    /// Register a new account together with its player
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    /// * `AuthError::EmailTaken` - Email already exists
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<(Account, Player)> {
        self.create(request, false).await
    }

    /// Register an administrator account together with its player
    pub async fn create_admin(&self, request: RegisterRequest) -> AuthResult<(Account, Player)> {
        self.create(request, true).await
    }

    async fn create(&self, request: RegisterRequest, is_admin: bool) -> AuthResult<(Account, Player)> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;
        let password_hash = hash_password(&request.password)?;

        let account = self
            .repo
            .create_account(&NewAccount {
                email,
                name: request.name.trim().to_string(),
                password_hash,
                is_admin,
            })
            .await
            .map_err(|err| match err {
                RosterError::DuplicateName {
                    entity: Entity::Account,
                    ..
                } => AuthError::EmailTaken,
                other => other.into(),
            })?;

        let player = match self.identity.on_account_created(&account).await {
            Ok(player) => player,
            Err(err) => {
                // An account never outlives a failed provisioning
                if let Err(cleanup) = self.repo.delete_account(account.id).await {
                    log::error!(
                        "Failed to remove account {} after provisioning error: {}",
                        account.id,
                        cleanup
                    );
                }
                return Err(err.into());
            }
        };

        log::info!(
            "Registered account {} (admin={}) with player {}",
            account.id,
            account.is_admin,
            player.id
        );
        Ok((account, player))
    }

    /// Check an email and password pair
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email, inactive account,
    ///   blank or wrong password
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<Account> {
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .repo
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !credentials.account.is_active {
            return Err(AuthError::InvalidCredentials);
        }
        verify_password(password, &credentials.password_hash)?;

        Ok(credentials.account)
    }

    /// Authenticate and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<String> {
        let account = self.authenticate(email, password).await?;
        self.issue_access_token(&account)
    }

    /// Issue a signed access token for an account
    pub fn issue_access_token(&self, account: &Account) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: account.id,
            email: account.email.clone(),
            is_admin: account.is_admin,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify an access token
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Get the account behind a token subject
    pub async fn profile(&self, account_id: AccountId) -> AuthResult<Account> {
        self.repo
            .find_account(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Update display name and/or password
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        update: ProfileUpdate,
    ) -> AuthResult<Account> {
        let password_hash = match &update.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };
        let name = update.name.as_deref().map(str::trim);

        let account = self
            .repo
            .update_account(account_id, name, password_hash.as_deref())
            .await
            .map_err(|err| match err {
                RosterError::NotFound { .. } => AuthError::AccountNotFound,
                other => other.into(),
            })?;

        log::info!("Updated profile of account {}", account.id);
        Ok(account)
    }

    /// Resolve the player owned by an account
    pub async fn player(&self, account_id: AccountId) -> AuthResult<Player> {
        Ok(self.identity.player_for_account(account_id).await?)
    }
}

/// Trim and lower-case the domain part of an email address
pub fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim();
    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| AuthError::InvalidEmail("missing '@'".to_string()))?;

    if local.is_empty() || domain.is_empty() || domain.contains(char::is_whitespace) {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }

    Ok(format!("{}@{}", local, domain.to_lowercase()))
}

/// Hash password with Argon2id
fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::Hashing)?
        .to_string())
}

/// Verify password against hash
fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Validate password strength
fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "Password cannot be entirely numeric".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AccountRepository, MemoryRepository};

    const SECRET: &str = "test_secret_that_is_at_least_32_chars";

    fn manager() -> (Arc<MemoryRepository>, AccountManager) {
        let repo = Arc::new(MemoryRepository::new());
        let manager = AccountManager::new(repo.clone(), SECRET.to_string());
        (repo, manager)
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ").unwrap(),
            "Alice@example.com"
        );
        assert!(matches!(
            normalize_email("no-at-sign"),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[tokio::test]
    async fn test_register_provisions_one_player() {
        let (repo, manager) = manager();
        let (account, player) = manager.register(request("alice@example.com")).await.unwrap();

        assert_eq!(player.account_id, account.id);
        assert!(!account.is_admin);
        let stored = repo.find_player_by_account(account.id).await.unwrap();
        assert_eq!(stored, Some(player));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_case_insensitive_domain() {
        let (_, manager) = manager();
        manager.register(request("alice@example.com")).await.unwrap();

        let err = manager
            .register(request("alice@EXAMPLE.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (_, manager) = manager();
        let (account, _) = manager.register(request("alice@example.com")).await.unwrap();

        let found = manager
            .authenticate("alice@Example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(found.id, account.id);

        assert!(matches!(
            manager.authenticate("alice@example.com", "wrong horse").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            manager.authenticate("alice@example.com", "").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            manager.authenticate("bob@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let (_, manager) = manager();
        let (account, _) = manager.create_admin(request("root@example.com")).await.unwrap();

        let token = manager.issue_access_token(&account).unwrap();
        let claims = manager.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, account.id);
        assert!(claims.is_admin);

        let other = AccountManager::new(
            Arc::new(MemoryRepository::new()),
            "another_secret_that_is_at_least_32_chars".to_string(),
        );
        assert!(matches!(
            other.verify_access_token(&token),
            Err(AuthError::Jwt(_))
        ));
    }

    #[tokio::test]
    async fn test_update_profile_changes_password() {
        let (_, manager) = manager();
        let (account, _) = manager.register(request("alice@example.com")).await.unwrap();

        let updated = manager
            .update_profile(
                account.id,
                ProfileUpdate {
                    name: Some(" Alice B ".to_string()),
                    password: Some("new password".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice B");

        assert!(manager
            .authenticate("alice@example.com", "new password")
            .await
            .is_ok());
        assert!(manager
            .authenticate("alice@example.com", "correct horse")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_unknown_profile() {
        let (_, manager) = manager();
        let err = manager
            .update_profile(42, ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound));
    }
}

//! Account module providing registration, credential checks and access tokens.
//!
//! - Argon2id password hashing
//! - JWT access tokens (HS256)
//! - Player provisioning through [`IdentityAdapter`](crate::identity::IdentityAdapter)
//!
//! ## Example
//!
//! ```no_run
//! use matchday::auth::{AccountManager, RegisterRequest};
//! use matchday::db::MemoryRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let accounts = AccountManager::new(
//!         Arc::new(MemoryRepository::new()),
//!         "jwt_secret_that_is_at_least_32_chars".to_string(),
//!     );
//!
//!     let request = RegisterRequest {
//!         email: "player@example.com".to_string(),
//!         password: "correct horse".to_string(),
//!         name: "Player One".to_string(),
//!     };
//!
//!     let (account, player) = accounts.register(request).await?;
//!     println!("Registered account {} as player {}", account.id, player.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AccountManager;
pub use models::{
    AccessTokenClaims, Account, AccountCredentials, AccountId, NewAccount, ProfileUpdate,
    RegisterRequest,
};

//! Account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account ID type
pub type AccountId = i64;

/// Account model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Account row as inserted by the account store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Account together with its stored password hash
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

/// Account registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: AccountId,        // Account ID
    pub email: String,
    pub is_admin: bool,
    pub exp: i64,              // Expiration timestamp
    pub iat: i64,              // Issued at timestamp
}

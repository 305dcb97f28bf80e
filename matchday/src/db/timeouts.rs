//! Database query timeout helpers
//!
//! Provides timeout wrappers for database operations to prevent indefinite hangs.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::errors::{RosterError, RosterResult};

/// Default timeout for database queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for timeout operations
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Execute a query with timeout
///
/// # Example
///
/// ```no_run
/// use matchday::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let result = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT * FROM tournaments WHERE id = $1")
///         .bind(1_i64)
///         .fetch_one(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(TimeoutError::Database(e)),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Execute a query with default timeout (5 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

/// Run a whole transaction body under [`DEFAULT_TRANSACTION_TIMEOUT`].
///
/// The body owns its transaction; on timeout the future is dropped, which
/// drops the transaction and rolls it back.
pub async fn within_transaction_timeout<F, T>(future: F) -> RosterResult<T>
where
    F: Future<Output = RosterResult<T>>,
{
    match timeout(DEFAULT_TRANSACTION_TIMEOUT, future).await {
        Ok(result) => result,
        Err(_) => Err(RosterError::Timeout(DEFAULT_TRANSACTION_TIMEOUT)),
    }
}

//! Error responses for API handlers.
//!
//! Every handler error renders as `{"error": "<message>"}`. Storage and
//! timeout failures are logged in full and answered with a sanitized message.
//! Rejected paths, queries and bodies answer `400`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use matchday::auth::AuthError;
use matchday::{ErrorKind, RosterError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by every API handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Administrator privileges required")
    }
}

/// HTTP status for an error category
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Membership => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "Roster operation failed");
        }
        Self::new(status_for(kind), err.client_message())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "Account operation failed");
        }
        Self::new(status_for(kind), err.client_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday::Entity;

    #[test]
    fn test_roster_error_statuses() {
        let cases = [
            (RosterError::MissingField("name"), StatusCode::BAD_REQUEST),
            (RosterError::not_found(Entity::Event, 1), StatusCode::NOT_FOUND),
            (
                RosterError::NotRegistered {
                    player_id: 1,
                    tournament_id: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                RosterError::DuplicateTeamMember(3),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_errors_are_sanitized() {
        let err = ApiError::from(RosterError::Timeout(std::time::Duration::from_secs(10)));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Service temporarily unavailable");

        let err = ApiError::from(AuthError::Hashing);
        assert_eq!(err.message, "Internal server error");
    }
}

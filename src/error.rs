use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::db::{models::RoleName, StoreError};
use crate::ordering::OrderingError;
use crate::storage::StorageError;

/// What a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Board,
    Column,
    Task,
    Status,
    Comment,
    User,
    Membership,
    File,
    Role(RoleName),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Board => f.write_str("Board not found"),
            Missing::Column => f.write_str("Column not found"),
            Missing::Task => f.write_str("Task not found"),
            Missing::Status => f.write_str("Status not found"),
            Missing::Comment => f.write_str("Comment not found"),
            Missing::User => f.write_str("User not found"),
            Missing::Membership => f.write_str("The user is not a member of this board"),
            Missing::File => f.write_str("File not found"),
            Missing::Role(RoleName::Admin) => f.write_str("admin role not found"),
            Missing::Role(RoleName::Member) => f.write_str("member role not found"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(Missing),
    #[error("The user does not have permissions for these actions")]
    PermissionDenied,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingRole(role) => AppError::NotFound(Missing::Role(role)),
            StoreError::Ordering(err) => err.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::UnknownColumn(_) => AppError::NotFound(Missing::Column),
            other => AppError::validation(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(_) => AppError::NotFound(Missing::File),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Token(_) => AppError::Unauthorized,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(messages) => json!({
                "message": messages,
                "error": "Bad Request",
                "statusCode": status.as_u16(),
            }),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                json!({
                    "message": "Internal Server Error",
                    "statusCode": status.as_u16(),
                })
            }
            other => json!({
                "message": other.to_string(),
                "statusCode": status.as_u16(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(
            AppError::NotFound(Missing::Board).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::validation("name should not be empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_role_is_not_found() {
        let err = AppError::from(StoreError::MissingRole(RoleName::Member));
        assert_eq!(err.to_string(), "member role not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn out_of_range_move_is_a_validation_error() {
        let err = AppError::from(OrderingError::OutOfRange { max: 2 });
        assert!(matches!(
            err,
            AppError::Validation(ref messages)
                if messages == &["columnNumber must not be greater than 2".to_string()]
        ));
    }

    #[test]
    fn ordering_errors_from_the_store_keep_their_kind() {
        let err = AppError::from(StoreError::from(OrderingError::UnknownColumn(7)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = AppError::from(StoreError::from(OrderingError::Negative));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn failed_transaction_is_internal() {
        let err = AppError::from(StoreError::MissingRow { table: "columns", id: 4 });
        assert!(matches!(err, AppError::Internal(_)));
    }
}

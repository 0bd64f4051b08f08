use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Postgres SQLSTATE raised by a violated unique constraint.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE raised by a violated foreign key.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// RepoError
///
/// Failures surfaced by a `Repository`. Constraint violations are kept apart from
/// generic database failures so handlers can turn them into caller-facing errors.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("referenced row does not exist")]
    ForeignKeyViolation,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => RepoError::UniqueViolation,
            Some(FOREIGN_KEY_VIOLATION) => RepoError::ForeignKeyViolation,
            _ => RepoError::Database(err),
        }
    }
}

/// ApiError
///
/// The caller-facing error taxonomy. Every variant renders as
/// `{"detail": "<message>"}` with its HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Not found.")]
    NotFound,

    /// Duplicate like/favorite state. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation => ApiError::Conflict("Object already exists.".to_string()),
            RepoError::ForeignKeyViolation => {
                ApiError::Validation("Referenced object does not exist.".to_string())
            }
            RepoError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// An unparsable path segment names no resource.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Path rejected: {}", rejection.body_text());
        ApiError::NotFound
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

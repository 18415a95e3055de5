use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// MySQL SQLSTATE for integrity constraint violations (duplicate key, foreign key).
const INTEGRITY_VIOLATION: &str = "23000";

/// Failures raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool exhausted, connection lost or closed. Safe for the caller to retry.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A unique or foreign key constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err)
            }
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(INTEGRITY_VIOLATION) =>
            {
                StoreError::Constraint(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-actionable outcomes of a service operation, plus infrastructure failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidState(_) | ServiceError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Store(StoreError::Constraint(_)) => StatusCode::CONFLICT,
            ServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Store(StoreError::Constraint(_)) => {
                "Conflicts with existing records".to_string()
            }
            ServiceError::Store(err) => {
                tracing::error!(error = %err, transient = err.is_transient(), "Store failure");
                if err.is_transient() {
                    "Service temporarily unavailable".to_string()
                } else {
                    "Internal Server Error".to_string()
                }
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

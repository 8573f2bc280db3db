use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Journal not found with ID: {0}")]
    NotFound(Uuid),

    #[error("Journal validation failed: {0}")]
    Validation(String),

    #[error("Stored journal data is malformed: {0}")]
    DataCorruption(String),

    #[error("Database backend error: {0:#}")]
    BackendError(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File upload failed: {0}")]
    UploadFailed(String),

    #[error("Media host returned no usable URL for key: {0}")]
    MissingUrl(String),

    #[error("Upload of {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },

    #[error("Storage backend error: {0:#}")]
    BackendError(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Missing form field: {0}")]
    MissingFormField(String),
    #[error("Error processing multipart form data: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),
    #[error("Invalid journal ID format: {0}")]
    InvalidUuid(#[from] uuid::Error),
    #[error("Missing authenticated user identity")]
    Unauthorized,

    // Domain/Service level errors (mapped from RepoError/StorageError)
    #[error("Journal not found with ID: {0}")]
    JournalNotFound(Uuid),
    #[error("No journal entry found for today")]
    NoJournalToday,
    #[error("Journal rejected: {0}")]
    ValidationFailed(String),
    #[error("Could not access journal data")]
    RepositoryError(#[source] RepoError),
    #[error("Failed to upload images")]
    UploadFailed(#[source] StorageError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::JournalNotFound(id),
            RepoError::Validation(msg) => AppError::ValidationFailed(msg),
            e @ (RepoError::DataCorruption(_) | RepoError::BackendError(_)) => {
                AppError::RepositoryError(e)
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::UploadFailed(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for AppError {
    fn from(err: aws_smithy_types::error::operation::BuildError) -> Self {
        AppError::InitError(format!("Failed to build AWS request: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InitError(format!("IO error: {}", err))
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingFormField(field) => {
                error_body(StatusCode::BAD_REQUEST, format!("Missing form field: {}", field))
            }
            AppError::MultipartError(e) => {
                error_body(StatusCode::BAD_REQUEST, format!("Invalid multipart form data: {}", e))
            }
            AppError::InvalidUuid(e) => {
                error_body(StatusCode::BAD_REQUEST, format!("Invalid ID format: {}", e))
            }
            AppError::ValidationFailed(msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => {
                error_body(StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            AppError::JournalNotFound(_) => not_found("Journal not found"),
            AppError::NoJournalToday => not_found("No journal entry found for today"),

            // 5xx Server Errors
            AppError::UploadFailed(e) => {
                tracing::error!(error.source = ?e, "Image upload failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "success": false,
                        "message": "Failed to upload images",
                        "error": e.to_string(),
                    }),
                )
            }
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(error.status = %status, error.detail = %self, "Responding with error");
        } else {
            tracing::debug!(error.status = %status, error.detail = %self, "Responding with error");
        }

        (status, Json(body)).into_response()
    }
}

fn error_body(status: StatusCode, message: String) -> (StatusCode, serde_json::Value) {
    (status, serde_json::json!({ "error": message }))
}

fn not_found(message: &str) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::NOT_FOUND,
        serde_json::json!({ "success": false, "message": message }),
    )
}

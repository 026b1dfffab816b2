use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Generic body for every 500 answered by the API.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Any failure reported by the warehouse.
    DatabaseError(sqlx::Error),
    /// Invalid request input (page outside range, malformed date).
    BadRequest {
        /// Short error label.
        error: String,
        /// Human readable explanation.
        message: String,
    },
    /// Missing or invalid bearer token.
    Unauthorized(String),
    /// Synthetic throttle raised by the simulated source.
    Throttled {
        /// Seconds the caller should wait before retrying.
        retry_after: u64,
    },
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Shorthand for a 400 with a label and a message.
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::BadRequest { error, message } => {
                write!(f, "Bad request: {} ({})", error, message)
            }
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Throttled { retry_after } => {
                write!(f, "Throttled: retry after {}s", retry_after)
            }
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each variant to its status code and JSON body.
    ///
    /// Database details are logged and never returned to the caller.
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR_MESSAGE }),
                )
            }
            AppError::BadRequest { error, message } => {
                tracing::debug!("Bad request: {} ({})", error, message);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": error, "message": message }),
                )
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, json!({ "error": msg }))
            }
            AppError::Throttled { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Too Many Requests",
                    "message": "Limite de requisições excedido. Tente novamente em alguns segundos.",
                    "retry_after": retry_after,
                }),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR_MESSAGE, "message": msg }),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }
}

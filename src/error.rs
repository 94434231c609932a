use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    /// Platform REST or gateway failure. Aborts the current event only; the
    /// previous snapshot stays authoritative.
    Platform(String),
    /// The bot or the invoking user lacks a required capability. Aborts the
    /// command chain before any state is read.
    PermissionDenied(String),
    /// Trigger count or role count over the configured bound.
    LimitExceeded(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                "internal database error".to_string()
            }
            AppError::Platform(msg) => format!("platform error: {msg}"),
            AppError::PermissionDenied(msg) => msg.clone(),
            AppError::LimitExceeded(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                "internal error".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "database error: {e}"),
            AppError::Platform(msg) => write!(f, "platform error: {msg}"),
            AppError::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            AppError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
            AppError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("resource not found".to_string()),
            _ => AppError::Database(e),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Platform(e.to_string())
    }
}

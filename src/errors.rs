use crate::models::Theme;
use axum::http::StatusCode;
use thiserror::Error;

/// Failures of store operations. Every variant leaves the store unchanged.
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("{0}")]
    Validation(String),

    #[error("not enough coins: {needed} needed, {available} available")]
    InsufficientCoins { needed: u64, available: u64 },

    #[error("theme '{0}' is already unlocked")]
    AlreadyUnlocked(Theme),

    #[error("theme '{0}' is locked, claim it with rewards first")]
    ThemeLocked(Theme),

    #[error("failed to write storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HabitError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<HabitError> for AppError {
    fn from(err: HabitError) -> Self {
        let status = match err {
            HabitError::Validation(_) => StatusCode::BAD_REQUEST,
            HabitError::InsufficientCoins { .. } | HabitError::ThemeLocked(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            HabitError::AlreadyUnlocked(_) => StatusCode::CONFLICT,
            HabitError::Storage(_) | HabitError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

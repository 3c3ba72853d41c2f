//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Auth errors
    InvalidCredentials,
    InvalidTokenFormat,
    Forbidden,

    // Cipher / codec errors
    DecodeError(String),
    MalformedJson(String),

    // Validation errors
    ValidationError(String),

    // Resource errors
    NotFound(String),
    NoData,

    // Model export errors
    ConversionError(String),

    // Log store errors
    IoFailure(String),

    // Throttling
    RateLimited,

    // Generic errors
    InternalError(String),
}

impl AppError {
    /// Message surfaced to the caller (also carried inside the predict
    /// endpoint's 200 error envelope).
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::InvalidTokenFormat => "Invalid token format".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::DecodeError(msg) => format!("Decode error: {}", msg),
            AppError::MalformedJson(msg) => format!("Malformed JSON: {}", msg),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::NoData => "No data available".to_string(),
            AppError::ConversionError(msg) => format!("Model conversion failed: {}", msg),
            AppError::IoFailure(msg) => msg.clone(),
            AppError::RateLimited => "Rate limit exceeded".to_string(),
            AppError::InternalError(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidTokenFormat => StatusCode::FORBIDDEN,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DecodeError(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoData => StatusCode::NO_CONTENT,
            AppError::ConversionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IoFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::IoFailure(msg) | AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            AppError::ConversionError(msg) => {
                tracing::error!("Conversion error: {}", msg);
            }
            _ => {}
        }

        // 204 must not carry a body
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let body = Json(json!({
            "error": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_and_bad_token_are_distinct() {
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidTokenFormat.status(), StatusCode::FORBIDDEN);
        assert_ne!(AppError::Forbidden.message(), AppError::InvalidTokenFormat.message());
    }

    #[test]
    fn no_data_maps_to_204() {
        assert_eq!(AppError::NoData.status(), StatusCode::NO_CONTENT);
    }
}

//! Admin token validation
//!
//! Admin operations carry an `x-token` header of the form
//! `username::password`. A missing or malformed token is reported
//! distinctly from a failed role/credential check.

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::models::UserTable;

pub const TOKEN_HEADER: &str = "x-token";

/// Pull the raw token out of the request headers.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidTokenFormat)
}

/// Validate an admin token against the user table.
///
/// Splits on `::` exactly once; absence of the delimiter is
/// `InvalidTokenFormat`, everything else that fails (unknown user, wrong
/// password, role != admin) is `Forbidden`.
pub fn authorize_admin(users: &UserTable, token: &str) -> Result<String, AppError> {
    let (username, password) = token.split_once("::").ok_or(AppError::InvalidTokenFormat)?;

    let user = users.get(username).ok_or(AppError::Forbidden)?;
    if user.password != password || !user.is_admin() {
        tracing::warn!("Admin check failed for user '{}'", username);
        return Err(AppError::Forbidden);
    }

    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> UserTable {
        UserTable::from_json(
            r#"{"admin": {"password": "admin123", "role": "admin"},
                "demo": {"password": "demo", "role": "user"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn valid_admin_token_passes() {
        assert_eq!(authorize_admin(&users(), "admin::admin123").unwrap(), "admin");
    }

    #[test]
    fn missing_delimiter_is_invalid_format() {
        assert!(matches!(
            authorize_admin(&users(), "admin-admin123"),
            Err(AppError::InvalidTokenFormat)
        ));
    }

    #[test]
    fn wrong_password_is_forbidden() {
        assert!(matches!(
            authorize_admin(&users(), "admin::nope"),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn non_admin_role_is_forbidden() {
        assert!(matches!(
            authorize_admin(&users(), "demo::demo"),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn unknown_user_is_forbidden() {
        assert!(matches!(
            authorize_admin(&users(), "ghost::pw"),
            Err(AppError::Forbidden)
        ));
    }
}

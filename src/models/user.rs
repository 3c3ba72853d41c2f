//! User table
//!
//! Loaded once at startup from the USERS_JSON environment blob and
//! read-only while serving.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub password: String,
    pub role: String,
}

impl UserEntry {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone)]
pub struct UserTable {
    users: HashMap<String, UserEntry>,
}

impl UserTable {
    pub fn from_json(blob: &str) -> anyhow::Result<Self> {
        let users: HashMap<String, UserEntry> = serde_json::from_str(blob)?;
        Ok(Self { users })
    }

    pub fn get(&self, username: &str) -> Option<&UserEntry> {
        self.users.get(username)
    }

    /// Credential check for login. Plaintext comparison mirrors the
    /// deployed user blob format.
    pub fn verify(&self, username: &str, password: &str) -> Option<&UserEntry> {
        self.users
            .get(username)
            .filter(|u| u.password == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> UserTable {
        UserTable::from_json(
            r#"{"admin": {"password": "admin123", "role": "admin"},
                "demo": {"password": "demo", "role": "user"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn verify_accepts_matching_credentials() {
        let t = table();
        assert!(t.verify("admin", "admin123").unwrap().is_admin());
        assert!(!t.verify("demo", "demo").unwrap().is_admin());
    }

    #[test]
    fn verify_rejects_bad_password_and_unknown_user() {
        let t = table();
        assert!(t.verify("admin", "wrong").is_none());
        assert!(t.verify("ghost", "admin123").is_none());
    }
}

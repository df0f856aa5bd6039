//! In-memory user directory
//!
//! Passwords are stored as a salted SHA-256 digest. Accounts do not survive a
//! restart.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use super::AuthError;
use crate::domain::value_objects::UserId;

const SALT_LEN: usize = 16;

struct StoredUser {
    id: UserId,
    salt: [u8; SALT_LEN],
    password_digest: String,
}

/// Public view of a registered account
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub username: String,
}

#[derive(Default)]
pub struct UserDirectory {
    users: DashMap<String, StoredUser>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    pub fn register(&self, username: &str, password: &str) -> Result<RegisteredUser, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::BlankCredentials);
        }

        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::UsernameTaken(username.to_string())),
            Entry::Vacant(slot) => {
                let mut salt = [0u8; SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                let id = UserId::new();
                slot.insert(StoredUser {
                    id,
                    salt,
                    password_digest: digest(&salt, password),
                });
                info!(%id, username, "User registered");
                Ok(RegisteredUser {
                    id,
                    username: username.to_string(),
                })
            }
        }
    }

    /// Check credentials; unknown users and wrong passwords are indistinguishable
    pub fn authenticate(&self, username: &str, password: &str) -> Result<RegisteredUser, AuthError> {
        let username = username.trim();
        let user = self
            .users
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        let candidate = digest(&user.salt, password);
        if !constant_time_eq(candidate.as_bytes(), user.password_digest.as_bytes()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(RegisteredUser {
            id: user.id,
            username: username.to_string(),
        })
    }
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_authenticate() {
        let users = UserDirectory::new();
        let registered = users.register("mira", "hunter2").unwrap();

        let authed = users.authenticate("mira", "hunter2").unwrap();
        assert_eq!(authed.id, registered.id);
        assert_eq!(authed.username, "mira");
    }

    #[test]
    fn test_wrong_password_and_unknown_user_fail() {
        let users = UserDirectory::new();
        users.register("mira", "hunter2").unwrap();

        assert!(matches!(
            users.authenticate("mira", "hunter3"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            users.authenticate("nobody", "hunter2"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_and_blank_registration_rejected() {
        let users = UserDirectory::new();
        users.register("mira", "hunter2").unwrap();

        assert!(matches!(
            users.register(" mira ", "other"),
            Err(AuthError::UsernameTaken(ref name)) if name == "mira"
        ));
        assert!(matches!(users.register("  ", "pw"), Err(AuthError::BlankCredentials)));
        assert!(matches!(users.register("kai", ""), Err(AuthError::BlankCredentials)));
        assert_eq!(users.users.len(), 1);
    }

    #[test]
    fn test_same_password_gets_distinct_digests() {
        let users = UserDirectory::new();
        users.register("a", "same").unwrap();
        users.register("b", "same").unwrap();

        let a = users.users.get("a").unwrap().password_digest.clone();
        let b = users.users.get("b").unwrap().password_digest.clone();
        assert_ne!(a, b);
    }
}

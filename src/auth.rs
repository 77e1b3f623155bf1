//! Credential service over local slots.
//!
//! The catalog core treats "is a user currently authenticated" as an
//! opaque fact; this module is the whole of that fact. Users live in one
//! slot, the active session in another. Passwords are stored as SHA-256
//! digests and handled through [`SecretString`] so they never land in
//! logs or debug output.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::storage::Database;

const USERS_SLOT: &str = "users";
const SESSION_SLOT: &str = "session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Name, email and password are all required")]
    MissingField,
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Corrupt user records: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The public view of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl UserRecord {
    fn public(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Session {
    user: User,
    token: String,
    created_at: String,
}

// ============================================================================
// Auth
// ============================================================================

pub struct Auth {
    db: Database,
}

impl Auth {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new user. Rejects a duplicate email.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingField);
        }

        let mut users = self.load_users().await?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let record = UserRecord {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(&password),
            created_at: Utc::now().to_rfc3339(),
        };
        let user = record.public();
        users.push(record);
        self.store_users(&users).await?;

        tracing::info!(email, "Registered user");
        Ok(user)
    }

    /// Check credentials and open a session. The stored token is opaque;
    /// the rest of the app only asks whether a session exists.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<User, AuthError> {
        let users = self.load_users().await?;
        let hash = hash_password(&password);
        let record = users
            .iter()
            .find(|u| u.email == email.trim() && u.password_hash == hash)
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Session {
            user: record.public(),
            token: generate_token(),
            created_at: Utc::now().to_rfc3339(),
        };
        let raw = serde_json::to_string(&session)?;
        self.db.set_slot(SESSION_SLOT, &raw).await?;

        tracing::info!(email, "Logged in");
        Ok(session.user)
    }

    /// The currently authenticated user, if any. A malformed session slot
    /// is treated as absence.
    pub async fn current_user(&self) -> Option<User> {
        let raw = self.db.get_slot(SESSION_SLOT).await.ok()??;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session.user),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed session slot, treating as logged out");
                None
            }
        }
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.db.delete_slot(SESSION_SLOT).await?;
        Ok(())
    }

    async fn load_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        match self.db.get_slot(USERS_SLOT).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(users) => Ok(users),
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed users slot, treating as empty");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn store_users(&self, users: &[UserRecord]) -> Result<(), AuthError> {
        let raw = serde_json::to_string(users)?;
        self.db.set_slot(USERS_SLOT, &raw).await?;
        Ok(())
    }
}

fn hash_password(password: &SecretString) -> String {
    format!("{:x}", Sha256::digest(password.expose_secret().as_bytes()))
}

fn generate_token() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("token-{suffix}")
}

use crate::store::format_timestamp;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingCredentials,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for {0}")]
    AccountExists(String),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub account_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

pub trait Authenticator {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Staff accounts kept in the workspace database.
pub struct SqliteAuthenticator {
    conn: Rc<Connection>,
}

impl SqliteAuthenticator {
    pub fn new(conn: Rc<Connection>) -> Self {
        Self { conn }
    }

    pub fn account_count(&self) -> Result<u64, AuthError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM staff_accounts", [], |r| r.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    pub fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<String, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !crate::validate::is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM staff_accounts WHERE email = ?",
                [email],
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(AuthError::AccountExists(email.to_string()));
        }

        let account_id = Uuid::new_v4().to_string();
        let salt = Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO staff_accounts(id, email, display_name, password_salt, password_hash, created_at)
             VALUES(?, ?, ?, ?, ?, ?)",
            (
                &account_id,
                email,
                display_name.map(str::trim).filter(|s| !s.is_empty()),
                &salt,
                hash_password(&salt, password),
                format_timestamp(Utc::now()),
            ),
        )?;
        info!(account_id = %account_id, "staff account created");
        Ok(account_id)
    }
}

impl Authenticator for SqliteAuthenticator {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let row: Option<(String, String, Option<String>, String, String)> = self
            .conn
            .query_row(
                "SELECT id, email, display_name, password_salt, password_hash
                 FROM staff_accounts
                 WHERE email = ?",
                [email],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .optional()?;

        let Some((account_id, stored_email, display_name, salt, expected)) = row else {
            warn!("sign-in rejected: unknown account");
            return Err(AuthError::InvalidCredentials);
        };
        if hash_password(&salt, password) != expected {
            warn!(account_id = %account_id, "sign-in rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(account_id = %account_id, "staff signed in");
        Ok(Session {
            token: Uuid::new_v4().to_string(),
            account_id,
            email: stored_email,
            display_name,
            signed_in_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn auth() -> SqliteAuthenticator {
        let conn = Connection::open_in_memory().expect("open");
        db::init_schema(&conn).expect("schema");
        SqliteAuthenticator::new(Rc::new(conn))
    }

    #[test]
    fn sign_in_with_created_account() {
        let auth = auth();
        assert_eq!(auth.account_count().expect("count"), 0);
        let id = auth
            .create_account("Coach@Pool.co", "lane-7-fast", Some("Head Coach"))
            .expect("create");
        assert_eq!(auth.account_count().expect("count"), 1);

        // Email lookups ignore case.
        let session = auth.sign_in("coach@pool.co", "lane-7-fast").expect("sign in");
        assert_eq!(session.account_id, id);
        assert_eq!(session.email, "Coach@Pool.co");
        assert_eq!(session.display_name.as_deref(), Some("Head Coach"));

        let again = auth.sign_in("coach@pool.co", "lane-7-fast").expect("sign in again");
        assert_ne!(again.token, session.token);
    }

    #[test]
    fn rejects_wrong_password_unknown_email_and_blanks() {
        let auth = auth();
        auth.create_account("coach@pool.co", "secret", None).expect("create");
        assert!(matches!(
            auth.sign_in("coach@pool.co", "Secret"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@pool.co", "secret"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("", "secret"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.sign_in("coach@pool.co", ""),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn duplicate_and_malformed_accounts_are_refused() {
        let auth = auth();
        auth.create_account("coach@pool.co", "secret", None).expect("create");
        assert!(matches!(
            auth.create_account("COACH@pool.co", "other", None),
            Err(AuthError::AccountExists(_))
        ));
        assert!(matches!(
            auth.create_account("coach", "secret", None),
            Err(AuthError::InvalidEmail)
        ));
    }

    #[test]
    fn salts_differ_between_accounts() {
        let auth = auth();
        auth.create_account("a@pool.co", "same", None).expect("a");
        auth.create_account("b@pool.co", "same", None).expect("b");
        let hashes: Vec<String> = auth
            .conn
            .prepare("SELECT password_hash FROM staff_accounts")
            .expect("prepare")
            .query_map([], |r| r.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(hashes.len(), 2);
        assert_ne!(hashes[0], hashes[1]);
    }
}

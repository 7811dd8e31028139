//! Accounts, sign-in sessions and password resets.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use super::credentials::{generate_salt, generate_token, hash_password, verify_password};
use super::{text_enum_at, timestamp_at, Storage};
use crate::domain::user::normalize_email;
use crate::domain::{NewUser, Role, User};
use crate::error::{Error, Result};

/// How long a password reset link stays valid.
pub const RESET_TTL_MINUTES: i64 = 60;

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.role, u.created_at";

/// A sign-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Opaque token stored in the session cookie.
    pub token: String,
    /// Signed-in user.
    pub user_id: i64,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Storage {
    /// Register an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the email is already registered.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let email = normalize_email(&user.email);
        if self.user_by_email(&email)?.is_some() {
            return Err(Error::conflict("An account with that email already exists"));
        }

        let salt = generate_salt();
        let hash = hash_password(&user.password, &salt);
        self.conn.execute(
            r"
            INSERT INTO users (name, email, password_hash, password_salt, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                user.name.trim(),
                email,
                hash,
                salt,
                user.role.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Registered user {} as {}", id, user.role);

        self.user_by_id(id)?
            .ok_or_else(|| Error::internal(format!("user {id} vanished after insert")))
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
        let user = self.conn.query_row(&sql, [id], row_to_user).optional()?;
        Ok(user)
    }

    /// Get an account by email, ignoring case and surrounding space.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1");
        let user = self
            .conn
            .query_row(&sql, [normalize_email(email)], row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Check an email and password. Returns `None` on any mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let row: Option<(i64, String, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash, password_salt FROM users WHERE email = ?1",
                [normalize_email(email)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((id, hash, salt)) if verify_password(password, &salt, &hash) => {
                self.user_by_id(id)
            }
            _ => Ok(None),
        }
    }

    /// Replace a user's password and sign out all their sessions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown user.
    pub fn set_password(&self, user_id: i64, password: &str) -> Result<()> {
        let salt = generate_salt();
        let hash = hash_password(password, &salt);
        let affected = self.conn.execute(
            "UPDATE users SET password_hash = ?2, password_salt = ?3 WHERE id = ?1",
            params![user_id, hash, salt],
        )?;
        if affected == 0 {
            return Err(Error::not_found("user", user_id));
        }
        self.conn
            .execute("DELETE FROM sessions WHERE user_id = ?1", [user_id])?;
        info!("Password changed for user {}", user_id);
        Ok(())
    }

    /// Change a user's account type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown user.
    pub fn set_role(&self, user_id: i64, role: Role) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE users SET role = ?2 WHERE id = ?1",
            params![user_id, role.as_str()],
        )?;
        if affected == 0 {
            return Err(Error::not_found("user", user_id));
        }
        Ok(())
    }

    /// Start a session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_session(&self, user_id: i64, ttl: Duration) -> Result<Session> {
        let session = Session {
            token: generate_token(),
            user_id,
            expires_at: Utc::now() + ttl,
        };
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![session.token, session.user_id, session.expires_at.to_rfc3339()],
        )?;
        debug!("Started session for user {}", user_id);
        Ok(session)
    }

    /// The user a live session token belongs to. Expired sessions are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn session_user(&self, token: &str) -> Result<Option<User>> {
        let row: Option<(i64, DateTime<Utc>)> = self
            .conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| Ok((row.get(0)?, timestamp_at(row, 1)?)),
            )
            .optional()?;

        match row {
            Some((user_id, expires_at)) if expires_at > Utc::now() => self.user_by_id(user_id),
            Some(_) => {
                self.delete_session(token)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// End a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(affected > 0)
    }

    /// Remove expired sessions and reset tokens.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1", [&now])?;
        self.conn
            .execute("DELETE FROM password_resets WHERE expires_at <= ?1", [&now])?;
        if affected > 0 {
            info!("Purged {} expired sessions", affected);
        }
        Ok(affected)
    }

    /// Issue a password reset token for an email, if it has an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_password_reset(&self, email: &str) -> Result<Option<String>> {
        let Some(user) = self.user_by_email(email)? else {
            return Ok(None);
        };
        let token = generate_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TTL_MINUTES);
        self.conn.execute(
            "INSERT INTO password_resets (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user.id, expires_at.to_rfc3339()],
        )?;
        debug!("Issued password reset for user {}", user.id);
        Ok(Some(token))
    }

    /// The user a live reset token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn password_reset_user(&self, token: &str) -> Result<Option<User>> {
        let row: Option<(i64, DateTime<Utc>)> = self
            .conn
            .query_row(
                "SELECT user_id, expires_at FROM password_resets WHERE token = ?1",
                [token],
                |row| Ok((row.get(0)?, timestamp_at(row, 1)?)),
            )
            .optional()?;
        match row {
            Some((user_id, expires_at)) if expires_at > Utc::now() => self.user_by_id(user_id),
            _ => Ok(None),
        }
    }

    /// Set a new password with a reset token. The token is single use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the token is unknown, used or expired.
    pub fn reset_password(&self, token: &str, password: &str) -> Result<User> {
        let user = self
            .password_reset_user(token)?
            .ok_or_else(|| Error::not_found("password reset", "link expired or already used"))?;
        self.set_password(user.id, password)?;
        self.conn
            .execute("DELETE FROM password_resets WHERE user_id = ?1", [user.id])?;
        Ok(user)
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: text_enum_at(row, 3)?,
        created_at: timestamp_at(row, 4)?,
    })
}

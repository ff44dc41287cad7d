use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::db::Db;
use crate::error::{AppError, AppResult};

/// A registered credential record. The hash is an Argon2 PHC string
/// produced by `security::hash_password`; plaintext never lands here.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

impl Db {
    /// Insert a new credential record and return the assigned user id.
    ///
    /// Uniqueness lives in the UNIQUE constraint, so two concurrent
    /// registrations of one username resolve to exactly one success and one
    /// `DuplicateUsername` with no read-then-write window.
    pub fn register_user(&self, username: &str, password_hash: &str) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, username, password_hash, now],
        );
        match result {
            Ok(_) => Ok(id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(AppError::store(e)),
        }
    }

    pub fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                rusqlite::params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

//! User account database operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use super::super::Database;
use crate::models::User;

/// True when the error is a SQLite UNIQUE constraint violation, used to map
/// duplicate usernames to a client error instead of a 500.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    pub fn create_user(&self, username: &str, password_hash: &str) -> SqliteResult<User> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![&id, username, password_hash, &created_at.to_rfc3339()],
        )?;

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                Self::row_to_user,
            )
            .ok();
        Ok(user)
    }

    pub fn get_user_by_id(&self, id: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                [id],
                Self::row_to_user,
            )
            .ok();
        Ok(user)
    }

    /// Delete a user account and every memory it owns. Runs in a single
    /// transaction with memories removed first, so an interrupted delete can
    /// never leave memories referencing a missing owner.
    pub fn delete_user_with_memories(&self, user_id: &str) -> SqliteResult<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM memories WHERE user_id = ?1", [user_id])?;
        let rows_affected = tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
        tx.commit()?;

        Ok(rows_affected > 0)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(3)?;

        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

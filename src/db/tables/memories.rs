//! Memory records database operations
//!
//! Every operation is scoped by the owning user id. A record belonging to
//! another user is indistinguishable from a missing one.

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use super::super::Database;
use crate::models::{FieldFilter, Memory, MemoryFields};

const MEMORY_COLUMNS: &str = "id, user_id, title, context, tag, detail, created_at, updated_at";

impl Database {
    pub fn create_memory(&self, user_id: &str, fields: &MemoryFields) -> SqliteResult<Memory> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO memories (id, user_id, title, context, tag, detail, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            rusqlite::params![
                &id,
                user_id,
                &fields.title,
                &fields.context,
                &fields.tag,
                &fields.detail,
                &now.to_rfc3339(),
            ],
        )?;

        Ok(Memory {
            id,
            user_id: user_id.to_string(),
            title: fields.title.clone(),
            context: fields.context.clone(),
            tag: fields.tag.clone(),
            detail: fields.detail.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_memory(&self, user_id: &str, id: &str) -> SqliteResult<Option<Memory>> {
        let conn = self.conn();
        let memory = conn
            .query_row(
                &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                Self::row_to_memory,
            )
            .ok();
        Ok(memory)
    }

    /// List a user's memories newest-first, optionally narrowed by a
    /// case-insensitive substring search over the selected field scope.
    pub fn list_memories(
        &self,
        user_id: &str,
        search: Option<(&str, FieldFilter)>,
    ) -> SqliteResult<Vec<Memory>> {
        let conn = self.conn();

        let predicate = match search {
            Some((_, FieldFilter::Title)) => " AND instr(lower(title), lower(?2)) > 0",
            Some((_, FieldFilter::Context)) => " AND instr(lower(context), lower(?2)) > 0",
            Some((_, FieldFilter::Tag)) => " AND instr(lower(tag), lower(?2)) > 0",
            Some((_, FieldFilter::All)) => {
                " AND (instr(lower(title), lower(?2)) > 0
                    OR instr(lower(context), lower(?2)) > 0
                    OR instr(lower(tag), lower(?2)) > 0
                    OR instr(lower(detail), lower(?2)) > 0)"
            }
            None => "",
        };

        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1{predicate}
             ORDER BY created_at DESC, rowid DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let memories = match search {
            Some((query, _)) => stmt
                .query_map([user_id, query], Self::row_to_memory)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([user_id], Self::row_to_memory)?
                .filter_map(|r| r.ok())
                .collect(),
        };

        Ok(memories)
    }

    /// Replace title/context/tag/detail wholesale and refresh `updated_at`.
    pub fn update_memory(
        &self,
        user_id: &str,
        id: &str,
        fields: &MemoryFields,
    ) -> SqliteResult<Option<Memory>> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn.execute(
            "UPDATE memories SET title = ?3, context = ?4, tag = ?5, detail = ?6, updated_at = ?7
             WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![
                id,
                user_id,
                &fields.title,
                &fields.context,
                &fields.tag,
                &fields.detail,
                &now,
            ],
        )?;

        if rows_affected == 0 {
            return Ok(None);
        }

        drop(conn);
        self.get_memory(user_id, id)
    }

    pub fn delete_memory(&self, user_id: &str, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM memories WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn count_memories(&self, user_id: &str) -> SqliteResult<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
    }

    fn row_to_memory(row: &rusqlite::Row) -> rusqlite::Result<Memory> {
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(Memory {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            context: row.get(3)?,
            tag: row.get(4)?,
            detail: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (db, dir)
    }

    fn fields(title: &str, context: &str, tag: &str, detail: &str) -> MemoryFields {
        MemoryFields {
            title: title.to_string(),
            context: context.to_string(),
            tag: tag.to_string(),
            detail: detail.to_string(),
        }
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let (db, _dir) = test_db();
        let user = db.create_user("alice", "hash").unwrap();

        let created = db
            .create_memory(&user.id, &fields("Trip", "Planning", "travel", "Pack light"))
            .unwrap();
        assert!(!created.id.is_empty());

        let fetched = db.get_memory(&user.id, &created.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Trip");
        assert_eq!(fetched.context, "Planning");
        assert_eq!(fetched.tag, "travel");
        assert_eq!(fetched.detail, "Pack light");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.user_id, user.id);
    }

    #[test]
    fn test_list_is_newest_first() {
        let (db, _dir) = test_db();
        let user = db.create_user("alice", "hash").unwrap();

        db.create_memory(&user.id, &fields("first", "", "", "")).unwrap();
        db.create_memory(&user.id, &fields("second", "", "", "")).unwrap();
        db.create_memory(&user.id, &fields("third", "", "", "")).unwrap();

        let memories = db.list_memories(&user.id, None).unwrap();
        let titles: Vec<&str> = memories.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_search_single_field_and_all() {
        let (db, _dir) = test_db();
        let user = db.create_user("alice", "hash").unwrap();

        db.create_memory(&user.id, &fields("Project plan", "", "", "")).unwrap();
        db.create_memory(&user.id, &fields("Groceries", "project sync notes", "", ""))
            .unwrap();
        db.create_memory(&user.id, &fields("Misc", "", "project", "")).unwrap();
        db.create_memory(&user.id, &fields("Ideas", "", "", "side project list"))
            .unwrap();
        db.create_memory(&user.id, &fields("Unrelated", "", "", "")).unwrap();

        // Scoped to title: case-insensitive substring, single field only
        let by_title = db
            .list_memories(&user.id, Some(("Project", FieldFilter::Title)))
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Project plan");

        // "all" is a union across title/context/tag/detail
        let all = db
            .list_memories(&user.id, Some(("Project", FieldFilter::All)))
            .unwrap();
        assert_eq!(all.len(), 4);

        let none = db
            .list_memories(&user.id, Some(("zzz", FieldFilter::All)))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_foreign_owner_is_not_found() {
        let (db, _dir) = test_db();
        let alice = db.create_user("alice", "hash").unwrap();
        let bob = db.create_user("bob", "hash").unwrap();

        let memory = db.create_memory(&alice.id, &fields("Secret", "", "", "")).unwrap();

        assert!(db.get_memory(&bob.id, &memory.id).unwrap().is_none());
        assert!(db
            .update_memory(&bob.id, &memory.id, &fields("Stolen", "", "", ""))
            .unwrap()
            .is_none());
        assert!(!db.delete_memory(&bob.id, &memory.id).unwrap());

        // Alice's record is untouched
        let intact = db.get_memory(&alice.id, &memory.id).unwrap().unwrap();
        assert_eq!(intact.title, "Secret");
    }

    #[test]
    fn test_update_replaces_fields_wholesale() {
        let (db, _dir) = test_db();
        let user = db.create_user("alice", "hash").unwrap();

        let memory = db
            .create_memory(&user.id, &fields("Trip", "Planning", "travel", "Pack light"))
            .unwrap();

        // Omitted optional fields arrive as empty strings and are written back empty
        let updated = db
            .update_memory(&user.id, &memory.id, &fields("Trip v2", "", "", ""))
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Trip v2");
        assert_eq!(updated.context, "");
        assert_eq!(updated.tag, "");
        assert_eq!(updated.detail, "");
        assert_eq!(updated.created_at, memory.created_at);
        assert!(updated.updated_at >= memory.updated_at);

        assert!(db
            .update_memory(&user.id, "no-such-id", &fields("x", "", "", ""))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_memory() {
        let (db, _dir) = test_db();
        let user = db.create_user("alice", "hash").unwrap();
        let memory = db.create_memory(&user.id, &fields("Trip", "", "", "")).unwrap();

        assert!(db.delete_memory(&user.id, &memory.id).unwrap());
        assert!(db.get_memory(&user.id, &memory.id).unwrap().is_none());
        assert!(!db.delete_memory(&user.id, &memory.id).unwrap());
    }

    #[test]
    fn test_count_memories() {
        let (db, _dir) = test_db();
        let alice = db.create_user("alice", "hash").unwrap();
        let bob = db.create_user("bob", "hash").unwrap();

        db.create_memory(&alice.id, &fields("a", "", "", "")).unwrap();
        db.create_memory(&alice.id, &fields("b", "", "", "")).unwrap();
        db.create_memory(&bob.id, &fields("c", "", "", "")).unwrap();

        assert_eq!(db.count_memories(&alice.id).unwrap(), 2);
        assert_eq!(db.count_memories(&bob.id).unwrap(), 1);
    }
}

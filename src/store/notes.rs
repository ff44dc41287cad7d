use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::db::Db;
use crate::error::AppResult;

/// A stored note. `owner_id` is set once at creation from verified token
/// claims and never reassigned.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
}

/// Every query below carries the owner filter in the SQL itself. That filter
/// is the authorization boundary for notes; `owner_id` must always be the
/// server-derived caller identity, never client input.
impl Db {
    pub fn create_note(&self, owner_id: &str, title: &str, content: &str) -> AppResult<Note> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notes (id, owner_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![note.id, note.owner_id, note.title, note.content, note.created_at],
        )?;
        Ok(note)
    }

    /// All notes belonging to the owner, no ordering guarantee.
    pub fn list_notes_by_owner(&self, owner_id: &str) -> AppResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, title, content, created_at FROM notes WHERE owner_id = ?1",
        )?;
        let rows = stmt.query_map(rusqlite::params![owner_id], |row| {
            Ok(Note {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    /// Returns false when nothing matched, which covers both "no such note"
    /// and "someone else's note" without distinguishing them.
    pub fn delete_note_by_owner_and_id(&self, owner_id: &str, note_id: &str) -> AppResult<bool> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND owner_id = ?2",
            rusqlite::params![note_id, owner_id],
        )?;
        Ok(affected > 0)
    }
}

// src/sessions/store.rs — SQLite operations

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{MessageRow, NewMessage, SessionRow};

/// Fixed-width UTC timestamp, so text order matches time order.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Low-level SQLite operations for chat sessions and their messages.
pub struct Store {
    conn: Connection,
}

fn session_from_row(r: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        title: r.get(2)?,
        created_at: r.get(3)?,
        updated_at: r.get(4)?,
    })
}

fn message_from_row(r: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: r.get(0)?,
        session_id: r.get(1)?,
        sender: r.get(2)?,
        content: r.get(3)?,
        provider: r.get(4)?,
        model: r.get(5)?,
        created_at: r.get(6)?,
    })
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Sessions --

    pub fn create_session(&self, user_id: &str, title: &str) -> anyhow::Result<SessionRow> {
        let now = timestamp();
        self.conn.execute(
            "INSERT INTO chat_sessions (user_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![user_id, title, now],
        )?;
        Ok(SessionRow {
            id: self.conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Most recently updated first.
    pub fn list_sessions(&self, user_id: &str) -> anyhow::Result<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, created_at, updated_at
             FROM chat_sessions WHERE user_id = ?1
             ORDER BY updated_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_session(&self, id: i64) -> anyhow::Result<Option<SessionRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM chat_sessions WHERE id = ?1",
                params![id],
                session_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Returns false when no such session exists.
    pub fn update_title(&self, id: i64, title: &str) -> anyhow::Result<bool> {
        let now = timestamp();
        let changed = self.conn.execute(
            "UPDATE chat_sessions SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![title, now, id],
        )?;
        Ok(changed > 0)
    }

    /// Deletes the session and its messages. Returns false when absent.
    pub fn delete_session(&self, id: i64) -> anyhow::Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM chat_sessions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // -- Messages --

    /// Appends to the session and bumps its `updated_at`. `None` when the
    /// session does not exist.
    pub fn insert_message(
        &self,
        session_id: i64,
        message: &NewMessage,
    ) -> anyhow::Result<Option<MessageRow>> {
        let now = timestamp();
        let tx = self.conn.unchecked_transaction()?;

        let touched = tx.execute(
            "UPDATE chat_sessions SET updated_at = ?1 WHERE id = ?2",
            params![now, session_id],
        )?;
        if touched == 0 {
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO session_messages (session_id, sender, content, provider, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session_id,
                message.sender.as_str(),
                message.content,
                message.provider,
                message.model,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some(MessageRow {
            id,
            session_id,
            sender: message.sender.as_str().to_string(),
            content: message.content.clone(),
            provider: message.provider.clone(),
            model: message.model.clone(),
            created_at: now,
        }))
    }

    /// Oldest first. `None` when the session does not exist.
    pub fn list_messages(&self, session_id: i64) -> anyhow::Result<Option<Vec<MessageRow>>> {
        if self.get_session(session_id)?.is_none() {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, sender, content, provider, model, created_at
             FROM session_messages WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(rows))
    }
}

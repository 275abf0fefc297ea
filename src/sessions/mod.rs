// src/sessions/mod.rs — Persistent chat session history (SQLite)

pub mod schema;
pub mod store;
pub mod store_server;

use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

use crate::infra::errors::BoomError;

pub use store::Store;
pub use store_server::{spawn_store_server, SessionStoreHandle};

pub const DEFAULT_TITLE: &str = "Новый чат";
pub const DEFAULT_USER_ID: &str = "1";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub id: i64,
    pub session_id: i64,
    pub sender: String,
    pub content: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

impl FromStr for Sender {
    type Err = BoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "ai" => Ok(Sender::Ai),
            other => Err(BoomError::Validation(format!(
                "sender must be 'user' or 'ai', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: Sender,
    pub content: String,
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            provider: None,
            model: None,
        }
    }

    pub fn ai(
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sender: Sender::Ai,
            content: content.into(),
            provider: Some(provider.into()),
            model: Some(model.into()),
        }
    }
}

/// Open (or create) the database at the given path.
pub fn open(path: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}

/// Create an in-memory database (for testing).
pub fn open_in_memory() -> anyhow::Result<Store> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}

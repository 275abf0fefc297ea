// src/sessions/store_server.rs — Async message passing for the session Store

use tokio::sync::{mpsc, oneshot};

use super::store::Store;
use super::{MessageRow, NewMessage, SessionRow};

pub type Reply<T> = oneshot::Sender<anyhow::Result<T>>;

#[derive(Debug)]
pub enum StoreCommand {
    CreateSession {
        user_id: String,
        title: String,
        resp: Reply<SessionRow>,
    },
    ListSessions {
        user_id: String,
        resp: Reply<Vec<SessionRow>>,
    },
    GetSession {
        id: i64,
        resp: Reply<Option<SessionRow>>,
    },
    UpdateTitle {
        id: i64,
        title: String,
        resp: Reply<bool>,
    },
    DeleteSession {
        id: i64,
        resp: Reply<bool>,
    },
    InsertMessage {
        session_id: i64,
        message: NewMessage,
        resp: Reply<Option<MessageRow>>,
    },
    ListMessages {
        session_id: i64,
        resp: Reply<Option<Vec<MessageRow>>>,
    },
}

/// A handle to the session Store that uses message passing.
#[derive(Clone)]
pub struct SessionStoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl SessionStoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> StoreCommand,
    ) -> anyhow::Result<T> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(build(resp_tx))
            .await
            .map_err(|_| anyhow::anyhow!("session store is not running"))?;
        resp_rx.await?
    }

    pub async fn create_session(&self, user_id: &str, title: &str) -> anyhow::Result<SessionRow> {
        let (user_id, title) = (user_id.to_string(), title.to_string());
        self.request(|resp| StoreCommand::CreateSession {
            user_id,
            title,
            resp,
        })
        .await
    }

    pub async fn list_sessions(&self, user_id: &str) -> anyhow::Result<Vec<SessionRow>> {
        let user_id = user_id.to_string();
        self.request(|resp| StoreCommand::ListSessions { user_id, resp })
            .await
    }

    pub async fn get_session(&self, id: i64) -> anyhow::Result<Option<SessionRow>> {
        self.request(|resp| StoreCommand::GetSession { id, resp })
            .await
    }

    pub async fn update_title(&self, id: i64, title: &str) -> anyhow::Result<bool> {
        let title = title.to_string();
        self.request(|resp| StoreCommand::UpdateTitle { id, title, resp })
            .await
    }

    pub async fn delete_session(&self, id: i64) -> anyhow::Result<bool> {
        self.request(|resp| StoreCommand::DeleteSession { id, resp })
            .await
    }

    pub async fn insert_message(
        &self,
        session_id: i64,
        message: NewMessage,
    ) -> anyhow::Result<Option<MessageRow>> {
        self.request(|resp| StoreCommand::InsertMessage {
            session_id,
            message,
            resp,
        })
        .await
    }

    pub async fn list_messages(&self, session_id: i64) -> anyhow::Result<Option<Vec<MessageRow>>> {
        self.request(|resp| StoreCommand::ListMessages { session_id, resp })
            .await
    }
}

/// Spawn the background task that owns the Store and return a handle.
pub fn spawn_store_server(store: Store) -> (SessionStoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = SessionStoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::CreateSession {
                user_id,
                title,
                resp,
            } => {
                let _ = resp.send(store.create_session(&user_id, &title));
            }
            StoreCommand::ListSessions { user_id, resp } => {
                let _ = resp.send(store.list_sessions(&user_id));
            }
            StoreCommand::GetSession { id, resp } => {
                let _ = resp.send(store.get_session(id));
            }
            StoreCommand::UpdateTitle { id, title, resp } => {
                let _ = resp.send(store.update_title(id, &title));
            }
            StoreCommand::DeleteSession { id, resp } => {
                let _ = resp.send(store.delete_session(id));
            }
            StoreCommand::InsertMessage {
                session_id,
                message,
                resp,
            } => {
                let _ = resp.send(store.insert_message(session_id, &message));
            }
            StoreCommand::ListMessages { session_id, resp } => {
                let _ = resp.send(store.list_messages(session_id));
            }
        }
    }
    tracing::debug!("Session store server stopped");
}

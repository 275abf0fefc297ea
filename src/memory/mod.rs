// src/memory/mod.rs — Per-user conversation memory
//
// In-process only. Every operation is one short critical section under a
// std Mutex; nothing awaits while the lock is held.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::infra::config::MemoryConfig;
use crate::provider::cascade::LOCAL_FALLBACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    pub provider: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            provider: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            provider: Some(provider.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub user_id: String,
    pub turns: VecDeque<ConversationTurn>,
    pub last_provider: Option<String>,
    pub last_activity: DateTime<Utc>,
}

impl Conversation {
    fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            turns: VecDeque::new(),
            last_provider: None,
            last_activity: now,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MemoryLimits {
    pub max_turns: usize,
    pub context_turns: usize,
    pub sticky_window: Duration,
    pub max_idle: Duration,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self::from(&MemoryConfig::default())
    }
}

impl From<&MemoryConfig> for MemoryLimits {
    fn from(config: &MemoryConfig) -> Self {
        Self {
            max_turns: config.max_turns.max(1),
            context_turns: config.context_turns,
            sticky_window: config.sticky_window(),
            max_idle: config.max_idle(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub turn_count: usize,
    pub last_provider: Option<String>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub active_conversations: usize,
    pub users: Vec<UserStats>,
}

/// Cloneable handle; clones share the same map.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<HashMap<String, Conversation>>>,
    limits: MemoryLimits,
}

impl ConversationStore {
    pub fn new(limits: MemoryLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            limits,
        }
    }

    pub fn limits(&self) -> MemoryLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
        // Poisoning is ignored: each update leaves the map consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a turn, evicting the oldest past `max_turns`.
    pub fn append(&self, user_id: &str, turn: ConversationTurn) {
        let mut map = self.lock();
        let conv = map
            .entry(user_id.to_string())
            .or_insert_with(|| Conversation::new(user_id, turn.timestamp));

        conv.last_activity = turn.timestamp;
        if turn.role == TurnRole::Assistant {
            if let Some(provider) = turn.provider.as_deref().filter(|p| *p != LOCAL_FALLBACK) {
                conv.last_provider = Some(provider.to_string());
            }
        }

        conv.turns.push_back(turn);
        while conv.turns.len() > self.limits.max_turns {
            conv.turns.pop_front();
        }
    }

    /// Last few turns rendered as `User: ...` / `AI: ...` lines.
    pub fn context_prefix(&self, user_id: &str) -> String {
        let map = self.lock();
        let Some(conv) = map.get(user_id) else {
            return String::new();
        };

        let skip = conv.turns.len().saturating_sub(self.limits.context_turns);
        let mut out = String::new();
        for turn in conv.turns.iter().skip(skip) {
            let speaker = match turn.role {
                TurnRole::User => "User",
                TurnRole::Assistant => "AI",
            };
            out.push_str(speaker);
            out.push_str(": ");
            out.push_str(&turn.content);
            out.push('\n');
        }
        out
    }

    pub fn should_stick_to_provider(&self, user_id: &str) -> bool {
        self.sticky_provider_at(user_id, Utc::now()).is_some()
    }

    /// The provider that last answered, if the conversation is still warm.
    pub fn sticky_provider(&self, user_id: &str) -> Option<String> {
        self.sticky_provider_at(user_id, Utc::now())
    }

    pub fn sticky_provider_at(&self, user_id: &str, now: DateTime<Utc>) -> Option<String> {
        let map = self.lock();
        let conv = map.get(user_id)?;
        if now - conv.last_activity < self.limits.sticky_window {
            conv.last_provider.clone()
        } else {
            None
        }
    }

    /// Drop conversations idle longer than `max_idle`. Returns how many went.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, conv| now - conv.last_activity <= self.limits.max_idle);
        before - map.len()
    }

    /// Run `sweep` every `interval` on its own task.
    pub fn spawn_sweeper(&self, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        // tokio intervals panic on a zero period.
        let interval = interval.max(std::time::Duration::from_millis(1));
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                let removed = store.sweep();
                if removed > 0 {
                    tracing::info!(removed, "Swept idle conversations");
                }
            }
        })
    }

    /// Forget a user's conversation. Returns whether one existed.
    pub fn reset(&self, user_id: &str) -> bool {
        self.lock().remove(user_id).is_some()
    }

    pub fn turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.lock()
            .get(user_id)
            .map(|c| c.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> ConversationStats {
        let map = self.lock();
        let mut users: Vec<UserStats> = map
            .values()
            .map(|conv| UserStats {
                user_id: conv.user_id.clone(),
                turn_count: conv.turns.len(),
                last_provider: conv.last_provider.clone(),
                last_activity: conv.last_activity,
            })
            .collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        ConversationStats {
            active_conversations: users.len(),
            users,
        }
    }
}

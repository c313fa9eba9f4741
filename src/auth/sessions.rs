//! Session records and the in-memory [`SessionStore`].
//!
//! Stores are keyed by `sha256(token)`; the raw token never reaches them.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Minimal data kept for a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: i64,
    pub created_at_unix: i64,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session; returns `false` if the token hash is already taken.
    async fn insert(&self, token_hash: &[u8], record: SessionRecord) -> Result<bool>;
    async fn lookup(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>>;
    /// Remove a session, returning what was removed. Missing sessions are `Ok(None)`.
    async fn delete(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>>;
    /// Remove every session created at or before `cutoff_unix`.
    async fn purge_created_before(&self, cutoff_unix: i64) -> Result<u64>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Vec<u8>, SessionRecord>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, token_hash: &[u8], record: SessionRecord) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(token_hash) {
            return Ok(false);
        }
        sessions.insert(token_hash.to_vec(), record);
        Ok(true)
    }

    async fn lookup(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(token_hash).copied())
    }

    async fn delete(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.write().await.remove(token_hash))
    }

    async fn purge_created_before(&self, cutoff_unix: i64) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.created_at_unix > cutoff_unix);
        Ok(u64::try_from(before - sessions.len()).unwrap_or(u64::MAX))
    }
}

//! Checkpoint backend implementations.

use crate::agent::ConversationState;
use crate::error::{Error, ErrorContext};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct CheckpointEntry {
    /// Serialized transcript; opaque to the store.
    data: Vec<u8>,
    version: u64,
    /// Store-wide write sequence number, used for eviction order.
    last_updated: u64,
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<ConversationState>>;
    async fn put(&self, session_id: &str, state: &ConversationState) -> Result<()>;
    async fn delete(&self, session_id: &str) -> Result<bool>;
    async fn list(&self) -> Result<Vec<String>>;
    fn name(&self) -> &'static str;
}

/// In-memory store. When `max_sessions` is reached, the least recently
/// updated session is evicted.
pub struct MemoryCheckpointStore {
    entries: Arc<RwLock<HashMap<String, CheckpointEntry>>>,
    max_sessions: Option<usize>,
    clock: AtomicU64,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: None,
            clock: AtomicU64::new(0),
        }
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: Some(max_sessions.max(1)),
            clock: AtomicU64::new(0),
        }
    }

    /// Number of times a session has been written.
    pub async fn version(&self, session_id: &str) -> Option<u64> {
        self.entries.read().await.get(session_id).map(|e| e.version)
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CheckpointEntry>, incoming: &str) {
        let Some(max) = self.max_sessions else {
            return;
        };
        while entries.len() >= max && !entries.contains_key(incoming) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_updated)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, session_id: &str) -> Result<Option<ConversationState>> {
        let entries = self.entries.read().await;
        match entries.get(session_id) {
            None => Ok(None),
            Some(entry) => serde_json::from_slice(&entry.data).map(Some).map_err(|e| {
                Error::checkpoint_with_context(
                    "stored checkpoint could not be restored",
                    ErrorContext::new()
                        .with_field_path(session_id)
                        .with_details(e.to_string())
                        .with_source(self.name()),
                )
            }),
        }
    }

    async fn put(&self, session_id: &str, state: &ConversationState) -> Result<()> {
        let data = serde_json::to_vec(state)?;
        let mut entries = self.entries.write().await;
        self.evict_if_needed(&mut entries, session_id);
        let version = entries.get(session_id).map(|e| e.version + 1).unwrap_or(1);
        entries.insert(
            session_id.to_string(),
            CheckpointEntry {
                data,
                version,
                last_updated: self.clock.fetch_add(1, Ordering::Relaxed),
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(session_id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub struct NullCheckpointStore;
impl NullCheckpointStore {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for NullCheckpointStore {
    async fn get(&self, _: &str) -> Result<Option<ConversationState>> {
        Ok(None)
    }
    async fn put(&self, _: &str, _: &ConversationState) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &str) -> Result<bool> {
        Ok(false)
    }
    async fn list(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

//! Session checkpoints: snapshots of a conversation keyed by session id.
//!
//! # Checkpoint Module
//!
//! A checkpoint lets a conversation resume across calls within the same
//! process. Only the transcript is stored; configuration and credentials
//! never enter a checkpoint.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CheckpointStore`] | Trait for checkpoint backends |
//! | [`MemoryCheckpointStore`] | In-process store with an optional session cap |
//! | [`NullCheckpointStore`] | No-op store for stateless use |
//!
//! ## Example
//!
//! ```rust
//! use health_metrics_agent::checkpoint::{CheckpointStore, MemoryCheckpointStore};
//! use health_metrics_agent::agent::ConversationState;
//! use health_metrics_agent::Message;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryCheckpointStore::new();
//! let mut state = ConversationState::new();
//! state.push(Message::user("hello")).unwrap();
//! store.put("session-1", &state).await.unwrap();
//! assert_eq!(store.get("session-1").await.unwrap(), Some(state));
//! # }
//! ```

mod backend;

pub use backend::{CheckpointStore, MemoryCheckpointStore, NullCheckpointStore};

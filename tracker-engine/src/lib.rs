//! Reconciliation engine for offline-first completion tracking.
//!
//! Merges a bulk problem dataset with a completion overlay drawn from three
//! sources (record store, local durable cache, in-memory edits), projects a
//! filtered/sorted/paginated view, and writes toggled flags back to a
//! pluggable record store with durability across session end.
//!
//! # Example
//! ```rust
//! use tracker_engine::{
//!     Difficulty, EngineConfig, MemoryCache, MemoryStore, ProblemRecord,
//!     ReconcileEngine, RecordStore,
//! };
//!
//! let mut store = MemoryStore::new();
//! store.upsert_record(&ProblemRecord {
//!     id: "1".to_string(),
//!     title: "Two Sum".to_string(),
//!     acceptance: "49.1%".to_string(),
//!     difficulty: Difficulty::Easy,
//!     frequency: 100.0,
//!     link: "https://leetcode.com/problems/two-sum".to_string(),
//!     done: false,
//! }).unwrap();
//!
//! let mut engine = ReconcileEngine::new(store, MemoryCache::new(), EngineConfig::default());
//! engine.load_from_store().unwrap();
//!
//! // The toggle is durable immediately; the write-back happens on flush.
//! engine.toggle("1", true);
//! engine.flush_tick();
//!
//! assert!(engine.page().rows[0].done);
//! assert_eq!(engine.summary().easy.done, 1);
//! ```

mod cache;
mod config;
mod engine;
mod error;
mod loader;
mod overlay;
mod record;
mod store;
mod view;

pub use cache::{DurableCache, FileCache, MemoryCache};
pub use config::{EngineConfig, RetryPolicy};
pub use engine::ReconcileEngine;
pub use error::{Error, Result};
pub use loader::{BulkSource, JsonDataset, StoreSource};
pub use overlay::{CompletionOverlay, FlushState, WriteQueue};
pub use record::{Difficulty, ProblemRecord};
#[cfg(feature = "rest")]
pub use store::RestStore;
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use store::{now_millis, MemoryStore, RecordStore};
pub use view::{
    project, summarize, DerivedPage, DerivedRow, DifficultyCount, SortDir, SortKey, Summary,
    ViewFilter,
};

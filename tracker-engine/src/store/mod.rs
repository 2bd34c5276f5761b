mod memory;
#[cfg(feature = "rest")]
mod rest;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "rest")]
pub use rest::RestStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::collections::HashMap;

use crate::error::Result;
use crate::record::ProblemRecord;

/// The record store seam: one trait over the direct-client and
/// server-mediated backend paths so the engine never duplicates logic
/// per backend.
pub trait RecordStore {
    /// The complete problem set, one large batch.
    fn fetch_all(&self) -> Result<Vec<ProblemRecord>>;

    /// Batch read of completion flags. Ids absent from the store are
    /// simply absent from the map; the caller defaults them to false.
    fn fetch_done(&self, ids: &[String]) -> Result<HashMap<String, bool>>;

    /// Per-id upsert of the done flag, merged into the existing record
    /// without touching other fields.
    fn write_done(&mut self, id: &str, done: bool) -> Result<()>;

    /// Full-record upsert for seeding; preserves an existing done flag.
    fn upsert_record(&mut self, record: &ProblemRecord) -> Result<()>;
}

pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

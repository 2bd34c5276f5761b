use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::record::ProblemRecord;
use crate::store::RecordStore;

/// Bulk loader seam: the complete problem set, fetched once per session.
/// Implementations must not partially apply; on failure the caller keeps
/// its previous record set.
pub trait BulkSource {
    fn load(&self) -> Result<Vec<ProblemRecord>>;
}

/// Static JSON dataset file, an array of records in wire shape.
pub struct JsonDataset {
    path: PathBuf,
}

impl JsonDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BulkSource for JsonDataset {
    fn load(&self) -> Result<Vec<ProblemRecord>> {
        let bytes = fs::read(&self.path)
            .map_err(|e| Error::Load(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Load(format!("{}: {}", self.path.display(), e)))
    }
}

/// One large batch from a record store backend.
pub struct StoreSource<'a, S: RecordStore> {
    store: &'a S,
}

impl<'a, S: RecordStore> StoreSource<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: RecordStore> BulkSource for StoreSource<'_, S> {
    fn load(&self) -> Result<Vec<ProblemRecord>> {
        self.store.fetch_all().map_err(|e| Error::Load(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Difficulty;
    use crate::store::MemoryStore;

    #[test]
    fn test_json_dataset_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.json");
        std::fs::write(
            &path,
            r#"[{
                "ID": "1",
                "Title": "Two Sum",
                "Acceptance": "49.1%",
                "Difficulty": "Easy",
                "Frequency": 100.0,
                "Leetcode Question Link": "https://leetcode.com/problems/two-sum"
            }]"#,
        )
        .unwrap();

        let records = JsonDataset::new(&path).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_missing_dataset_is_a_load_error() {
        let err = JsonDataset::new("/nonexistent/problems.json").load().unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_malformed_dataset_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.json");
        std::fs::write(&path, "[{\"ID\": 1}]").unwrap();
        assert!(matches!(JsonDataset::new(&path).load(), Err(Error::Load(_))));
    }

    #[test]
    fn test_store_source_delegates() {
        let mut store = MemoryStore::new();
        store
            .upsert_record(&ProblemRecord {
                id: "1".to_string(),
                title: "Two Sum".to_string(),
                acceptance: "49.1%".to_string(),
                difficulty: Difficulty::Easy,
                frequency: 100.0,
                link: String::new(),
                done: false,
            })
            .unwrap();

        let records = StoreSource::new(&store).load().unwrap();
        assert_eq!(records.len(), 1);
    }
}

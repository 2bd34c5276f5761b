use std::collections::HashMap;

use super::RecordStore;
use crate::error::Result;
use crate::record::{Difficulty, ProblemRecord};

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, ProblemRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(records: impl IntoIterator<Item = ProblemRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<ProblemRecord>> {
        let mut all: Vec<ProblemRecord> = self.records.values().cloned().collect();
        all.sort_by(|a, b| match (a.numeric_id(), b.numeric_id()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.id.cmp(&b.id),
        });
        Ok(all)
    }

    fn fetch_done(&self, ids: &[String]) -> Result<HashMap<String, bool>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| (id.clone(), r.done)))
            .collect())
    }

    fn write_done(&mut self, id: &str, done: bool) -> Result<()> {
        self.records
            .entry(id.to_string())
            .or_insert_with(|| ProblemRecord {
                id: id.to_string(),
                title: String::new(),
                acceptance: String::new(),
                difficulty: Difficulty::Easy,
                frequency: 0.0,
                link: String::new(),
                done: false,
            })
            .done = done;
        Ok(())
    }

    fn upsert_record(&mut self, record: &ProblemRecord) -> Result<()> {
        match self.records.get_mut(&record.id) {
            Some(existing) => {
                let done = existing.done;
                *existing = record.clone();
                existing.done = done;
            }
            None => {
                self.records.insert(record.id.clone(), record.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> ProblemRecord {
        ProblemRecord {
            id: id.to_string(),
            title: format!("Problem {}", id),
            acceptance: "50.0%".to_string(),
            difficulty: Difficulty::Medium,
            frequency: 1.0,
            link: String::new(),
            done: false,
        }
    }

    #[test]
    fn test_fetch_all_sorted_numerically() {
        let store = MemoryStore::seeded([rec("10"), rec("2"), rec("1")]);
        let ids: Vec<String> =
            store.fetch_all().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["1", "2", "10"]);
    }

    #[test]
    fn test_write_done_and_batch_read() {
        let mut store = MemoryStore::seeded([rec("1"), rec("2")]);
        store.write_done("1", true).unwrap();

        let ids = vec!["1".to_string(), "2".to_string(), "missing".to_string()];
        let done = store.fetch_done(&ids).unwrap();
        assert_eq!(done.get("1"), Some(&true));
        assert_eq!(done.get("2"), Some(&false));
        assert!(!done.contains_key("missing"));
    }

    #[test]
    fn test_upsert_preserves_done() {
        let mut store = MemoryStore::seeded([rec("1")]);
        store.write_done("1", true).unwrap();

        let mut updated = rec("1");
        updated.title = "Renamed".to_string();
        store.upsert_record(&updated).unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all[0].title, "Renamed");
        assert!(all[0].done, "seeding must not clear the done flag");
    }
}

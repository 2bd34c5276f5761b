use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use super::RecordStore;
use crate::error::{Error, Result};
use crate::record::{Difficulty, ProblemRecord};

const INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS problems (
    id TEXT NOT NULL PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    acceptance TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT 'Easy',
    frequency REAL NOT NULL DEFAULT 0,
    link TEXT NOT NULL DEFAULT '',
    done INTEGER NOT NULL DEFAULT 0
) WITHOUT ROWID;

PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
"#;

/// Direct-client adapter: the record store is a local SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(INIT_SQL)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

impl RecordStore for SqliteStore {
    fn fetch_all(&self) -> Result<Vec<ProblemRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, acceptance, difficulty, frequency, link, done
             FROM problems ORDER BY CAST(id AS INTEGER), id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, title, acceptance, difficulty, frequency, link, done)| {
                Ok(ProblemRecord {
                    id,
                    title,
                    acceptance,
                    difficulty: Difficulty::from_str(&difficulty)?,
                    frequency,
                    link,
                    done: done != 0,
                })
            })
            .collect()
    }

    fn fetch_done(&self, ids: &[String]) -> Result<HashMap<String, bool>> {
        let wanted: HashSet<&str> = ids.iter().map(|s| s.as_str()).collect();
        let mut stmt = self.conn.prepare("SELECT id, done FROM problems")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .filter(|(id, _)| wanted.contains(id.as_str()))
            .collect())
    }

    fn write_done(&mut self, id: &str, done: bool) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO problems (id, done) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET done = excluded.done",
                params![id, done as i64],
            )
            .map_err(|e| Error::WriteBack { id: id.to_string(), reason: e.to_string() })?;
        Ok(())
    }

    fn upsert_record(&mut self, record: &ProblemRecord) -> Result<()> {
        // Seeding never clears a done flag already recorded for this id.
        self.conn.execute(
            "INSERT INTO problems (id, title, acceptance, difficulty, frequency, link, done)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 acceptance = excluded.acceptance,
                 difficulty = excluded.difficulty,
                 frequency = excluded.frequency,
                 link = excluded.link",
            params![
                record.id,
                record.title,
                record.acceptance,
                record.difficulty.as_str(),
                record.frequency,
                record.link,
                record.done as i64,
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, difficulty: Difficulty) -> ProblemRecord {
        ProblemRecord {
            id: id.to_string(),
            title: format!("Problem {}", id),
            acceptance: "48.2%".to_string(),
            difficulty,
            frequency: 2.5,
            link: format!("https://leetcode.com/problems/{}", id),
            done: false,
        }
    }

    #[test]
    fn test_seed_and_fetch_all() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.upsert_record(&rec("10", Difficulty::Hard)).unwrap();
        store.upsert_record(&rec("2", Difficulty::Easy)).unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "2", "numeric id ordering");
        assert_eq!(all[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_write_done_merges_without_clobbering() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.upsert_record(&rec("1", Difficulty::Easy)).unwrap();

        store.write_done("1", true).unwrap();

        let all = store.fetch_all().unwrap();
        assert!(all[0].done);
        assert_eq!(all[0].title, "Problem 1", "other fields untouched");

        let done = store
            .fetch_done(&["1".to_string(), "999".to_string()])
            .unwrap();
        assert_eq!(done.get("1"), Some(&true));
        assert!(!done.contains_key("999"));
    }

    #[test]
    fn test_write_done_upserts_missing_id() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.write_done("7", true).unwrap();
        let done = store.fetch_done(&["7".to_string()]).unwrap();
        assert_eq!(done.get("7"), Some(&true));
    }

    #[test]
    fn test_reseed_preserves_done() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.upsert_record(&rec("1", Difficulty::Easy)).unwrap();
        store.write_done("1", true).unwrap();

        let mut updated = rec("1", Difficulty::Easy);
        updated.title = "Renamed".to_string();
        store.upsert_record(&updated).unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all[0].title, "Renamed");
        assert!(all[0].done);
    }

    #[test]
    fn test_on_disk_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.db");
        let path = path.to_str().unwrap();

        {
            let mut store = SqliteStore::open(path).unwrap();
            store.upsert_record(&rec("1", Difficulty::Medium)).unwrap();
            store.write_done("1", true).unwrap();
        }

        let store = SqliteStore::open(path).unwrap();
        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].done);
    }
}

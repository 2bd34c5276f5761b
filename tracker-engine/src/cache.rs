use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::overlay::CompletionOverlay;

/// Durable local snapshot of the overlay. Writes are synchronous and must
/// complete before the caller tears down (the unload safety net).
pub trait DurableCache {
    /// Previously persisted snapshot; empty on first run.
    fn read(&self) -> Result<HashMap<String, bool>>;

    /// Persist the full overlay as one blob.
    fn write(&mut self, overlay: &CompletionOverlay) -> Result<()>;
}

/// Single JSON blob on disk, the local-storage analog.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableCache for FileCache {
    fn read(&self) -> Result<HashMap<String, bool>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(&self.path).map_err(|e| Error::Cache(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Cache(e.to_string()))
    }

    fn write(&mut self, overlay: &CompletionOverlay) -> Result<()> {
        let blob = serde_json::to_vec(overlay).map_err(|e| Error::Cache(e.to_string()))?;
        fs::write(&self.path, blob).map_err(|e| Error::Cache(e.to_string()))
    }
}

/// In-process cache for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: HashMap<String, bool>,
    pub writes: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: HashMap<String, bool>) -> Self {
        Self { snapshot, writes: 0 }
    }
}

impl DurableCache for MemoryCache {
    fn read(&self) -> Result<HashMap<String, bool>> {
        Ok(self.snapshot.clone())
    }

    fn write(&mut self, overlay: &CompletionOverlay) -> Result<()> {
        let blob = serde_json::to_vec(overlay).map_err(|e| Error::Cache(e.to_string()))?;
        self.snapshot = serde_json::from_slice(&blob).map_err(|e| Error::Cache(e.to_string()))?;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("overlay.json"));

        assert!(cache.read().unwrap().is_empty(), "absent snapshot reads empty");

        let mut overlay = CompletionOverlay::new();
        overlay.set("1", true);
        overlay.set("2", false);
        cache.write(&overlay).unwrap();

        let snapshot = cache.read().unwrap();
        assert_eq!(snapshot.get("1"), Some(&true));
        assert_eq!(snapshot.get("2"), Some(&false));
    }

    #[test]
    fn test_file_cache_overwrites_whole_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("overlay.json"));

        let mut overlay = CompletionOverlay::new();
        overlay.set("1", true);
        cache.write(&overlay).unwrap();

        let overlay = CompletionOverlay::new();
        cache.write(&overlay).unwrap();
        assert!(cache.read().unwrap().is_empty());
    }

    #[test]
    fn test_file_cache_corrupt_blob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.json");
        std::fs::write(&path, b"not json").unwrap();

        let cache = FileCache::new(&path);
        assert!(matches!(cache.read(), Err(Error::Cache(_))));
    }
}

use std::collections::HashMap;

use log::{debug, warn};

use crate::cache::DurableCache;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::loader::BulkSource;
use crate::overlay::{CompletionOverlay, FlushState, WriteQueue};
use crate::record::{Difficulty, ProblemRecord};
use crate::store::{now_millis, RecordStore};
use crate::view::{self, DerivedPage, SortDir, SortKey, Summary, ViewFilter};

/// The reconciliation core: merges the bulk record set with the completion
/// overlay, projects the derived page, and schedules write-backs of changed
/// flags with durability across session end.
///
/// All methods are synchronous; the host owns the two cadences and calls
/// `flush_tick` / `refresh` on the intervals in [`EngineConfig`], and
/// `session_end` before teardown.
pub struct ReconcileEngine<S: RecordStore, C: DurableCache> {
    store: S,
    cache: C,
    config: EngineConfig,
    records: Vec<ProblemRecord>,
    overlay: CompletionOverlay,
    queue: WriteQueue,
    filter: ViewFilter,
    sort_key: SortKey,
    sort_dir: SortDir,
    page_index: usize,
    page_size: usize,
    tick: u64,
}

impl<S: RecordStore, C: DurableCache> ReconcileEngine<S, C> {
    pub fn new(store: S, cache: C, config: EngineConfig) -> Self {
        let page_size = config.page_size;
        Self {
            store,
            cache,
            config,
            records: Vec::new(),
            overlay: CompletionOverlay::new(),
            queue: WriteQueue::new(),
            filter: ViewFilter::new(),
            sort_key: SortKey::Id,
            sort_dir: SortDir::Asc,
            page_index: 0,
            page_size,
            tick: 0,
        }
    }

    /// Replace the record set from a bulk source, then hydrate the overlay.
    /// On load failure the prior record set is retained unchanged.
    pub fn load(&mut self, source: &dyn BulkSource) -> Result<()> {
        let records = source.load()?;
        self.records = records;
        self.hydrate();
        Ok(())
    }

    /// Bulk-load straight from the backing store.
    pub fn load_from_store(&mut self) -> Result<()> {
        let records = self
            .store
            .fetch_all()
            .map_err(|e| Error::Load(e.to_string()))?;
        self.records = records;
        self.hydrate();
        Ok(())
    }

    /// Overlay = server state, overridden by the durable cache, overridden
    /// by unconfirmed in-memory edits. A hydrate failure falls back to the
    /// remaining sources and never blocks the session.
    fn hydrate(&mut self) {
        let ids = self.ids();
        let server = match self.store.fetch_done(&ids) {
            Ok(map) => map,
            Err(e) => {
                warn!("hydrate: batch read failed, using cached state only: {}", e);
                HashMap::new()
            }
        };
        let local = match self.cache.read() {
            Ok(map) => map,
            Err(e) => {
                warn!("hydrate: durable cache unreadable: {}", e);
                HashMap::new()
            }
        };
        let mut overlay =
            CompletionOverlay::from_sources(ids.iter().map(String::as_str), &server, &local);
        for (id, value) in self.queue.local_values() {
            overlay.set(id, value);
        }
        self.overlay = overlay;
    }

    /// User toggled a row. The overlay and durable cache are updated before
    /// this returns, regardless of network state; the write-back is queued
    /// for the next flush tick. Toggling never fails from the caller's view.
    pub fn toggle(&mut self, id: &str, value: bool) {
        self.overlay.set(id, value);
        self.queue.mark_pending(id, value, now_millis(), self.tick);
        self.persist_cache();
    }

    /// One flush cadence step: write back every eligible pending id.
    /// Returns the number of confirmed writes.
    pub fn flush_tick(&mut self) -> usize {
        let batch = self.begin_flush();
        let mut written = 0;
        for (id, value) in batch {
            let outcome = self.store.write_done(&id, value);
            if self.finish_write(&id, value, outcome) {
                written += 1;
            }
        }
        written
    }

    /// First half of a flush step: advance the tick and move eligible
    /// entries in flight. Split from [`finish_write`] so interleavings with
    /// concurrent toggles stay observable.
    pub fn begin_flush(&mut self) -> Vec<(String, bool)> {
        self.tick += 1;
        self.queue.begin_flush(self.tick, false)
    }

    /// Resolve one in-flight write-back. A success for a value the user has
    /// since toggled away re-marks the id pending, so the newest value is
    /// still delivered; a failure goes back to pending for a later tick.
    pub fn finish_write(&mut self, id: &str, sent: bool, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => {
                let cleared = self.queue.complete_success(id, sent, self.tick);
                if !cleared {
                    debug!("flush: {} toggled while in flight, re-queued", id);
                }
                cleared
            }
            Err(e) => {
                warn!("flush: {}; retrying on a later tick", e);
                self.queue.complete_failure(id, self.config.retry, self.tick);
                false
            }
        }
    }

    /// Refresh cadence step: re-adopt server flags for every id without an
    /// unconfirmed local edit. Local edits are never clobbered.
    pub fn refresh(&mut self) {
        let ids = self.ids();
        match self.store.fetch_done(&ids) {
            Ok(server) => {
                for id in &ids {
                    if !self.queue.is_local(id) {
                        self.overlay.set(id, server.get(id).copied().unwrap_or(false));
                    }
                }
                self.persist_cache();
            }
            Err(e) => warn!("refresh: batch read failed, keeping current state: {}", e),
        }
    }

    /// Unload contract: flush every pending id ignoring retry backoff, then
    /// persist the overlay. Safe to call repeatedly.
    pub fn session_end(&mut self) {
        let batch = self.queue.begin_flush(self.tick, true);
        for (id, value) in batch {
            let outcome = self.store.write_done(&id, value);
            self.finish_write(&id, value, outcome);
        }
        self.persist_cache();
    }

    fn persist_cache(&mut self) {
        if let Err(e) = self.cache.write(&self.overlay) {
            warn!("durable cache write failed: {}", e);
        }
    }

    fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    // ---- view intents ----

    pub fn toggle_filter(&mut self, difficulty: Difficulty) {
        self.filter.toggle(difficulty);
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, key: SortKey, dir: SortDir) {
        self.sort_key = key;
        self.sort_dir = dir;
    }

    pub fn set_page(&mut self, index: usize) {
        self.page_index = index;
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size;
    }

    /// The derived page for the current view state.
    pub fn page(&self) -> DerivedPage {
        view::project(
            &self.records,
            &self.overlay,
            &self.filter,
            self.sort_key,
            self.sort_dir,
            self.page_index,
            self.page_size,
        )
    }

    pub fn summary(&self) -> Summary {
        view::summarize(&self.records, &self.overlay)
    }

    // ---- read surfaces ----

    pub fn records(&self) -> &[ProblemRecord] {
        &self.records
    }

    pub fn overlay(&self) -> &CompletionOverlay {
        &self.overlay
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn state_of(&self, id: &str) -> FlushState {
        self.queue.state(id)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.pending_len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

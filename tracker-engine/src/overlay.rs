use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RetryPolicy;

/// Best-known completion flag per problem id, merged from server state,
/// the local durable cache, and in-memory edits. Serializes as a plain
/// id -> bool map, which is also the durable cache blob format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionOverlay {
    done: HashMap<String, bool>,
}

impl CompletionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup merge: server state overridden pointwise by the durable
    /// cache (local edits made since the last sync win). Only ids in the
    /// current record set are kept; absent everywhere resolves to false.
    pub fn from_sources<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        server: &HashMap<String, bool>,
        local: &HashMap<String, bool>,
    ) -> Self {
        let done = ids
            .into_iter()
            .map(|id| {
                let resolved = local
                    .get(id)
                    .or_else(|| server.get(id))
                    .copied()
                    .unwrap_or(false);
                (id.to_string(), resolved)
            })
            .collect();
        Self { done }
    }

    pub fn get(&self, id: &str) -> bool {
        self.done.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: &str, value: bool) {
        self.done.insert(id.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn done_count(&self) -> usize {
        self.done.values().filter(|v| **v).count()
    }
}

/// Per-id write-back state. Absent from the queue means `Synced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    Synced,
    PendingWrite,
    Flushing,
}

#[derive(Debug, Clone)]
struct QueueEntry {
    /// Latest toggled value; overwritten by later toggles (last-write-wins).
    value: bool,
    /// Wall-clock millis of the most recent toggle.
    queued_at: u64,
    /// Consecutive write-back failures since the last success.
    attempts: u32,
    /// First flush tick at which this entry may be sent again.
    eligible_at: u64,
    /// Value currently in flight, when a write-back has been issued.
    in_flight: Option<bool>,
}

/// Outbound write-back queue: at most one entry per id, cleared only on a
/// confirmed write of the entry's latest value.
#[derive(Debug, Clone, Default)]
pub struct WriteQueue {
    entries: HashMap<String, QueueEntry>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &str) -> FlushState {
        match self.entries.get(id) {
            None => FlushState::Synced,
            Some(e) if e.in_flight.is_some() => FlushState::Flushing,
            Some(_) => FlushState::PendingWrite,
        }
    }

    /// True while a local edit for `id` has not been confirmed upstream.
    /// Refresh must not clobber these ids.
    pub fn is_local(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn pending_len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest unconfirmed value per id, for re-applying local edits on top
    /// of a hydrate.
    pub fn local_values(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e.value))
    }

    /// Wall-clock millis of the most recent toggle still awaiting
    /// confirmation for `id`.
    pub fn queued_at(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|e| e.queued_at)
    }

    /// Record a toggle. A toggle while the id is in flight overwrites the
    /// queued value but leaves the in-flight marker alone; the completion
    /// handler re-marks the id if the confirmed value is already stale.
    pub fn mark_pending(&mut self, id: &str, value: bool, now_ms: u64, tick: u64) {
        match self.entries.get_mut(id) {
            Some(e) => {
                e.value = value;
                e.queued_at = now_ms;
            }
            None => {
                self.entries.insert(
                    id.to_string(),
                    QueueEntry {
                        value,
                        queued_at: now_ms,
                        attempts: 0,
                        eligible_at: tick,
                        in_flight: None,
                    },
                );
            }
        }
    }

    /// Move every eligible pending entry to `Flushing` and return the
    /// (id, value) pairs owed a write-back. `force` ignores retry backoff
    /// (session end).
    pub fn begin_flush(&mut self, tick: u64, force: bool) -> Vec<(String, bool)> {
        let mut batch = Vec::new();
        for (id, e) in self.entries.iter_mut() {
            if e.in_flight.is_none() && (force || e.eligible_at <= tick) {
                e.in_flight = Some(e.value);
                batch.push((id.clone(), e.value));
            }
        }
        batch.sort();
        batch
    }

    /// A write-back for `id` confirmed `sent`. Returns true when the entry
    /// was cleared; false when a newer toggle arrived while in flight and
    /// the id was re-marked pending so the newer value still gets flushed.
    pub fn complete_success(&mut self, id: &str, sent: bool, tick: u64) -> bool {
        let Some(e) = self.entries.get_mut(id) else {
            return true;
        };
        e.in_flight = None;
        if e.value == sent {
            self.entries.remove(id);
            true
        } else {
            e.attempts = 0;
            e.eligible_at = tick;
            false
        }
    }

    /// A write-back for `id` failed: back to pending, retried on a later
    /// tick per the retry policy. The edit is never dropped.
    pub fn complete_failure(&mut self, id: &str, policy: RetryPolicy, tick: u64) {
        if let Some(e) = self.entries.get_mut(id) {
            e.in_flight = None;
            e.attempts += 1;
            e.eligible_at = tick + policy.delay_ticks(e.attempts);
        }
    }
}

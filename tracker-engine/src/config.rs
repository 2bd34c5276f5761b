use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry schedule for failed write-backs, measured in flush ticks.
/// Retries are unbounded in count either way; an edit is never dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Retry on every flush tick.
    EveryTick,
    /// Exponential backoff: 1, 2, 4, ... ticks, capped.
    Backoff { cap_ticks: u64 },
}

impl RetryPolicy {
    /// Ticks to wait before the next attempt, given the failure count so far.
    pub fn delay_ticks(&self, attempts: u32) -> u64 {
        match *self {
            RetryPolicy::EveryTick => 1,
            RetryPolicy::Backoff { cap_ticks } => {
                let exp = attempts.saturating_sub(1);
                1u64.checked_shl(exp).map_or(cap_ticks, |d| d.min(cap_ticks))
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Backoff { cap_ticks: 64 }
    }
}

/// Engine tuning. The host owns the two timers; the intervals here are the
/// recommended cadences for driving `flush_tick` and `refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub flush_interval: Duration,
    pub refresh_interval: Duration,
    pub page_size: usize,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(10),
            page_size: 50,
            retry: RetryPolicy::default(),
        }
    }
}

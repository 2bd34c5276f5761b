use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::overlay::CompletionOverlay;
use crate::record::{Difficulty, ProblemRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Id,
    Title,
    Acceptance,
    Difficulty,
    Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Active difficulty filter. Empty means everything passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    difficulties: HashSet<Difficulty>,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes(&self, difficulty: Difficulty) -> bool {
        self.difficulties.is_empty() || self.difficulties.contains(&difficulty)
    }

    /// Flip membership of one difficulty, the checkbox gesture.
    pub fn toggle(&mut self, difficulty: Difficulty) {
        if !self.difficulties.remove(&difficulty) {
            self.difficulties.insert(difficulty);
        }
    }

    pub fn contains(&self, difficulty: Difficulty) -> bool {
        self.difficulties.contains(&difficulty)
    }

    pub fn is_empty(&self) -> bool {
        self.difficulties.is_empty()
    }

    pub fn clear(&mut self) {
        self.difficulties.clear();
    }
}

impl FromIterator<Difficulty> for ViewFilter {
    fn from_iter<T: IntoIterator<Item = Difficulty>>(iter: T) -> Self {
        Self { difficulties: iter.into_iter().collect() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub record: ProblemRecord,
    pub done: bool,
}

/// The filtered, sorted, paginated slice currently shown. Ephemeral;
/// recomputed whenever any projection input changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPage {
    pub rows: Vec<DerivedRow>,
    /// Row count after filtering, for pagination controls.
    pub total: usize,
    pub page_index: usize,
    pub page_count: usize,
}

impl DerivedPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pure projection: attach resolved done flags, filter, stable-sort (ties
/// keep original order), then slice the requested window clamped to the
/// available length. Identical inputs always produce an identical page.
pub fn project(
    records: &[ProblemRecord],
    overlay: &CompletionOverlay,
    filter: &ViewFilter,
    key: SortKey,
    dir: SortDir,
    page_index: usize,
    page_size: usize,
) -> DerivedPage {
    let mut rows: Vec<DerivedRow> = records
        .iter()
        .filter(|r| filter.passes(r.difficulty))
        .map(|r| DerivedRow { record: r.clone(), done: overlay.get(&r.id) })
        .collect();

    rows.sort_by(|a, b| {
        let ord = compare(&a.record, &b.record, key);
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });

    let total = rows.len();
    let page_count = if page_size == 0 { 0 } else { total.div_ceil(page_size) };
    let start = page_index.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    rows.truncate(end);
    let rows = rows.split_off(start.min(rows.len()));

    DerivedPage { rows, total, page_index, page_count }
}

fn compare(a: &ProblemRecord, b: &ProblemRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => match (a.numeric_id(), b.numeric_id()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.id.cmp(&b.id),
        },
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Acceptance => match (a.acceptance_pct(), b.acceptance_pct()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.acceptance.cmp(&b.acceptance),
        },
        SortKey::Difficulty => a.difficulty.cmp(&b.difficulty),
        SortKey::Frequency => a.frequency.total_cmp(&b.frequency),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyCount {
    pub total: usize,
    pub done: usize,
}

impl DifficultyCount {
    pub fn left(&self) -> usize {
        self.total - self.done
    }
}

/// Per-difficulty completion counts over the full merged set, feeding the
/// summary chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub easy: DifficultyCount,
    pub medium: DifficultyCount,
    pub hard: DifficultyCount,
}

impl Summary {
    pub fn count(&self, difficulty: Difficulty) -> DifficultyCount {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn total_done(&self) -> usize {
        self.easy.done + self.medium.done + self.hard.done
    }
}

pub fn summarize(records: &[ProblemRecord], overlay: &CompletionOverlay) -> Summary {
    let mut summary = Summary::default();
    for r in records {
        let slot = match r.difficulty {
            Difficulty::Easy => &mut summary.easy,
            Difficulty::Medium => &mut summary.medium,
            Difficulty::Hard => &mut summary.hard,
        };
        slot.total += 1;
        if overlay.get(&r.id) {
            slot.done += 1;
        }
    }
    summary
}

//! Demo session for the reconciliation engine.
//!
//! Seeds a record store (SQLite by default, REST with `--rest URL`), loads
//! the problem set, simulates a few toggles, and drives the flush/refresh
//! cadences the way a UI host would before ending the session.

use std::time::{Duration, Instant};

use log::info;
use tracker_engine::{
    Difficulty, DurableCache, EngineConfig, FileCache, ProblemRecord, ReconcileEngine,
    RecordStore, RestStore, SortDir, SortKey, SqliteStore,
};

fn sample_problems() -> Vec<ProblemRecord> {
    let rows = [
        ("1", "Two Sum", "49.1%", Difficulty::Easy, 100.0),
        ("2", "Add Two Numbers", "40.1%", Difficulty::Medium, 93.1),
        ("4", "Median of Two Sorted Arrays", "36.4%", Difficulty::Hard, 74.7),
        ("20", "Valid Parentheses", "40.3%", Difficulty::Easy, 84.8),
        ("42", "Trapping Rain Water", "58.3%", Difficulty::Hard, 81.2),
        ("146", "LRU Cache", "41.1%", Difficulty::Medium, 79.5),
        ("200", "Number of Islands", "56.7%", Difficulty::Medium, 88.0),
    ];
    rows.iter()
        .map(|(id, title, acceptance, difficulty, frequency)| ProblemRecord {
            id: id.to_string(),
            title: title.to_string(),
            acceptance: acceptance.to_string(),
            difficulty: *difficulty,
            frequency: *frequency,
            link: format!("https://leetcode.com/problems/{}", id),
            done: false,
        })
        .collect()
}

fn run_session<S: RecordStore, C: DurableCache>(mut engine: ReconcileEngine<S, C>) {
    // Demo cadences: same 1:2 flush/refresh ratio, compressed.
    let flush_every = Duration::from_millis(500);
    let refresh_every = Duration::from_secs(1);

    for problem in sample_problems() {
        engine
            .store_mut()
            .upsert_record(&problem)
            .expect("seeding the demo store");
    }
    engine.load_from_store().expect("bulk load");
    engine.set_sort(SortKey::Frequency, SortDir::Desc);

    info!("loaded {} problems", engine.records().len());

    engine.toggle("1", true);
    engine.toggle("20", true);
    engine.toggle("42", true);
    engine.toggle("42", false); // changed my mind; coalesces to one write

    let started = Instant::now();
    let mut last_flush = started;
    let mut last_refresh = started;
    while started.elapsed() < Duration::from_secs(3) {
        if last_flush.elapsed() >= flush_every {
            let written = engine.flush_tick();
            if written > 0 {
                info!("flushed {} write-back(s)", written);
            }
            last_flush = Instant::now();
        }
        if last_refresh.elapsed() >= refresh_every {
            engine.refresh();
            last_refresh = Instant::now();
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let page = engine.page();
    println!("  done  id    freq   title");
    for row in &page.rows {
        println!(
            "  [{}]  {:>4}  {:>5.1}  {} ({})",
            if row.done { "x" } else { " " },
            row.record.id,
            row.record.frequency,
            row.record.title,
            row.record.difficulty,
        );
    }
    println!(
        "  page {}/{} — {} rows total",
        page.page_index + 1,
        page.page_count,
        page.total
    );

    let summary = engine.summary();
    for d in Difficulty::ALL {
        let c = summary.count(d);
        println!("  {:<6} {}/{} done, {} left", d.as_str(), c.done, c.total, c.left());
    }

    engine.session_end();
    info!("session ended with {} unflushed write(s)", engine.pending_len());
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let arg_value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let cache_path =
        arg_value("--cache").unwrap_or_else(|| "leettrack-overlay.json".to_string());
    let cache = FileCache::new(&cache_path);

    if let Some(url) = arg_value("--rest") {
        let store = RestStore::new(&url);
        run_session(ReconcileEngine::new(store, cache, EngineConfig::default()));
    } else {
        let db_path = arg_value("--db").unwrap_or_else(|| ":memory:".to_string());
        let store = SqliteStore::open(&db_path).expect("opening sqlite store");
        run_session(ReconcileEngine::new(store, cache, EngineConfig::default()));
    }
}

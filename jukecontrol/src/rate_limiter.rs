//! Per-source debounce gate.
//!
//! Each input source owns its own entry and lock, so checking one button
//! never waits on another. The source table itself is only write-locked
//! the first time an unknown source shows up.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

#[derive(Debug)]
struct DebounceEntry {
    min_interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl DebounceEntry {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Mutex::new(None),
        }
    }
}

#[derive(Debug)]
pub struct RateLimiter<S> {
    default_interval: Duration,
    entries: RwLock<HashMap<S, Arc<DebounceEntry>>>,
}

impl<S> RateLimiter<S>
where
    S: Eq + Hash + Clone,
{
    /// Creates a limiter applying `default_interval` to sources that were
    /// not registered explicitly.
    pub fn new(default_interval: Duration) -> Self {
        Self {
            default_interval,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or re-registers) a source with its own interval.
    pub fn register(&self, source: S, min_interval: Duration) {
        self.entries
            .write()
            .insert(source, Arc::new(DebounceEntry::new(min_interval)));
    }

    pub fn default_interval(&self) -> Duration {
        self.default_interval
    }

    fn entry(&self, source: &S) -> Arc<DebounceEntry> {
        if let Some(entry) = self.entries.read().get(source) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry(source.clone())
                .or_insert_with(|| Arc::new(DebounceEntry::new(self.default_interval))),
        )
    }

    /// Accepts when at least the source's interval elapsed since its last
    /// accepted event, and records `now` on acceptance. The first event of
    /// a source is always accepted.
    pub fn should_accept(&self, source: &S, now: Instant) -> bool {
        let entry = self.entry(source);
        let mut last = entry.last_accepted.lock();
        match *last {
            Some(previous) if now < previous + entry.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

// Per-tick sampling of repeated log entries
// Entries are bucketed by a hash of (level, message) into a fixed counter table, so
// unrelated messages may occasionally share a counter.

use crate::config::SamplingConfig;
use crate::level::Level;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const COUNTERS: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    resets_at: Option<Instant>,
    count: u64,
}

#[derive(Debug)]
pub(crate) struct Sampler {
    tick: Duration,
    initial: u64,
    thereafter: u64,
    counters: Mutex<Vec<Counter>>,
}

impl Sampler {
    pub fn new(config: &SamplingConfig) -> Self {
        Sampler {
            tick: Duration::from_millis(config.tick_ms),
            initial: config.initial,
            thereafter: config.thereafter,
            counters: Mutex::new(vec![Counter::default(); COUNTERS]),
        }
    }

    /// Whether an entry with this level and message should be written now.
    pub fn check(&self, level: Level, message: &str) -> bool {
        self.check_at(level, message, Instant::now())
    }

    fn check_at(&self, level: Level, message: &str, now: Instant) -> bool {
        let mut hasher = DefaultHasher::new();
        level.hash(&mut hasher);
        message.hash(&mut hasher);
        let index = (hasher.finish() % COUNTERS as u64) as usize;

        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = &mut counters[index];

        match counter.resets_at {
            Some(resets_at) if now < resets_at => {}
            _ => {
                counter.resets_at = Some(now + self.tick);
                counter.count = 0;
            }
        }

        counter.count += 1;
        let n = counter.count;

        if n <= self.initial {
            return true;
        }
        self.thereafter > 0 && (n - self.initial) % self.thereafter == 0
    }
}

//! Short-lived response cache for provider fetches.
//!
//! Owned by whoever builds the provider and handed in explicitly, so tests
//! can run with a fresh cache (or a zero TTL that disables caching) instead
//! of sharing process-wide state.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::PricePoint;

type Key = (String, NaiveDate, NaiveDate);

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<Key, (Instant, Vec<PricePoint>)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Five-minute TTL.
    pub fn default_ttl() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    /// Cache that never retains anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<Vec<PricePoint>> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (symbol.to_string(), start, end);
        match entries.get(&key) {
            Some((stored_at, points)) if stored_at.elapsed() < self.ttl => Some(points.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a fetch. Expired entries for any key are dropped first.
    pub fn insert(&self, symbol: &str, start: NaiveDate, end: NaiveDate, points: &[PricePoint]) {
        if self.ttl.is_zero() {
            return;
        }
        let ttl = self.ttl;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert((symbol.to_string(), start, end), (Instant::now(), points.to_vec()));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::default_ttl()
    }
}

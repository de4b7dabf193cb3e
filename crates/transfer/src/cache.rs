//! Bucketed LRU cache for leg solutions.
//!
//! Keys quantise the departure epoch into one-hour game-time buckets and the
//! delta-v margin into 10 m/s steps, by integer division: exact equality on
//! the bucket values, never floating-point ranges. A single mutex covers
//! lookup and insert; `clear` runs under the same lock so a reload
//! happens-before any subsequent lookup.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::types::LegSolution;

/// Maximum number of cached legs before least-recently-used eviction.
pub const CACHE_CAPACITY: usize = 1024;
/// Departure epochs sharing the same hour bucket share a cache entry.
pub const DEPARTURE_BUCKET_S: f64 = 3_600.0;
/// Delta-v margins are bucketed to the nearest 10 m/s.
pub const EXTRA_DV_BUCKET_M_S: f64 = 10.0;

/// Cache key: location pair plus integer buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct LegKey {
    from: String,
    to: String,
    departure_bucket: i64,
    extra_dv_bucket: i64,
}

impl LegKey {
    pub(crate) fn new(from: &str, to: &str, departure_epoch_s: f64, extra_dv_m_s: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            departure_bucket: (departure_epoch_s / DEPARTURE_BUCKET_S).floor() as i64,
            extra_dv_bucket: (extra_dv_m_s / EXTRA_DV_BUCKET_M_S).round() as i64,
        }
    }
}

/// Counters exposed for observability.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

#[derive(Debug)]
struct Slot {
    value: LegSolution,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<LegKey, Slot>,
    tick: u64,
    hits: u64,
    misses: u64,
}

/// Process-wide leg cache. Cheap to share behind the planner.
#[derive(Debug, Default)]
pub(crate) struct LegCache {
    inner: Mutex<CacheInner>,
}

impl LegCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &LegKey) -> Option<LegSolution> {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;
        let value = inner.map.get_mut(key).map(|slot| {
            slot.last_used = tick;
            slot.value.clone()
        });
        match value {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub(crate) fn insert(&self, key: LegKey, value: LegSolution) {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;
        if !inner.map.contains_key(&key) && inner.map.len() >= CACHE_CAPACITY {
            // strict LRU: drop the entry with the oldest touch
            if let Some(oldest) = inner
                .map
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.map.remove(&oldest);
            }
        }
        inner.map.insert(
            key,
            Slot {
                value,
                last_used: tick,
            },
        );
    }

    pub(crate) fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let dropped = inner.map.len();
        inner.map.clear();
        if dropped > 0 {
            log::debug!("leg cache cleared ({dropped} entries dropped)");
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.map.len(),
            capacity: CACHE_CAPACITY,
        }
    }
}

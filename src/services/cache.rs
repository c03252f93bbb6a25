// src/services/cache.rs
//! In-memory TTL cache for computed yield results.
//!
//! Backed by `moka`, bounded by entry count, with a per-entry TTL. Entries are
//! replaced whole and go stale silently once past their expiry; the next fetch
//! for the key overwrites them. Concurrent misses on the same key
//! each fetch and the last store wins.

use std::time::{Duration as StdDuration, Instant};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::US::Eastern;
use log::debug;
use moka::future::Cache;
use moka::Expiry;

use crate::models::YieldsResult;

pub fn current_month_ttl() -> Duration {
    Duration::hours(1)
}

pub fn historical_ttl() -> Duration {
    Duration::hours(24)
}

pub fn cache_key(year: i32, month: Option<u32>) -> String {
    match month {
        Some(m) => format!("treasury:yields:{}:{}", year, m),
        None => format!("treasury:yields:{}:all", year),
    }
}

/// TTL for a (year, month) answer given today's date on the feed's calendar.
///
/// Only a request naming the current month gets the short TTL. A whole-year
/// request for the current year still gets the long one.
pub fn freshness_ttl(year: i32, month: Option<u32>, today: NaiveDate) -> Duration {
    match month {
        Some(m) if year == today.year() && m == today.month() => current_month_ttl(),
        _ => historical_ttl(),
    }
}

/// Today's date in New York, where the feed is published.
pub fn feed_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Eastern).date_naive()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: YieldsResult,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

/// Gives each entry its own lifetime, so current-month and historical
/// answers can share one cache.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<StdDuration> {
        Some(value.ttl.to_std().unwrap_or(StdDuration::ZERO))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<StdDuration>,
    ) -> Option<StdDuration> {
        Some(value.ttl.to_std().unwrap_or(StdDuration::ZERO))
    }
}

pub struct YieldCache {
    entries: Cache<String, CacheEntry>,
}

impl YieldCache {
    pub fn new(max_entries: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries.max(1) as u64)
            .expire_after(EntryExpiry)
            .build();
        YieldCache { entries }
    }

    pub async fn lookup(&self, key: &str) -> Option<YieldsResult> {
        self.lookup_at(key, Utc::now()).await
    }

    /// Like `lookup`, judging expiry against `now` instead of the wall clock.
    pub async fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Option<YieldsResult> {
        match self.entries.get(key).await {
            Some(entry) if now < entry.expires_at => Some(entry.result),
            Some(_) => {
                debug!("Cache entry {} has expired", key);
                None
            }
            None => None,
        }
    }

    pub async fn store(&self, key: &str, result: YieldsResult, ttl: Duration) {
        self.store_at(key, result, ttl, Utc::now()).await
    }

    pub async fn store_at(&self, key: &str, result: YieldsResult, ttl: Duration, now: DateTime<Utc>) {
        let entry = CacheEntry {
            result,
            ttl,
            expires_at: now + ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
    }

    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).await.map(|e| e.expires_at)
    }

    pub async fn len(&self) -> usize {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for YieldCache {
    fn default() -> Self {
        YieldCache::new(2048)
    }
}

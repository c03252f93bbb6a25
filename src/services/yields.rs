// src/services/yields.rs
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;

use crate::models::YieldsResult;
use super::cache::{cache_key, feed_today, freshness_ttl, YieldCache};
use super::feed::parse_feed;
use super::normalize::{filter_month, normalize_entries};
use super::treasury::{FeedError, FeedSource};

pub const MIN_YEAR: i32 = 1990;
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Error)]
pub enum YieldsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Treasury API unavailable: {0}")]
    Upstream(#[from] FeedError),
}

/// Answers "yields for year [and month]" from the cache, going to the feed on
/// a miss. Constructed once and shared behind an `Arc`.
pub struct YieldsService<F> {
    feed: F,
    cache: YieldCache,
    dropped_rows: AtomicU64,
}

impl<F: FeedSource> YieldsService<F> {
    pub fn new(feed: F, cache: YieldCache) -> Self {
        YieldsService {
            feed,
            cache,
            dropped_rows: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &YieldCache {
        &self.cache
    }

    /// Total feed entries discarded for an unusable date since start-up.
    pub fn dropped_rows(&self) -> u64 {
        self.dropped_rows.load(Ordering::Relaxed)
    }

    pub async fn get_yields(&self, year: Option<i32>, month: Option<u32>) -> Result<YieldsResult, YieldsError> {
        let year = validate(year, month)?;

        let key = cache_key(year, month);
        if let Some(cached) = self.cache.lookup(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }
        info!("Cache miss for {}, fetching from Treasury", key);

        let xml = self.feed.fetch_year(year).await?;
        let entries = parse_feed(&xml).map_err(|e| {
            warn!("Discarding unparseable Treasury feed for {}: {}", year, e);
            FeedError::from(e)
        })?;

        let normalized = normalize_entries(&entries);
        if normalized.dropped > 0 {
            warn!(
                "Dropped {} of {} feed entries for {} with no usable date",
                normalized.dropped,
                entries.len(),
                year
            );
            self.dropped_rows
                .fetch_add(normalized.dropped as u64, Ordering::Relaxed);
        }

        let rows = match month {
            Some(m) => filter_month(normalized.rows, m),
            None => normalized.rows,
        };
        let result = YieldsResult { year, month, rows };

        let ttl = freshness_ttl(year, month, feed_today(Utc::now()));
        info!(
            "Caching {} rows under {} for {} minutes",
            result.rows.len(),
            key,
            ttl.num_minutes()
        );
        self.cache.store(&key, result.clone(), ttl).await;

        Ok(result)
    }
}

fn validate(year: Option<i32>, month: Option<u32>) -> Result<i32, YieldsError> {
    let year = year.ok_or_else(|| YieldsError::InvalidInput("Query must include a valid year.".to_string()))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(YieldsError::InvalidInput(format!(
            "year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(YieldsError::InvalidInput("month must be between 1 and 12".to_string()));
        }
    }
    Ok(year)
}

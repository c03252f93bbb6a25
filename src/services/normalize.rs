// src/services/normalize.rs
use std::collections::BTreeMap;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::debug;

use crate::models::YieldRow;
use super::feed::{FeedValue, RawEntry};

const INDEX_DATE: &str = "INDEX_DATE";
const QUOTE_DATE: &str = "QUOTE_DATE";

const WK4: &str = "ROUND_B1_YIELD_4WK_2";
const WK6: &str = "ROUND_B1_YIELD_6WK_2";
const WK8: &str = "ROUND_B1_YIELD_8WK_2";
const WK13: &str = "ROUND_B1_YIELD_13WK_2";
const WK17: &str = "ROUND_B1_YIELD_17WK_2";
const WK26: &str = "ROUND_B1_YIELD_26WK_2";
const WK52: &str = "ROUND_B1_YIELD_52WK_2";

/// Rows from one feed, one per date in ascending order, plus how many entries
/// were thrown away for lack of a usable date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub rows: Vec<YieldRow>,
    pub dropped: usize,
}

pub fn normalize_entries(entries: &[RawEntry]) -> Normalized {
    let mut by_date: BTreeMap<NaiveDate, YieldRow> = BTreeMap::new();
    let mut dropped = 0;

    for entry in entries {
        match normalize_entry(entry) {
            Some(row) => {
                if by_date.insert(row.date, row).is_some() {
                    debug!("Duplicate feed entry replaced an earlier row");
                }
            }
            None => dropped += 1,
        }
    }

    Normalized {
        rows: by_date.into_values().collect(),
        dropped,
    }
}

/// Maps one entry to a row, or `None` when its date is missing or unreadable.
/// Unreadable tenor values only blank that one field.
pub fn normalize_entry(entry: &RawEntry) -> Option<YieldRow> {
    // QUOTE_DATE only stands in when INDEX_DATE is missing entirely
    let raw_date = entry.get(INDEX_DATE).or_else(|| entry.get(QUOTE_DATE))?;
    let date = parse_date(raw_date.text()?)?;

    Some(YieldRow {
        date,
        wk4: tenor(entry, WK4),
        wk6: tenor(entry, WK6),
        wk8: tenor(entry, WK8),
        wk13: tenor(entry, WK13),
        wk17: tenor(entry, WK17),
        wk26: tenor(entry, WK26),
        wk52: tenor(entry, WK52),
    })
}

/// Keeps the rows dated in `month`, order preserved.
pub fn filter_month(rows: Vec<YieldRow>, month: u32) -> Vec<YieldRow> {
    rows.into_iter().filter(|r| r.date.month() == month).collect()
}

fn tenor(entry: &RawEntry, field: &str) -> Option<f64> {
    entry.get(field).and_then(FeedValue::text).and_then(parse_rate)
}

pub fn parse_rate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

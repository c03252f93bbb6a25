// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of published bill rates. Tenor values are percent yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRow {
    pub date: NaiveDate,
    pub wk4: Option<f64>,
    pub wk6: Option<f64>,
    pub wk8: Option<f64>,
    pub wk13: Option<f64>,
    pub wk17: Option<f64>,
    pub wk26: Option<f64>,
    pub wk52: Option<f64>,
}

impl YieldRow {
    pub fn empty(date: NaiveDate) -> Self {
        YieldRow {
            date,
            wk4: None,
            wk6: None,
            wk8: None,
            wk13: None,
            wk17: None,
            wk26: None,
            wk52: None,
        }
    }
}

/// Response shape of `GET /yields` and the unit stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldsResult {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub rows: Vec<YieldRow>,
}

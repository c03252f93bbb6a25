// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use reqwest::StatusCode;
use treasury_yields::services::treasury::{FeedError, FeedSource};

pub enum StubReply {
    Body(String),
    Status(u16),
}

/// Feed source that serves a canned reply and counts calls.
pub struct StubFeed {
    reply: Mutex<StubReply>,
    calls: AtomicUsize,
}

impl StubFeed {
    pub fn new(reply: StubReply) -> Self {
        StubFeed {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serving(xml: impl Into<String>) -> Self {
        StubFeed::new(StubReply::Body(xml.into()))
    }

    pub fn set_reply(&self, reply: StubReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for StubFeed {
    async fn fetch_year(&self, _year: i32) -> Result<String, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.reply.lock().unwrap() {
            StubReply::Body(xml) => Ok(xml.clone()),
            StubReply::Status(code) => Err(FeedError::Status(
                StatusCode::from_u16(*code).unwrap(),
            )),
        }
    }
}

/// One feed entry with the given date and 4/13-week yields.
pub fn entry(date: &str, wk4: &str, wk13: &str) -> String {
    format!(
        r#"<entry>
    <id>https://home.treasury.gov/api/{date}</id>
    <content type="application/xml">
      <m:properties>
        <d:INDEX_DATE m:type="Edm.DateTime">{date}T00:00:00</d:INDEX_DATE>
        <d:ROUND_B1_CLOSE_4WK_2 m:type="Edm.Double">5.26</d:ROUND_B1_CLOSE_4WK_2>
        <d:ROUND_B1_YIELD_4WK_2 m:type="Edm.Double">{wk4}</d:ROUND_B1_YIELD_4WK_2>
        <d:ROUND_B1_YIELD_6WK_2 m:type="Edm.Double" m:null="true" />
        <d:ROUND_B1_YIELD_13WK_2 m:type="Edm.Double">{wk13}</d:ROUND_B1_YIELD_13WK_2>
        <d:ROUND_B1_YIELD_52WK_2>4.79</d:ROUND_B1_YIELD_52WK_2>
      </m:properties>
    </content>
  </entry>"#,
        date = date,
        wk4 = wk4,
        wk13 = wk13
    )
}

pub fn feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://home.treasury.gov/" xmlns="http://www.w3.org/2005/Atom"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <title type="text">DailyTreasuryBillRateData</title>
  <updated>2024-02-05T12:00:00Z</updated>
  {}
</feed>"#,
        entries.join("\n  ")
    )
}

/// Three January days out of order plus one February day.
pub fn january_and_february() -> String {
    feed(&[
        entry("2024-01-05", "5.40", "5.37"),
        entry("2024-02-01", "5.38", "5.36"),
        entry("2024-01-02", "5.41", "5.39"),
        entry("2024-01-09", "5.42", "5.38"),
    ])
}

// src/bin/test_treasury.rs
// Usage: cargo run --bin test_treasury -- <year> [month]
use anyhow::{bail, Context};
use dotenv::dotenv;
use std::env;
use treasury_yields::config::ServiceConfig;
use treasury_yields::services::cache::YieldCache;
use treasury_yields::services::treasury::TreasuryClient;
use treasury_yields::services::yields::YieldsService;

fn show(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: test_treasury <year> [month]");
    }
    let year: i32 = args[0].parse().context("year must be a number")?;
    let month: Option<u32> = match args.get(1) {
        Some(m) => Some(m.parse().context("month must be a number")?),
        None => None,
    };

    let config = ServiceConfig::from_env()?;
    let service = YieldsService::new(TreasuryClient::from_config(&config)?, YieldCache::default());
    let result = service.get_yields(Some(year), month).await?;

    println!("date         4wk    6wk    8wk    13wk   17wk   26wk   52wk");
    for row in &result.rows {
        println!(
            "{}  {:<6} {:<6} {:<6} {:<6} {:<6} {:<6} {:<6}",
            row.date,
            show(row.wk4),
            show(row.wk6),
            show(row.wk8),
            show(row.wk13),
            show(row.wk17),
            show(row.wk26),
            show(row.wk52)
        );
    }
    println!("{} rows, {} entries dropped", result.rows.len(), service.dropped_rows());
    Ok(())
}

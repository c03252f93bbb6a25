// src/handlers/yields.rs
use std::collections::HashMap;
use std::sync::Arc;
use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use crate::services::treasury::FeedSource;
use crate::services::yields::{YieldsError, YieldsService};
use super::error::ApiError;

/// `year`/`month` pulled out of the raw query map by hand, so a non-numeric
/// value is reported as a 400 with a message rather than a generic rejection.
#[derive(Debug, Default)]
pub struct YieldsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl YieldsQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let mut query = YieldsQuery::default();
        for (name, value) in params {
            match name.as_str() {
                "year" => {
                    query.year = Some(value.trim().parse().map_err(|_| {
                        ApiError::bad_request("Query must include a valid year.")
                    })?)
                }
                "month" => {
                    query.month = Some(value.trim().parse().map_err(|_| {
                        ApiError::bad_request("month must be an integer between 1 and 12")
                    })?)
                }
                other => {
                    return Err(ApiError::bad_request(format!(
                        "property {} should not exist",
                        other
                    )))
                }
            }
        }
        Ok(query)
    }
}

pub async fn get_yields<F: FeedSource>(
    params: HashMap<String, String>,
    service: Arc<YieldsService<F>>,
) -> Result<Json, Rejection> {
    info!("Handling request to get yields: {:?}", params);

    let query = YieldsQuery::from_params(&params).map_err(warp::reject::custom)?;

    match service.get_yields(query.year, query.month).await {
        Ok(result) => {
            info!(
                "Returning {} rows for {}/{:?}",
                result.rows.len(),
                result.year,
                result.month
            );
            Ok(warp::reply::json(&result))
        }
        Err(e) => {
            match &e {
                YieldsError::InvalidInput(msg) => info!("Rejected yields query: {}", msg),
                YieldsError::Upstream(cause) => error!("Failed to fetch yields: {}", cause),
            }
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

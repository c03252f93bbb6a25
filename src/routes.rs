// src/routes.rs
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use log::info;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::yields::get_yields;
use crate::services::treasury::FeedSource;
use crate::services::yields::YieldsService;

// Turn rejections into terse JSON errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes<F>(service: Arc<YieldsService<F>>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone
where
    F: FeedSource + 'static,
{
    info!("Configuring routes...");

    let service_filter = warp::any().map(move || service.clone());

    let yields_route = warp::path!("yields")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(service_filter)
        .and_then(get_yields::<F>);

    info!("All routes configured successfully.");

    yields_route.recover(handle_rejection)
}

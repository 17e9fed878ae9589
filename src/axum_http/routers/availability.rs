use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{auth::AuthUser, axum_http::error_responses::error_response, usecases::availability};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    date: Option<String>,
}

pub fn routes() -> Router {
    Router::new().route("/", get(list_slots))
}

pub async fn list_slots(
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<AvailabilityQuery>,
) -> impl IntoResponse {
    let Some(raw_date) = query.date else {
        return error_response(StatusCode::BAD_REQUEST, "date query parameter is required");
    };

    let date = match NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "date must be YYYY-MM-DD");
        }
    };

    let slots = availability::slots_for_date(date);
    info!(%user_id, %date, slot_count = slots.len(), "availability: slots resolved");

    Json(slots).into_response()
}

//! `/api/v1.0` query endpoints

use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::Uri,
    response::Json,
    routing::get,
};
use tracing::instrument;

use crate::{
    ClimateApiError, Result,
    models::{TripRange, TripStats},
    store::{PrecipitationByDate, TemperatureByDate},
    web::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/precipitation", get(get_precipitation))
        .route("/stations", get(get_stations))
        .route("/tobs", get(get_temperature_observations))
        .route("/trip/{start_date}", get(get_trip_stats))
        .route("/trip/{start_date}/{end_date}", get(get_trip_stats_range))
}

#[instrument(level = "debug", skip(state))]
async fn get_precipitation(State(state): State<AppState>) -> Result<Json<PrecipitationByDate>> {
    Ok(Json(state.store.precipitation_since().await?))
}

#[instrument(level = "debug", skip(state))]
async fn get_stations(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.store.active_stations().await?))
}

#[instrument(level = "debug", skip(state))]
async fn get_temperature_observations(
    State(state): State<AppState>,
) -> Result<Json<TemperatureByDate>> {
    Ok(Json(state.store.temperature_observations().await?))
}

#[instrument(level = "debug", skip(state, start_date))]
async fn get_trip_stats(
    State(state): State<AppState>,
    uri: Uri,
    start_date: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<TripStats>>> {
    let range = match start_date {
        Ok(Path(start_date)) => TripRange::from_start(start_date),
        Err(rejection) => {
            tracing::debug!(%rejection, "Undecodable trip date");
            let range = TripRange::from_start(raw_trip_segment(&uri, 0));
            return Err(ClimateApiError::not_found(range.not_found_message()));
        }
    };
    trip_stats_for(&state, range).await
}

#[instrument(level = "debug", skip(state, dates))]
async fn get_trip_stats_range(
    State(state): State<AppState>,
    uri: Uri,
    dates: std::result::Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Vec<TripStats>>> {
    let range = match dates {
        Ok(Path((start_date, end_date))) => TripRange::between(start_date, end_date),
        Err(rejection) => {
            tracing::debug!(%rejection, "Undecodable trip dates");
            let range =
                TripRange::between(raw_trip_segment(&uri, 0), raw_trip_segment(&uri, 1));
            return Err(ClimateApiError::not_found(range.not_found_message()));
        }
    };
    trip_stats_for(&state, range).await
}

/// Path segment `index` after `/trip/`, percent-decoded without rejecting invalid UTF-8
fn raw_trip_segment(uri: &Uri, index: usize) -> String {
    let raw = uri
        .path()
        .split('/')
        .skip_while(|segment| *segment != "trip")
        .nth(index + 1)
        .unwrap_or_default();
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

async fn trip_stats_for(state: &AppState, range: TripRange) -> Result<Json<Vec<TripStats>>> {
    match state.store.trip_stats(&range).await? {
        Some(stats) => Ok(Json(vec![stats])),
        None => Err(ClimateApiError::not_found(range.not_found_message())),
    }
}

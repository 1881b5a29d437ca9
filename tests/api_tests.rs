//! End-to-end tests of the HTTP surface against an in-memory dataset

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use climate_api::{
    AppState, Measurement, SqliteClimateStore, Station, config::ServerConfig, schema, web,
};

const ROWS: &[(&str, &str, Option<f64>, f64)] = &[
    ("USC00519397", "2016-08-22", Some(1.5), 70.0),
    ("USC00519281", "2016-08-23", Some(1.79), 77.0),
    ("USC00519397", "2016-08-23", Some(0.0), 81.0),
    ("USC00513117", "2016-08-23", None, 76.0),
    ("USC00519281", "2016-08-24", Some(2.15), 77.0),
    ("USC00519397", "2016-08-24", Some(0.08), 79.0),
    ("USC00519281", "2017-01-01", Some(0.0), 62.0),
    ("USC00513117", "2017-02-01", None, 58.0),
    ("USC00519281", "2017-08-23", Some(0.5), 79.0),
    ("USC00519397", "2017-08-23", Some(0.0), 81.0),
];

async fn seeded_store() -> SqliteClimateStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    schema::create_tables(&pool).await.unwrap();

    // Declared but never measured, so it must not show up on /stations
    schema::insert_station(
        &pool,
        &Station {
            id: 1,
            station: "USC00511918".to_string(),
            name: "HONOLULU OBSERVATORY 702.2, HI US".to_string(),
            latitude: 21.3152,
            longitude: -157.9992,
            elevation: 0.9,
        },
    )
    .await
    .unwrap();

    for (i, (station, date, prcp, tobs)) in ROWS.iter().enumerate() {
        let measurement = Measurement {
            id: i as i64 + 1,
            station: station.to_string(),
            date: date.to_string(),
            prcp: *prcp,
            tobs: *tobs,
        };
        schema::insert_measurement(&pool, &measurement).await.unwrap();
    }

    SqliteClimateStore::from_pool(pool)
}

fn app_for(store: SqliteClimateStore) -> Router {
    web::app(AppState::new(Arc::new(store)), &ServerConfig::default())
}

async fn test_app() -> Router {
    app_for(seeded_store().await)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_welcome_lists_routes() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let (_, body) = get(&app, "/").await;
    assert!(body.contains("/api/v1.0/precipitation"));
    assert!(body.contains("/api/v1.0/stations"));
    assert!(body.contains("/api/v1.0/tobs"));
    assert!(body.contains("/api/v1.0/trip/yyyy-mm-dd/yyyy-mm-dd"));
}

#[tokio::test]
async fn test_precipitation() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::OK);

    let totals = json.as_object().unwrap();
    let dates: Vec<&String> = totals.keys().collect();
    assert_eq!(dates, ["2016-08-23", "2016-08-24", "2017-01-01", "2017-02-01", "2017-08-23"]);

    assert!((totals["2016-08-23"].as_f64().unwrap() - 1.79).abs() < 1e-9);
    assert!((totals["2016-08-24"].as_f64().unwrap() - 2.23).abs() < 1e-9);
    assert_eq!(totals["2017-01-01"].as_f64(), Some(0.0));
    // Only null readings that day
    assert!(totals["2017-02-01"].is_null());
}

#[tokio::test]
async fn test_stations_come_from_measurements() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!(["USC00513117", "USC00519281", "USC00519397"])
    );
}

#[tokio::test]
async fn test_tobs_only_most_active_station() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "2016-08-23": 77.0,
            "2016-08-24": 77.0,
            "2017-01-01": 62.0,
            "2017-08-23": 79.0,
        })
    );
}

#[tokio::test]
async fn test_trip_with_default_end_date() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/api/v1.0/trip/2017-01-01").await;
    assert_eq!(status, StatusCode::OK);

    let stats = json.as_array().unwrap();
    assert_eq!(stats.len(), 1);
    let min = stats[0]["Min"].as_f64().unwrap();
    let average = stats[0]["Average"].as_f64().unwrap();
    let max = stats[0]["Max"].as_f64().unwrap();
    assert_eq!(min, 58.0);
    assert_eq!(max, 81.0);
    assert!((average - (62.0 + 58.0 + 79.0 + 81.0) / 4.0).abs() < 1e-9);
    assert!(min <= average && average <= max);
}

#[tokio::test]
async fn test_trip_with_explicit_range() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/api/v1.0/trip/2016-08-22/2016-08-23").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["Min"].as_f64(), Some(70.0));
    assert_eq!(json[0]["Max"].as_f64(), Some(81.0));
}

#[rstest]
#[case::no_data_after("/api/v1.0/trip/9999-01-01", "Date 9999-01-01 cannot be located")]
#[case::malformed("/api/v1.0/trip/not-a-date", "Date not-a-date cannot be located")]
#[case::start_after_end("/api/v1.0/trip/2017-01-01/2016-01-01", "Date(s) cannot be located")]
#[case::invalid_utf8("/api/v1.0/trip/%FF", "Date \u{FFFD} cannot be located")]
#[case::invalid_utf8_range("/api/v1.0/trip/%FF/2017-01-01", "Date(s) cannot be located")]
#[tokio::test]
async fn test_trip_not_found(#[case] uri: &str, #[case] expected: &str) {
    let app = test_app().await;
    let (status, json) = get_json(&app, uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with(expected), "unexpected message: {message}");
    assert!(message.contains("YYYY-MM-DD"));
}

#[rstest]
#[case("/api/v1.0/precipitation")]
#[case("/api/v1.0/stations")]
#[case("/api/v1.0/tobs")]
#[case("/api/v1.0/trip/2016-08-23")]
#[case("/api/v1.0/trip/2016-08-23/2017-01-01")]
#[case("/api/v1.0/trip/9999-01-01")]
#[tokio::test]
async fn test_repeated_calls_are_identical(#[case] uri: &str) {
    let app = test_app().await;
    let first = get(&app, uri).await;
    let second = get(&app, uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app().await;
    let (status, _) = get(&app, "/api/v1.0/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("/api/v1.0/precipitation")]
#[case("/api/v1.0/trip/2017-01-01")]
#[case("/health")]
#[tokio::test]
async fn test_unreachable_dataset_is_server_error(#[case] uri: &str) {
    let store = seeded_store().await;
    store.close().await;
    let app = app_for(store);

    let (status, json) = get_json(&app, uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Unable to read the climate dataset.");
}

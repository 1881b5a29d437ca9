//! Statically declared dataset schema.
//!
//! The service only reads these tables. Creation and inserts are here for
//! loading tools and test fixtures.

use sqlx::SqlitePool;

use crate::models::{Measurement, Station};

const CREATE_STATION: &str = r#"
    CREATE TABLE IF NOT EXISTS station (
        id INTEGER PRIMARY KEY,
        station TEXT NOT NULL,
        name TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        elevation REAL NOT NULL
    )
"#;

const CREATE_MEASUREMENT: &str = r#"
    CREATE TABLE IF NOT EXISTS measurement (
        id INTEGER PRIMARY KEY,
        station TEXT NOT NULL,
        date TEXT NOT NULL,
        prcp REAL,
        tobs REAL NOT NULL
    )
"#;

/// Create both tables if they do not exist yet
pub async fn create_tables(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(CREATE_STATION).execute(pool).await?;
    sqlx::query(CREATE_MEASUREMENT).execute(pool).await?;
    Ok(())
}

pub async fn insert_station(pool: &SqlitePool, station: &Station) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO station (id, station, name, latitude, longitude, elevation) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(station.id)
    .bind(&station.station)
    .bind(&station.name)
    .bind(station.latitude)
    .bind(station.longitude)
    .bind(station.elevation)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_measurement(pool: &SqlitePool, measurement: &Measurement) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO measurement (id, station, date, prcp, tobs) VALUES (?, ?, ?, ?, ?)")
        .bind(measurement.id)
        .bind(&measurement.station)
        .bind(&measurement.date)
        .bind(measurement.prcp)
        .bind(measurement.tobs)
        .execute(pool)
        .await?;
    Ok(())
}

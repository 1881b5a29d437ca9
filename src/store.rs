//! Read access to the climate dataset.
//!
//! [`ClimateStore`] is the seam between the HTTP handlers and storage.
//! [`SqliteClimateStore`] answers it from a read-only SQLite connection pool:
//! each query checks out one connection and hands it back when the query
//! future completes, whether it succeeded or not.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::instrument;

use crate::Result;
use crate::config::DatabaseConfig;
use crate::models::{SINCE_DATE, TOBS_STATION, TripRange, TripStats};

/// Date to summed precipitation; `None` when every reading of the day was null
pub type PrecipitationByDate = BTreeMap<String, Option<f64>>;

/// Date to temperature observation
pub type TemperatureByDate = BTreeMap<String, f64>;

#[async_trait]
pub trait ClimateStore: Send + Sync {
    /// Daily precipitation totals on or after [`SINCE_DATE`]
    async fn precipitation_since(&self) -> Result<PrecipitationByDate>;

    /// Station codes that have at least one measurement, ascending
    async fn active_stations(&self) -> Result<Vec<String>>;

    /// Daily temperatures of [`TOBS_STATION`] on or after [`SINCE_DATE`]
    async fn temperature_observations(&self) -> Result<TemperatureByDate>;

    /// Temperature aggregate over the inclusive range, `None` if no row matched
    async fn trip_stats(&self, range: &TripRange) -> Result<Option<TripStats>>;

    /// Cheap round-trip to check the dataset is reachable
    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct SqliteClimateStore {
    pool: SqlitePool,
}

impl SqliteClimateStore {
    /// Open the dataset read-only. The file must already exist.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        tracing::info!(url = %config.url, max_connections = config.max_connections, "Opened climate dataset");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ClimateStore for SqliteClimateStore {
    #[instrument(level = "debug", skip(self))]
    async fn precipitation_since(&self) -> Result<PrecipitationByDate> {
        let rows: Vec<(String, Option<f64>)> = sqlx::query_as(
            "SELECT date, CAST(SUM(prcp) AS REAL) \
             FROM measurement \
             WHERE date >= ? \
             GROUP BY date \
             ORDER BY date",
        )
        .bind(SINCE_DATE)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(days = rows.len(), "Loaded precipitation totals");
        Ok(rows.into_iter().collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn active_stations(&self) -> Result<Vec<String>> {
        let stations: Vec<String> = sqlx::query_scalar(
            "SELECT station FROM measurement GROUP BY station ORDER BY station",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = stations.len(), "Loaded active stations");
        Ok(stations)
    }

    #[instrument(level = "debug", skip(self))]
    async fn temperature_observations(&self) -> Result<TemperatureByDate> {
        // Ties on a date resolve to the highest id, the last one inserted below
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT date, CAST(tobs AS REAL) \
             FROM measurement \
             WHERE date >= ? AND station = ? \
             ORDER BY date, id",
        )
        .bind(SINCE_DATE)
        .bind(TOBS_STATION)
        .fetch_all(&self.pool)
        .await?;

        let mut observations = TemperatureByDate::new();
        for (date, tobs) in rows {
            observations.insert(date, tobs);
        }

        tracing::debug!(days = observations.len(), station = TOBS_STATION, "Loaded temperature observations");
        Ok(observations)
    }

    #[instrument(level = "debug", skip(self), fields(start = %range.start, end = %range.end))]
    async fn trip_stats(&self, range: &TripRange) -> Result<Option<TripStats>> {
        let (count, min, average, max): (i64, Option<f64>, Option<f64>, Option<f64>) =
            sqlx::query_as(
                "SELECT COUNT(tobs), CAST(MIN(tobs) AS REAL), CAST(AVG(tobs) AS REAL), CAST(MAX(tobs) AS REAL) \
                 FROM measurement \
                 WHERE date >= ? AND date <= ?",
            )
            .bind(&range.start)
            .bind(&range.end)
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            tracing::debug!("No observations in range");
            return Ok(None);
        }

        match (min, average, max) {
            (Some(min), Some(average), Some(max)) => Ok(Some(TripStats { min, average, max })),
            _ => Ok(None),
        }
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

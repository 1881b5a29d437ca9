//! Climate API - read-only JSON queries over a Hawaii climate dataset
//!
//! Serves daily precipitation totals, active stations, temperature
//! observations and trip temperature statistics from a pre-populated
//! SQLite database of stations and measurements.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod schema;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use config::ClimateApiConfig;
pub use error::ClimateApiError;
pub use models::{Measurement, Station, TripRange, TripStats};
pub use store::{ClimateStore, SqliteClimateStore};
pub use web::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimateApiError>;

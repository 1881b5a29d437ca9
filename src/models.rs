//! Record types of the climate dataset and the JSON shapes served from them

use serde::{Deserialize, Serialize};

/// Lower bound for the "last year of data" queries
pub const SINCE_DATE: &str = "2016-08-23";

/// Station whose temperature observations are served on `/tobs`
pub const TOBS_STATION: &str = "USC00519281";

/// End date used when a trip query only names a start date
pub const DEFAULT_TRIP_END: &str = "2017-08-23";

/// Weather-observation site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    pub id: i64,
    /// Station code, e.g. `USC00519281`
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One dated observation row of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Measurement {
    pub id: i64,
    pub station: String,
    /// `YYYY-MM-DD`, compared lexically
    pub date: String,
    /// Precipitation, absent on some days
    pub prcp: Option<f64>,
    /// Temperature observation
    pub tobs: f64,
}

/// Min / average / max temperature over a date range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripStats {
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Average")]
    pub average: f64,
    #[serde(rename = "Max")]
    pub max: f64,
}

/// Inclusive date range of a trip query.
///
/// Remembers whether the end date came from the caller, which decides the
/// wording of the not-found message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRange {
    pub start: String,
    pub end: String,
    end_supplied: bool,
}

impl TripRange {
    /// Range from `start` up to [`DEFAULT_TRIP_END`]
    pub fn from_start(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: DEFAULT_TRIP_END.to_string(),
            end_supplied: false,
        }
    }

    /// Range with both ends given by the caller
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            end_supplied: true,
        }
    }

    /// Message returned when no observation falls inside the range
    #[must_use]
    pub fn not_found_message(&self) -> String {
        if self.end_supplied {
            "Date(s) cannot be located or date is not entered in the following format: YYYY-MM-DD Please try again".to_string()
        } else {
            format!(
                "Date {} cannot be located or date is not entered in the following format: YYYY-MM-DD Please try again",
                self.start
            )
        }
    }
}

/// JSON error payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_stats_serializes_capitalized_keys() {
        let stats = TripStats {
            min: 58.0,
            average: 74.5,
            max: 87.0,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["Min"], 58.0);
        assert_eq!(json["Average"], 74.5);
        assert_eq!(json["Max"], 87.0);
    }

    #[test]
    fn test_from_start_uses_default_end() {
        let range = TripRange::from_start("2017-01-01");
        assert_eq!(range.start, "2017-01-01");
        assert_eq!(range.end, DEFAULT_TRIP_END);
        assert!(range.not_found_message().starts_with("Date 2017-01-01 "));
    }

    #[test]
    fn test_not_found_messages() {
        let single = TripRange::from_start("1999-13-45");
        assert!(single.not_found_message().starts_with("Date 1999-13-45 cannot be located"));

        let both = TripRange::between("2017-01-01", "2016-01-01");
        assert!(both.not_found_message().starts_with("Date(s) cannot be located"));
        assert!(both.not_found_message().contains("YYYY-MM-DD"));
    }
}

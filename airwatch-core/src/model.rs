use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Backend identifier of a monitored location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub i64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(LocationId)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Body of `POST /locations/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollutionRecord {
    pub id: i64,
    pub location_id: LocationId,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherPrediction {
    #[serde(default)]
    pub id: Option<i64>,
    pub location_id: LocationId,
    pub predicted_temp: f64,
    #[serde(default)]
    pub predicted_humidity: Option<f64>,
    pub condition: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response of `GET /ai/analyze/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiAnalysis {
    pub analysis: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response of `GET /ai/advice/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiAdvice {
    pub advice: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
}

/// Accepts RFC 3339 as well as the naive `YYYY-MM-DD HH:MM:SS` form SQLite
/// hands back; naive values are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.and_utc())
}

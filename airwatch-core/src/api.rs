use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{
    AiAdvice, AiAnalysis, Location, LocationId, NewLocation, PollutionRecord, WeatherPrediction,
};

pub mod http;

pub use http::HttpApi;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}{}", suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Human-readable detail the backend attached to an error response.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Build a status error from a raw response body. The backend puts its
    /// message under `detail` (FastAPI) or `message` (custom handlers).
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
            ["detail", "message"].iter().find_map(|key| match value.get(key)? {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
        });

        ApiError::Status { status, detail }
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// The pollution monitor backend, one method per endpoint.
#[async_trait]
pub trait DashboardApi: Send + Sync + Debug {
    async fn list_locations(&self) -> ApiResult<Vec<Location>>;

    async fn create_location(&self, location: &NewLocation) -> ApiResult<Location>;

    /// Records for one location, most recent first.
    async fn pollution_records(&self, location: LocationId) -> ApiResult<Vec<PollutionRecord>>;

    /// Pull fresh data for a city, creating its location when needed.
    async fn fetch_by_city(&self, city: &str) -> ApiResult<PollutionRecord>;

    /// Pull fresh data for an existing location.
    async fn fetch_real_time(&self, location: LocationId) -> ApiResult<PollutionRecord>;

    async fn predict_weather(&self, location: LocationId) -> ApiResult<WeatherPrediction>;

    async fn analyze(&self, location: LocationId) -> ApiResult<AiAnalysis>;

    async fn advice(&self, location: LocationId) -> ApiResult<AiAdvice>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_read_from_detail_field() {
        let err = ApiError::from_status(404, r#"{"detail": "Location not found"}"#);
        assert_eq!(err.detail(), Some("Location not found"));
        assert_eq!(err.to_string(), "backend returned 404: Location not found");
    }

    #[test]
    fn detail_falls_back_to_message_field() {
        let err = ApiError::from_status(400, r#"{"message": "City not found"}"#);
        assert_eq!(err.detail(), Some("City not found"));
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let err = ApiError::from_status(422, r#"{"detail": [{"loc": ["path"], "msg": "bad"}]}"#);
        let detail = err.detail().expect("detail should be present");
        assert!(detail.contains("\"msg\":\"bad\""));
    }

    #[test]
    fn non_json_body_has_no_detail() {
        let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "backend returned 502");
    }

    #[test]
    fn null_detail_is_ignored() {
        let err = ApiError::from_status(500, r#"{"detail": null, "message": "boom"}"#);
        assert_eq!(err.detail(), Some("boom"));
    }
}

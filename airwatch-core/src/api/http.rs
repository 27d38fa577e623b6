use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::model::{
    AiAdvice, AiAnalysis, Location, LocationId, NewLocation, PollutionRecord, WeatherPrediction,
};

use super::{ApiError, ApiResult, DashboardApi};

/// `reqwest` client for the pollution monitor REST API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: String,
    http: Client,
}

impl HttpApi {
    pub fn new(base: &str, timeout: Duration) -> ApiResult<Self> {
        let raw = base.trim();
        let url = Url::parse(raw).map_err(|_| ApiError::InvalidBaseUrl(raw.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(raw.to_string()));
        }

        // Paths are joined as "{base}{path}", so keep no trailing slash.
        let base = url.as_str().trim_end_matches('/').to_string();

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { base, http })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> ApiResult<T> {
        let res = req.send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, body = %truncate_body(&body), "{what} failed");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        tracing::debug!(%status, "{what} succeeded");

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        self.send(self.request(Method::GET, "/locations/"), "list locations").await
    }

    async fn create_location(&self, location: &NewLocation) -> ApiResult<Location> {
        let req = self.request(Method::POST, "/locations/").json(location);
        self.send(req, "create location").await
    }

    async fn pollution_records(&self, location: LocationId) -> ApiResult<Vec<PollutionRecord>> {
        let req = self
            .request(Method::GET, "/pollution/")
            .query(&[("location_id", location.0)]);
        self.send(req, "pollution records").await
    }

    async fn fetch_by_city(&self, city: &str) -> ApiResult<PollutionRecord> {
        let path = format!("/pollution/fetch-by-city/{}", urlencoding::encode(city));
        self.send(self.request(Method::POST, &path), "fetch by city").await
    }

    async fn fetch_real_time(&self, location: LocationId) -> ApiResult<PollutionRecord> {
        let path = format!("/pollution/fetch-real/{location}");
        self.send(self.request(Method::POST, &path), "fetch real-time").await
    }

    async fn predict_weather(&self, location: LocationId) -> ApiResult<WeatherPrediction> {
        let path = format!("/ai/predict_weather/{location}");
        self.send(self.request(Method::POST, &path), "predict weather").await
    }

    async fn analyze(&self, location: LocationId) -> ApiResult<AiAnalysis> {
        let path = format!("/ai/analyze/{location}");
        self.send(self.request(Method::GET, &path), "AI analysis").await
    }

    async fn advice(&self, location: LocationId) -> ApiResult<AiAdvice> {
        let path = format!("/ai/advice/{location}");
        self.send(self.request(Method::GET, &path), "AI advice").await
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    fn api_for(server: &MockServer) -> HttpApi {
        HttpApi::new(&server.base_url(), Duration::from_secs(5)).expect("mock server URL is valid")
    }

    fn record_json(location_id: i64) -> serde_json::Value {
        json!({
            "id": 11, "location_id": location_id, "aqi": 140,
            "pm25": 52.0, "pm10": 80.5, "co": null, "no2": null,
            "timestamp": "2024-11-02T08:15:00"
        })
    }

    #[test]
    fn base_url_is_normalized() {
        let api = HttpApi::new(" http://127.0.0.1:8000/ ", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base(), "http://127.0.0.1:8000");
        assert_eq!(api.url("/locations/"), "http://127.0.0.1:8000/locations/");
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let api = HttpApi::new("https://example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.url("/locations/"), "https://example.com/api/locations/");
    }

    #[test]
    fn upper_case_scheme_is_accepted() {
        let api = HttpApi::new("HTTP://localhost:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base(), "http://localhost:8000");
    }

    #[test]
    fn unparseable_base_url_is_rejected_verbatim() {
        for bad in ["http://exa mple.com", "http://", "localhost:8000", "ftp://example.com"] {
            let err = HttpApi::new(bad, Duration::from_secs(5)).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidBaseUrl(ref url) if url == bad),
                "{bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn long_error_bodies_are_cut_for_logging() {
        let body = "e".repeat(500);
        assert_eq!(truncate_body(&body).len(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn list_locations_gets_collection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/locations/");
                then.status(200).json_body(json!([
                    { "id": 1, "name": "Station A", "city": "Pune", "country": "India",
                      "latitude": 18.52, "longitude": 73.85 }
                ]));
            })
            .await;

        let locations = api_for(&server).list_locations().await.unwrap();

        mock.assert_async().await;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].id, LocationId(1));
        assert_eq!(locations[0].latitude, Some(18.52));
    }

    #[tokio::test]
    async fn create_location_posts_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/locations/").json_body(json!({
                    "name": "Harbour", "city": "Mumbai", "country": "India",
                    "latitude": null, "longitude": null
                }));
                then.status(200).json_body(json!({
                    "id": 5, "name": "Harbour", "city": "Mumbai", "country": "India"
                }));
            })
            .await;

        let new = NewLocation {
            name: "Harbour".into(),
            city: "Mumbai".into(),
            country: "India".into(),
            latitude: None,
            longitude: None,
        };
        let created = api_for(&server).create_location(&new).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, LocationId(5));
    }

    #[tokio::test]
    async fn pollution_records_filter_by_query_param() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/pollution/").query_param("location_id", "7");
                then.status(200).json_body(json!([record_json(7)]));
            })
            .await;

        let records = api_for(&server).pollution_records(LocationId(7)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records[0].aqi, Some(140));
        assert!(records[0].timestamp.is_some());
    }

    #[tokio::test]
    async fn fetch_by_city_encodes_path_segment() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/pollution/fetch-by-city/New%20Delhi%2FX");
                then.status(200).json_body(record_json(42));
            })
            .await;

        let record = api_for(&server).fetch_by_city("New Delhi/X").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.location_id, LocationId(42));
    }

    #[tokio::test]
    async fn fetch_real_time_posts_to_location() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/pollution/fetch-real/3");
                then.status(200).json_body(record_json(3));
            })
            .await;

        let record = api_for(&server).fetch_real_time(LocationId(3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.location_id, LocationId(3));
    }

    #[tokio::test]
    async fn predict_weather_posts_to_location() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/ai/predict_weather/3");
                then.status(200).json_body(json!({
                    "id": 2, "location_id": 3, "predicted_temp": 29.4,
                    "predicted_humidity": 61.0, "condition": "Hazy",
                    "timestamp": "2024-11-02 09:00:00"
                }));
            })
            .await;

        let prediction = api_for(&server).predict_weather(LocationId(3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(prediction.condition, "Hazy");
        assert_eq!(prediction.predicted_humidity, Some(61.0));
    }

    #[tokio::test]
    async fn analysis_and_advice_are_fetched_with_get() {
        let server = MockServer::start_async().await;
        let analyze = server
            .mock_async(|when, then| {
                when.method(GET).path("/ai/analyze/3");
                then.status(200).json_body(json!({
                    "location": "Station", "aqi": 140, "analysis": "PM2.5 dominates."
                }));
            })
            .await;
        let advice = server
            .mock_async(|when, then| {
                when.method(GET).path("/ai/advice/3");
                then.status(200).json_body(json!({
                    "location": "Station", "aqi": 140, "weather_condition": null,
                    "advice": "Stay inside\nUse a purifier"
                }));
            })
            .await;

        let api = api_for(&server);
        let analysis = api.analyze(LocationId(3)).await.unwrap();
        let tips = api.advice(LocationId(3)).await.unwrap();

        analyze.assert_async().await;
        advice.assert_async().await;
        assert_eq!(analysis.analysis, "PM2.5 dominates.");
        assert_eq!(tips.advice, "Stay inside\nUse a purifier");
        assert_eq!(tips.weather_condition, None);
    }

    #[tokio::test]
    async fn error_status_carries_message_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/pollution/fetch-by-city/Atlantis");
                then.status(400).json_body(json!({ "message": "City not found" }));
            })
            .await;

        let err = api_for(&server).fetch_by_city("Atlantis").await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.detail(), Some("City not found"));
    }

    #[tokio::test]
    async fn error_status_with_html_body_has_no_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ai/advice/9");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let err = api_for(&server).advice(LocationId(9)).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 502, detail: None }));
    }

    #[tokio::test]
    async fn unexpected_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/locations/");
                then.status(200).json_body(json!({ "locations": [] }));
            })
            .await;

        let err = api_for(&server).list_locations().await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }
}

//! Display state of the dashboard.
//!
//! Each region is a plain value produced by a pure function from typed API
//! data. The controller in [`crate::dashboard`] only ever replaces whole
//! regions; nothing here talks to the network.

use chrono::{DateTime, Utc};

use crate::{
    aqi,
    model::{Location, LocationId, PollutionRecord, WeatherPrediction},
};

pub const PLACEHOLDER: &str = "--";
pub const TEMPERATURE_PLACEHOLDER: &str = "--°C";
pub const NO_DATA_ADVICE: &str = "No data found. Add pollution record.";
pub const ANALYSIS_LOADING: &str = "Analyzing trends...";
pub const ADVICE_LOADING: &str = "AI is analyzing...";
pub const ANALYSIS_UNAVAILABLE: &str = "AI analysis currently unavailable.";
pub const ADVICE_UNAVAILABLE: &str = "AI services unavailable.";
pub const SELECT_PROMPT: &str = "Select Location";

/// Preview length of the analysis text, in characters.
pub const ANALYSIS_PREVIEW_CHARS: usize = 150;

/// Concentration that fills a PM gauge completely, in µg/m³.
const BAR_FULL_SCALE: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: Option<LocationId>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorView {
    pub options: Vec<SelectOption>,
    pub selected: Option<LocationId>,
}

impl SelectorView {
    /// Only the "Select Location" prompt.
    pub fn empty() -> Self {
        Self {
            options: vec![SelectOption { value: None, label: SELECT_PROMPT.to_string() }],
            selected: None,
        }
    }

    pub fn from_locations(locations: &[Location]) -> Self {
        let mut view = Self::empty();
        view.options.extend(locations.iter().map(|loc| SelectOption {
            value: Some(loc.id),
            label: format!("{}, {}", loc.name, loc.city),
        }));
        view
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.options.iter().any(|opt| opt.value == Some(id))
    }

    /// Locations only, without the prompt entry.
    pub fn choices(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter().filter(|opt| opt.value.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub aqi: String,
    pub status: String,
    pub pm25: String,
    pub pm10: String,
    /// Gauge fill in percent, `0.0..=100.0`.
    pub pm25_bar: f64,
    pub pm10_bar: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatsView {
    pub fn placeholder() -> Self {
        Self {
            aqi: PLACEHOLDER.to_string(),
            status: PLACEHOLDER.to_string(),
            pm25: PLACEHOLDER.to_string(),
            pm10: PLACEHOLDER.to_string(),
            pm25_bar: 0.0,
            pm10_bar: 0.0,
            updated_at: None,
        }
    }

    pub fn from_record(record: &PollutionRecord) -> Self {
        Self {
            aqi: record.aqi.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string()),
            status: aqi::describe(record.aqi),
            pm25: concentration(record.pm25),
            pm10: concentration(record.pm10),
            pm25_bar: bar_width(record.pm25),
            pm10_bar: bar_width(record.pm10),
            updated_at: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub temperature: String,
    pub condition: String,
}

impl WeatherView {
    pub fn placeholder() -> Self {
        Self {
            temperature: TEMPERATURE_PLACEHOLDER.to_string(),
            condition: PLACEHOLDER.to_string(),
        }
    }

    pub fn from_prediction(prediction: &WeatherPrediction) -> Self {
        Self {
            temperature: format!("{:.1}°C", prediction.predicted_temp),
            condition: prediction.condition.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightView {
    pub analysis: String,
    pub advice: Vec<String>,
}

impl InsightView {
    pub fn placeholder() -> Self {
        Self { analysis: PLACEHOLDER.to_string(), advice: vec![NO_DATA_ADVICE.to_string()] }
    }

    pub fn loading() -> Self {
        Self { analysis: ANALYSIS_LOADING.to_string(), advice: vec![ADVICE_LOADING.to_string()] }
    }

    pub fn unavailable() -> Self {
        Self {
            analysis: ANALYSIS_UNAVAILABLE.to_string(),
            advice: vec![ADVICE_UNAVAILABLE.to_string()],
        }
    }

    pub fn from_texts(analysis: &str, advice: &str) -> Self {
        Self { analysis: analysis_preview(analysis), advice: advice_lines(advice) }
    }
}

/// Both ingestion buttons, as the user sees them right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    FetchCity,
    FetchReal,
}

impl ButtonId {
    pub fn idle_label(&self) -> &'static str {
        match self {
            ButtonId::FetchCity => "Fetch by city",
            ButtonId::FetchReal => "Fetch real-time",
        }
    }

    pub fn loading_label(&self) -> &'static str {
        match self {
            ButtonId::FetchCity => "Loading...",
            ButtonId::FetchReal => "Fetching...",
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub selector: SelectorView,
    pub stats: StatsView,
    pub weather: WeatherView,
    pub insights: InsightView,
    pub fetch_city_button: ButtonView,
    pub fetch_real_button: ButtonView,
    pub management_visible: bool,
}

impl Screen {
    pub fn placeholder() -> Self {
        Self {
            selector: SelectorView::empty(),
            stats: StatsView::placeholder(),
            weather: WeatherView::placeholder(),
            insights: InsightView::placeholder(),
            fetch_city_button: ButtonView { label: ButtonId::FetchCity.idle_label().to_string() },
            fetch_real_button: ButtonView { label: ButtonId::FetchReal.idle_label().to_string() },
            management_visible: false,
        }
    }

    /// Reset the data regions, leaving selector, buttons and panel alone.
    pub fn reset_data(&mut self) {
        self.stats = StatsView::placeholder();
        self.weather = WeatherView::placeholder();
        self.insights = InsightView::placeholder();
    }

    pub fn button_mut(&mut self, id: ButtonId) -> &mut ButtonView {
        match id {
            ButtonId::FetchCity => &mut self.fetch_city_button,
            ButtonId::FetchReal => &mut self.fetch_real_button,
        }
    }
}

/// First [`ANALYSIS_PREVIEW_CHARS`] characters, with `...` appended only when
/// something was cut.
pub fn analysis_preview(text: &str) -> String {
    match text.char_indices().nth(ANALYSIS_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn advice_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn concentration(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v} µg/m³"))
}

fn bar_width(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => (v / BAR_FULL_SCALE * 100.0).clamp(0.0, 100.0),
        Some(v) if v == f64::INFINITY => 100.0,
        _ => 0.0,
    }
}

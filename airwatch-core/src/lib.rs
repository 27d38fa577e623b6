//! Core library for the `airwatch` pollution dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The backend REST client behind the [`DashboardApi`] trait
//! - Shared domain models (locations, pollution records, predictions, AI text)
//! - The AQI classifier and pure view rendering
//! - The [`Dashboard`] controller tying them together
//!
//! It is used by `airwatch-cli`, but the controller only needs a
//! [`DashboardApi`] and a [`Notifier`], so other front ends can reuse it.

pub mod api;
pub mod aqi;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod selection;
pub mod view;

pub use api::{ApiError, ApiResult, DashboardApi, HttpApi};
pub use aqi::AqiCategory;
pub use config::Config;
pub use dashboard::{Dashboard, IngestOutcome, Notifier};
pub use model::{
    AiAdvice, AiAnalysis, Location, LocationId, NewLocation, PollutionRecord, WeatherPrediction,
};
pub use view::Screen;

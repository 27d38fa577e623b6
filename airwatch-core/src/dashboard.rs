//! The dashboard controller.
//!
//! [`Dashboard`] drives the backend calls for each user action and writes
//! the results into its [`Screen`]. Region writes made on behalf of a load
//! carry a selection [`Ticket`]; once the user has picked another location,
//! late responses for the old one are dropped instead of overwriting the
//! newer state.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    api::{ApiError, ApiResult, DashboardApi},
    model::{AiAdvice, AiAnalysis, Location, LocationId, NewLocation},
    selection::{Selection, Ticket},
    view::{ButtonId, InsightView, Screen, SelectorView, StatsView, WeatherView},
};

/// Blocking, user-facing messages.
pub trait Notifier: Send + Sync + Debug {
    fn alert(&self, message: &str);
}

/// Result of an ingestion action.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Input was missing or malformed; nothing was sent.
    Rejected,
    /// The backend call failed; the dashboard was left as it was.
    Failed(ApiError),
    /// Data was ingested and the dashboard now shows this location.
    Ingested(LocationId),
}

#[derive(Debug)]
pub struct Dashboard {
    api: Arc<dyn DashboardApi>,
    notifier: Arc<dyn Notifier>,
    seed: Option<NewLocation>,
    selection: Mutex<Selection>,
    screen: Mutex<Screen>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn DashboardApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            seed: None,
            selection: Mutex::new(Selection::default()),
            screen: Mutex::new(Screen::placeholder()),
        }
    }

    /// Location to create when the backend has none.
    pub fn with_seed(mut self, seed: Option<NewLocation>) -> Self {
        self.seed = seed;
        self
    }

    /// Copy of everything currently displayed.
    pub fn snapshot(&self) -> Screen {
        lock(&self.screen).clone()
    }

    pub fn current_location(&self) -> Option<LocationId> {
        lock(&self.selection).current()
    }

    pub fn show_management(&self) {
        lock(&self.screen).management_visible = true;
    }

    pub fn hide_management(&self) {
        lock(&self.screen).management_visible = false;
    }

    /// Re-populate the location selector. Failures are logged and leave
    /// only the "Select Location" prompt. Returns the number of locations.
    pub async fn refresh_locations(&self) -> usize {
        let locations = match self.locations_or_seed().await {
            Ok(locations) => locations,
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch locations");
                lock(&self.screen).selector = SelectorView::empty();
                return 0;
            }
        };

        let mut screen = lock(&self.screen);
        let selected = screen
            .selector
            .selected
            .filter(|id| locations.iter().any(|loc| loc.id == *id));
        screen.selector = SelectorView::from_locations(&locations);
        screen.selector.selected = selected;

        tracing::debug!(count = locations.len(), "location selector refreshed");
        locations.len()
    }

    async fn locations_or_seed(&self) -> ApiResult<Vec<Location>> {
        let locations = self.api.list_locations().await?;
        if !locations.is_empty() {
            return Ok(locations);
        }

        let Some(seed) = &self.seed else {
            return Ok(locations);
        };

        tracing::info!(name = %seed.name, city = %seed.city, "no locations yet, creating seed");
        self.api.create_location(seed).await?;

        self.api.list_locations().await
    }

    /// Make `location` the active selection and load every region for it.
    pub async fn load(&self, location: LocationId) {
        let ticket = lock(&self.selection).select(location);
        lock(&self.screen).selector.selected = Some(location);

        tracing::debug!(%location, "loading dashboard");
        self.load_for(ticket).await;
    }

    async fn load_for(&self, ticket: Ticket) {
        let location = ticket.location();

        let still_current = match self.api.pollution_records(location).await {
            Ok(records) => match records.first() {
                None => {
                    tracing::info!(%location, "no pollution records, showing placeholders");
                    self.commit(&ticket, "placeholders", Screen::reset_data);
                    return;
                }
                Some(latest) => {
                    let stats = StatsView::from_record(latest);
                    self.commit(&ticket, "stats", |screen| screen.stats = stats)
                }
            },
            Err(err) => {
                tracing::error!(%location, error = %err, "failed to load pollution records");
                self.commit(&ticket, "stats", |screen| screen.stats = StatsView::placeholder())
            }
        };
        if !still_current {
            return;
        }

        let weather = match self.api.predict_weather(location).await {
            Ok(prediction) => WeatherView::from_prediction(&prediction),
            Err(err) => {
                tracing::warn!(%location, error = %err, "weather prediction unavailable");
                WeatherView::placeholder()
            }
        };
        if !self.commit(&ticket, "weather", |screen| screen.weather = weather) {
            return;
        }

        self.insights_for(ticket).await;
    }

    /// Reload only the AI regions for `location`, making it the selection.
    pub async fn load_insights(&self, location: LocationId) {
        let ticket = lock(&self.selection).select(location);
        self.insights_for(ticket).await;
    }

    /// Reload the AI regions for whatever is selected; no-op otherwise.
    pub async fn refresh_insights(&self) {
        let Some(ticket) = lock(&self.selection).ticket() else {
            tracing::debug!("no location selected, nothing to refresh");
            return;
        };

        self.insights_for(ticket).await;
    }

    async fn insights_for(&self, ticket: Ticket) {
        let location = ticket.location();

        if !self.commit(&ticket, "insights", |screen| screen.insights = InsightView::loading()) {
            return;
        }

        let view = match self.fetch_insights(location).await {
            Ok((analysis, advice)) => InsightView::from_texts(&analysis.analysis, &advice.advice),
            Err(err) => {
                tracing::warn!(%location, error = %err, "AI insights unavailable");
                InsightView::unavailable()
            }
        };

        self.commit(&ticket, "insights", |screen| screen.insights = view);
    }

    async fn fetch_insights(&self, location: LocationId) -> ApiResult<(AiAnalysis, AiAdvice)> {
        let analysis = self.api.analyze(location).await?;
        let advice = self.api.advice(location).await?;
        Ok((analysis, advice))
    }

    /// Ask the backend to pull fresh data for `input` (a city name), then
    /// show the location it was stored under.
    pub async fn ingest_by_city(&self, input: &str) -> IngestOutcome {
        let city = input.trim();
        if city.is_empty() {
            self.notifier.alert("Please enter a city name.");
            return IngestOutcome::Rejected;
        }

        let _busy = ButtonGuard::engage(&self.screen, ButtonId::FetchCity);

        match self.api.fetch_by_city(city).await {
            Ok(record) => {
                tracing::info!(city, location = %record.location_id, "city data ingested");
                self.notifier.alert(&format!("Data for {city} fetched successfully!"));
                self.finish_ingest(record.location_id).await
            }
            Err(err) => self.fail_ingest(err, "Failed to fetch city data."),
        }
    }

    /// Ask the backend to pull real-time data for an existing location id.
    pub async fn ingest_real_time(&self, input: &str) -> IngestOutcome {
        let raw = input.trim();
        if raw.is_empty() {
            self.notifier.alert("Please enter a Location ID.");
            return IngestOutcome::Rejected;
        }

        let Ok(location) = raw.parse::<LocationId>() else {
            self.notifier.alert("Location ID must be a number.");
            return IngestOutcome::Rejected;
        };

        let _busy = ButtonGuard::engage(&self.screen, ButtonId::FetchReal);

        match self.api.fetch_real_time(location).await {
            Ok(_) => {
                tracing::info!(%location, "real-time data ingested");
                self.notifier.alert("Real-time data fetched successfully!");
                self.finish_ingest(location).await
            }
            Err(err) => self.fail_ingest(err, "Failed to fetch real-time data."),
        }
    }

    async fn finish_ingest(&self, location: LocationId) -> IngestOutcome {
        self.hide_management();
        self.refresh_locations().await;
        self.load(location).await;
        IngestOutcome::Ingested(location)
    }

    fn fail_ingest(&self, err: ApiError, fallback: &str) -> IngestOutcome {
        tracing::warn!(error = %err, "ingestion failed");
        self.notifier.alert(err.detail().unwrap_or(fallback));
        IngestOutcome::Failed(err)
    }

    /// Apply `write` unless `ticket` has been superseded. Returns whether it
    /// was applied.
    fn commit(&self, ticket: &Ticket, region: &str, write: impl FnOnce(&mut Screen)) -> bool {
        let selection = lock(&self.selection);
        if !selection.is_current(ticket) {
            tracing::debug!(
                location = %ticket.location(),
                region,
                "dropping stale response"
            );
            return false;
        }

        write(&mut lock(&self.screen));
        true
    }
}

/// Shows a button's loading label until dropped, then puts the original
/// label back, whatever path the action took.
struct ButtonGuard<'a> {
    screen: &'a Mutex<Screen>,
    id: ButtonId,
    original: String,
}

impl<'a> ButtonGuard<'a> {
    fn engage(screen: &'a Mutex<Screen>, id: ButtonId) -> Self {
        let original = std::mem::replace(
            &mut lock(screen).button_mut(id).label,
            id.loading_label().to_string(),
        );

        Self { screen, id, original }
    }
}

impl Drop for ButtonGuard<'_> {
    fn drop(&mut self) {
        lock(self.screen).button_mut(self.id).label = std::mem::take(&mut self.original);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

use std::{fmt, io::IsTerminal, sync::Arc};

use airwatch_core::{
    Config, Dashboard, HttpApi, IngestOutcome, LocationId, config::DEFAULT_API_BASE,
    view::SelectorView,
};
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Select, Text};

use crate::{notify::TerminalNotifier, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "airwatch", version, about = "Air pollution dashboard CLI")]
pub struct Cli {
    /// Backend base URL; overrides the configured value.
    #[arg(long, global = true, env = "AIRWATCH_API_BASE")]
    pub api_base: Option<String>,

    /// Never create the seed location, even if seeding is configured.
    #[arg(long, global = true)]
    pub no_seed: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the backend URL and seeding behaviour.
    Configure,

    /// List monitored locations.
    Locations,

    /// Show the dashboard for a location.
    Show {
        /// Location id; if absent, pick one interactively.
        location: Option<i64>,
    },

    /// Reload AI analysis and advice only.
    Insights {
        /// Location id; defaults to the last one shown.
        location: Option<i64>,
    },

    /// Pull fresh pollution data for a city.
    FetchCity {
        /// City name, e.g. "Mumbai".
        city: String,
    },

    /// Pull real-time data for an existing location.
    FetchReal {
        /// Location id.
        location: String,
    },

    /// Open the data management panel.
    Manage,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut stored = Config::load()?;

        if let Command::Configure = self.command {
            return configure(stored);
        }

        let config = stored.clone().with_api_base_override(self.api_base);
        let api = HttpApi::new(config.api_base(), config.timeout())
            .with_context(|| format!("Cannot use backend at {}", config.api_base()))?;
        tracing::debug!(api_base = api.base(), "using backend");

        let interactive = std::io::stdin().is_terminal();
        let acknowledge = interactive && matches!(self.command, Command::Manage);
        let seed = if self.no_seed { None } else { config.seed() };

        let dashboard = Dashboard::new(Arc::new(api), Arc::new(TerminalNotifier::new(acknowledge)))
            .with_seed(seed);

        match self.command {
            // Handled before the backend client is built.
            Command::Configure => {}
            Command::Locations => {
                dashboard.refresh_locations().await;
                print!("{}", render::selector(&dashboard.snapshot().selector));
            }
            Command::Show { location } => {
                dashboard.refresh_locations().await;

                let chosen = match location {
                    Some(id) => Some(LocationId(id)),
                    None if interactive => {
                        pick_location(&dashboard.snapshot().selector, stored.last_location())?
                    }
                    None => stored.last_location(),
                };

                let Some(id) = chosen else {
                    bail!(
                        "No location selected.\n\
                         Hint: pass a location id, e.g. `airwatch show 1`."
                    );
                };

                dashboard.load(id).await;
                remember(&mut stored, id);
                print!("{}", render::screen(&dashboard.snapshot()));
            }
            Command::Insights { location } => {
                let id = location.map(LocationId).or(stored.last_location()).ok_or_else(|| {
                    anyhow!(
                        "No location given and none remembered.\n\
                         Hint: run `airwatch show` first or pass a location id."
                    )
                })?;

                dashboard.load_insights(id).await;
                print!("{}", render::insights(&dashboard.snapshot().insights));
            }
            Command::FetchCity { city } => {
                let outcome = dashboard.ingest_by_city(&city).await;
                report(&dashboard, &mut stored, outcome)?;
            }
            Command::FetchReal { location } => {
                let outcome = dashboard.ingest_real_time(&location).await;
                report(&dashboard, &mut stored, outcome)?;
            }
            Command::Manage => {
                if !interactive {
                    bail!("`airwatch manage` needs an interactive terminal.");
                }
                manage(&dashboard, &mut stored).await?;
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.api_base().to_string();

    let api_base = Text::new("Backend URL:")
        .with_default(&current)
        .with_help_message(&format!("Default is {DEFAULT_API_BASE}"))
        .prompt()
        .context("Configuration cancelled")?;

    let seed_on_empty = Confirm::new("Create a seed location when the backend has none?")
        .with_default(config.seed_on_empty)
        .prompt()
        .context("Configuration cancelled")?;

    config.api_base = Some(api_base.trim().to_string());
    config.seed_on_empty = seed_on_empty;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Entry in the interactive picker.
struct Choice {
    id: LocationId,
    label: String,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.label, self.id)
    }
}

fn pick_location(
    selector: &SelectorView,
    last: Option<LocationId>,
) -> anyhow::Result<Option<LocationId>> {
    let choices: Vec<Choice> = selector
        .choices()
        .filter_map(|opt| opt.value.map(|id| Choice { id, label: opt.label.clone() }))
        .collect();

    if choices.is_empty() {
        bail!(
            "No locations available.\n\
             Hint: run `airwatch fetch-city <CITY>` to add one."
        );
    }

    let cursor = last.and_then(|id| choices.iter().position(|c| c.id == id)).unwrap_or(0);

    match Select::new("Location:", choices).with_starting_cursor(cursor).prompt() {
        Ok(choice) => Ok(Some(choice.id)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read location choice"),
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    FetchCity,
    FetchReal,
    Close,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::FetchCity => "Fetch data by city name",
            Action::FetchReal => "Fetch real-time data by location id",
            Action::Close => "Close",
        })
    }
}

async fn manage(dashboard: &Dashboard, stored: &mut Config) -> anyhow::Result<()> {
    dashboard.show_management();
    dashboard.refresh_locations().await;

    while dashboard.snapshot().management_visible {
        let actions = vec![Action::FetchCity, Action::FetchReal, Action::Close];
        let action = match Select::new("Manage data:", actions).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Action::Close
            }
            Err(err) => return Err(err).context("Failed to read menu choice"),
        };

        let outcome = match action {
            Action::Close => {
                dashboard.hide_management();
                break;
            }
            Action::FetchCity => {
                let Some(city) = Text::new("City name:").prompt_skippable()? else { continue };
                dashboard.ingest_by_city(&city).await
            }
            Action::FetchReal => {
                let Some(raw) = Text::new("Location id:").prompt_skippable()? else { continue };
                dashboard.ingest_real_time(&raw).await
            }
        };

        // Successful ingestion closes the panel; failures keep it open for
        // another attempt.
        if let IngestOutcome::Ingested(id) = outcome {
            remember(stored, id);
            print!("{}", render::screen(&dashboard.snapshot()));
        }
    }

    Ok(())
}

fn report(
    dashboard: &Dashboard,
    stored: &mut Config,
    outcome: IngestOutcome,
) -> anyhow::Result<()> {
    match outcome {
        IngestOutcome::Ingested(id) => {
            remember(stored, id);
            print!("{}", render::screen(&dashboard.snapshot()));
            Ok(())
        }
        IngestOutcome::Failed(err) => Err(err).context("Ingestion failed"),
        IngestOutcome::Rejected => bail!("Nothing was ingested."),
    }
}

/// Persist `id` as the default for the next `show`; failing to save is not
/// worth aborting over.
fn remember(stored: &mut Config, id: LocationId) {
    if stored.last_location() == Some(id) {
        return;
    }

    stored.remember_location(id);
    if let Err(err) = stored.save() {
        tracing::warn!(error = %err, "could not remember last location");
    }
}

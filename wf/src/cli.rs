//! CLI command definitions and subcommands

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result, eyre};
use tracing::debug;

use crate::config::{LlmConfig, PhotosConfig};
use crate::plan::TripRequest;

/// Wayfarer - staged trip planner and travel post previews
#[derive(Parser)]
#[command(
    name = "wf",
    about = "Staged LLM trip planner and travel-post preview aggregator",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip through the staged LLM pipeline
    Plan(PlanArgs),

    /// Search blogger feeds for travel post previews
    Previews {
        /// Search keyword (whitespace-separated tokens match any)
        keyword: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that the feed endpoints are reachable
    Health {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the registered feed sources
    Sources {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Arguments for `wf plan`
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Read the whole trip request from a JSON file
    #[arg(short, long, conflicts_with_all = ["city", "start_date", "end_date", "days"])]
    pub request: Option<PathBuf>,

    /// Destination city
    #[arg(long, required_unless_present = "request")]
    pub city: Option<String>,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(long, required_unless_present = "request")]
    pub start_date: Option<String>,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long, required_unless_present = "request")]
    pub end_date: Option<String>,

    /// Number of days (derived from the dates when omitted)
    #[arg(long)]
    pub days: Option<u32>,

    /// Travel preferences
    #[arg(long, default_value = "sightseeing")]
    pub preferences: String,

    /// Budget level
    #[arg(long, default_value = "moderate")]
    pub budget: String,

    /// Preferred way of getting around
    #[arg(long, default_value = "public transport")]
    pub transportation: String,

    /// Lodging preference
    #[arg(long, default_value = "comfortable hotel")]
    pub accommodation: String,

    /// Print progress events as `data: {json}` frames while planning
    #[arg(long)]
    pub stream: bool,

    /// Skip the attraction image lookup
    #[arg(long)]
    pub no_images: bool,

    /// Output format (ignored with --stream)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

impl PlanArgs {
    /// Build the trip request from a file or from the individual flags
    pub fn to_request(&self) -> Result<TripRequest> {
        debug!(request = ?self.request, "to_request: called");
        let request = match self.request {
            Some(ref path) => load_request(path)?,
            None => {
                let city = self.city.clone().ok_or_else(|| eyre!("--city is required"))?;
                let start_date = self.start_date.clone().ok_or_else(|| eyre!("--start-date is required"))?;
                let end_date = self.end_date.clone().ok_or_else(|| eyre!("--end-date is required"))?;
                let days = match self.days {
                    Some(days) => days,
                    None => days_between(&start_date, &end_date)?,
                };
                TripRequest {
                    city,
                    start_date,
                    end_date,
                    days,
                    preferences: self.preferences.clone(),
                    budget: self.budget.clone(),
                    transportation: self.transportation.clone(),
                    accommodation: self.accommodation.clone(),
                }
            }
        };

        if request.days == 0 {
            return Err(eyre!("A trip needs at least one day"));
        }
        if request.city.trim().is_empty() {
            return Err(eyre!("A trip needs a destination city"));
        }
        Ok(request)
    }
}

fn load_request(path: &Path) -> Result<TripRequest> {
    debug!(?path, "load_request: called");
    let content =
        fs::read_to_string(path).context(format!("Failed to read trip request: {}", path.display()))?;
    serde_json::from_str(&content).context(format!("Failed to parse trip request: {}", path.display()))
}

/// Inclusive day count between two `YYYY-MM-DD` dates
pub fn days_between(start: &str, end: &str) -> Result<u32> {
    debug!(%start, %end, "days_between: called");
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").context(format!("Invalid start date: {}", start))?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d").context(format!("Invalid end date: {}", end))?;
    let days = (end_date - start_date).num_days() + 1;
    if days < 1 {
        return Err(eyre!("End date {} is before start date {}", end, start));
    }
    u32::try_from(days).context("Trip is too long")
}

/// Output format for command results
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text, json", s))
            }
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wayfarer")
        .join("logs")
        .join("wayfarer.log")
}

/// Generate the after_help text with credential checks and the log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let llm_key = LlmConfig::default().api_key_env;
    let photo_key = PhotosConfig::default().access_key_env;

    let mut help = String::new();
    help.push_str("Credentials (default variables):\n");
    for (var, purpose) in [(llm_key, "planning"), (photo_key, "attraction images")] {
        let icon = if std::env::var(&var).is_ok() {
            "\u{2705}"
        } else {
            "\u{274C}"
        };
        help.push_str(&format!("  {} {:<22} {}\n", icon, var, purpose));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

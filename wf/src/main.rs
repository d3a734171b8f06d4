//! Wayfarer - staged trip planner and travel post previews
//!
//! CLI entry point.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use wayfarer::cli::{Cli, Command, OutputFormat, PlanArgs, generate_after_help};
use wayfarer::config::Config;
use wayfarer::feeds::{
    AggregationResult, Aggregator, EndpointHealth, HealthStatus, HttpTransport, sources,
};
use wayfarer::llm::{LlmClient, create_client};
use wayfarer::photos::{ImageBackfill, NameTranslator, PhotoFinder, UnsplashClient};
use wayfarer::pipeline::{Orchestrator, PlanEvent};
use wayfarer::plan::TripPlan;
use wayfarer::prompts::PromptLoader;

fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wayfarer")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("wayfarer.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, endpoints = config.feeds.endpoints.len(), "Wayfarer loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Plan(args)) => cmd_plan(&config, args).await,
        Some(Command::Previews { keyword, format }) => cmd_previews(&config, &keyword, format).await,
        Some(Command::Health { format }) => cmd_health(&config, format).await,
        Some(Command::Sources { format }) => cmd_sources(format),
        None => {
            debug!("main: no command, printing help");
            Cli::command().after_help(generate_after_help()).print_help()?;
            Ok(())
        }
    }
}

/// Build the image backfill, or explain why it is unavailable
fn build_backfill(config: &Config, llm: Arc<dyn LlmClient>, prompts: &PromptLoader) -> Result<ImageBackfill> {
    debug!("build_backfill: called");
    let search = UnsplashClient::from_config(&config.photos).context("Photo search unavailable")?;
    let translator = if config.photos.translate {
        Some(NameTranslator::new(llm, prompts)?)
    } else {
        None
    };
    let finder = PhotoFinder::new(Arc::new(search), translator);
    Ok(ImageBackfill::new(
        finder,
        config.photos.images_per_attraction,
        config.photos.concurrency,
    ))
}

/// Plan a trip
async fn cmd_plan(config: &Config, args: PlanArgs) -> Result<()> {
    debug!(?args, "cmd_plan: called");
    config.validate()?;
    let request = args.to_request()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = Arc::new(PromptLoader::from_config(config.pipeline.prompts_dir.as_ref()));
    let mut orchestrator = Orchestrator::new(llm.clone(), prompts.clone(), config.pipeline.clone());

    if config.photos.enabled && !args.no_images {
        match build_backfill(config, llm, &prompts) {
            Ok(backfill) => orchestrator = orchestrator.with_backfill(Arc::new(backfill)),
            Err(e) => warn!(error = %e, "cmd_plan: continuing without attraction images"),
        }
    }

    if args.stream {
        debug!("cmd_plan: streaming progress");
        let mut events = orchestrator.stream(request);
        let mut failure = None;
        let mut stdout = std::io::stdout();
        while let Some(event) = events.recv().await {
            write!(stdout, "{}", event.to_sse_frame()?)?;
            stdout.flush()?;
            if let PlanEvent::Failed { error, .. } = event {
                failure = Some(error);
            }
        }
        return match failure {
            Some(error) => Err(eyre!("Trip planning failed: {}", error)),
            None => Ok(()),
        };
    }

    let plan = orchestrator.execute(&request).await.context("Trip planning failed")?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print_plan(&plan),
    }
    Ok(())
}

fn print_plan(plan: &TripPlan) {
    println!(
        "{} {} ({} to {})",
        "Trip plan:".bold(),
        plan.city.cyan(),
        plan.start_date,
        plan.end_date
    );

    for day in &plan.days {
        println!();
        println!("{} {}  {}", format!("Day {}", day.day_index + 1).green().bold(), day.date, day.description);
        println!("  Getting around: {}", day.transportation);
        if let Some(ref hotel) = day.hotel {
            println!("  Hotel: {} ({})", hotel.name, hotel.address);
        } else {
            println!("  Stay: {}", day.accommodation);
        }
        for attraction in &day.attractions {
            let price = if attraction.ticket_price == 0 {
                "free".to_string()
            } else {
                format!("¥{}", attraction.ticket_price)
            };
            println!(
                "  - {} [{} min, {}] {}",
                attraction.name.bold(),
                attraction.visit_duration,
                price,
                attraction.address.dimmed()
            );
        }
        for meal in &day.meals {
            println!("  * {}: {} (~¥{})", meal.meal_type, meal.name, meal.estimated_cost);
        }
    }

    if !plan.weather_info.is_empty() {
        println!();
        println!("{}", "Weather".bold());
        for w in &plan.weather_info {
            println!(
                "  {}  {} / {}  {}°C / {}°C  {} {}",
                w.date, w.day_weather, w.night_weather, w.day_temp, w.night_temp, w.wind_direction, w.wind_power
            );
        }
    }

    if let Some(ref budget) = plan.budget {
        println!();
        println!("{}", "Budget".bold());
        println!("  Attractions:    ¥{}", budget.total_attractions);
        println!("  Hotels:         ¥{}", budget.total_hotels);
        println!("  Meals:          ¥{}", budget.total_meals);
        println!("  Transportation: ¥{}", budget.total_transportation);
        println!("  Total:          ¥{}", budget.total.to_string().bold());
    }

    println!();
    println!("{}", plan.overall_suggestions);
    if !plan.search_keywords.is_empty() {
        println!("{} {}", "Search keywords:".dimmed(), plan.search_keywords.join(", "));
    }
}

fn build_aggregator(config: &Config) -> Result<Aggregator> {
    config.feeds.validate()?;
    let transport = HttpTransport::new().context("Failed to create HTTP client")?;
    Ok(Aggregator::new(Arc::new(transport), sources().to_vec(), config.feeds.clone()))
}

/// Search feeds for post previews
async fn cmd_previews(config: &Config, keyword: &str, format: OutputFormat) -> Result<()> {
    debug!(%keyword, ?format, "cmd_previews: called");
    let aggregator = build_aggregator(config)?;
    let result = aggregator.search(keyword).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_previews(&result),
    }
    Ok(())
}

fn print_previews(result: &AggregationResult) {
    if !result.is_success() {
        println!("{} {}", "No previews.".yellow(), result.message.as_deref().unwrap_or_default());
        println!("Search: {}", result.search_url.cyan());
        return;
    }

    for (i, post) in result.data.iter().enumerate() {
        println!(
            "{}. {} {}",
            i + 1,
            post.title.bold(),
            format!("({} likes)", post.liked_count).dimmed()
        );
        println!(
            "   {} [{}] {}",
            post.author,
            post.author_tags.join(", "),
            post.published.as_deref().unwrap_or("")
        );
        println!("   {}", post.note_url.cyan());
    }
    println!();
    println!("More: {}", result.search_url);
}

/// Probe the feed endpoints
async fn cmd_health(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_health: called");
    let aggregator = build_aggregator(config)?;
    let health = aggregator.check_health().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
        OutputFormat::Text => health.iter().for_each(print_health),
    }
    Ok(())
}

fn print_health(health: &EndpointHealth) {
    let (icon, label) = match health.status {
        HealthStatus::Ok => ("\u{2705}", "ok".green()),
        HealthStatus::Error => ("\u{274C}", "error".red()),
    };
    let detail = match (health.code, health.error.as_deref()) {
        (Some(code), _) => format!("HTTP {}", code),
        (None, Some(error)) => error.to_string(),
        (None, None) => String::new(),
    };
    println!("{} {:<40} {} {}", icon, health.endpoint, label, detail.dimmed());
}

/// List the registered feed sources
fn cmd_sources(format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_sources: called");
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(sources())?),
        OutputFormat::Text => {
            for source in sources() {
                println!("{} {} [{}]", source.id.dimmed(), source.name.bold(), source.tags.join(", "));
            }
        }
    }
    Ok(())
}

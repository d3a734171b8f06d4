//! Wayfarer - staged trip planner and travel post preview aggregator
//!
//! Two independent services share one crate:
//!
//! - **Trip planning**: four LLM stages (attractions, weather, hotels,
//!   itinerary) whose free-text answers are composed into a final prompt. The
//!   itinerary answer is extracted and validated into a structured
//!   [`TripPlan`], then attraction images are backfilled best-effort.
//! - **Post previews**: a keyword search over a registry of travel blogger
//!   feeds, served by prioritized feed endpoints, that degrades to a plain
//!   search link when nothing matches.
//!
//! # Modules
//!
//! - [`plan`] - Trip plan types and structured-output extraction
//! - [`pipeline`] - Stage orchestration and progress streaming
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`prompts`] - Prompt templates
//! - [`photos`] - Attraction photo lookup and backfill
//! - [`feeds`] - Feed parsing and multi-endpoint aggregation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod feeds;
pub mod llm;
pub mod photos;
pub mod pipeline;
pub mod plan;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, FeedsConfig, LlmConfig, PhotosConfig, PipelineConfig};
pub use feeds::{AggregationResult, AggregationStatus, Aggregator, EndpointHealth, PostRecord, SourceEntry};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use photos::{ImageBackfill, PhotoFinder, PhotoSearch, UnsplashClient};
pub use pipeline::{Orchestrator, PipelineError, PlanEvent, Stage};
pub use plan::{ExtractError, TripPlan, TripRequest, extract_trip_plan};
pub use prompts::PromptLoader;

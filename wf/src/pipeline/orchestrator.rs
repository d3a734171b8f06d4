//! Orchestrator - runs the four planning stages for one trip request
//!
//! Attractions, weather and hotels are independent and run concurrently.
//! The itinerary stage starts once all three have answered and receives their
//! free-text outputs embedded in its query. Its answer goes through the plan
//! extractor; optional image backfill runs last.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PipelineError, PlanEvent, Stage};
use crate::config::PipelineConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::photos::ImageBackfill;
use crate::plan::{TripPlan, TripRequest, extract_trip_plan};
use crate::prompts::PromptLoader;

/// Buffered events between the pipeline task and its consumer
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Context for the itinerary query template
#[derive(Serialize)]
struct PlannerContext<'a> {
    #[serde(flatten)]
    request: &'a TripRequest,
    attractions: &'a str,
    weather: &'a str,
    hotels: &'a str,
}

/// Free-text outputs of the gathering stages
#[derive(Debug, Default)]
struct Gathered {
    attractions: String,
    weather: String,
    hotels: String,
}

impl Gathered {
    fn set(&mut self, stage: Stage, text: String) {
        match stage {
            Stage::Attractions => self.attractions = text,
            Stage::Weather => self.weather = text,
            Stage::Hotels => self.hotels = text,
            Stage::Itinerary => {}
        }
    }
}

/// Runs the staged trip planning pipeline
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    config: PipelineConfig,
    backfill: Option<Arc<ImageBackfill>>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: PipelineConfig) -> Self {
        debug!(stage_timeout_ms = config.stage_timeout_ms, "Orchestrator::new: called");
        Self {
            llm,
            prompts,
            config,
            backfill: None,
        }
    }

    /// Fill missing attraction images after the plan is extracted
    pub fn with_backfill(mut self, backfill: Arc<ImageBackfill>) -> Self {
        debug!("Orchestrator::with_backfill: called");
        self.backfill = Some(backfill);
        self
    }

    /// Run the whole pipeline and return the validated plan
    pub async fn execute(&self, request: &TripRequest) -> Result<TripPlan, PipelineError> {
        debug!(city = %request.city, days = request.days, "execute: called");
        self.run(request, None).await
    }

    /// Run the pipeline in the background, reporting progress as it goes
    ///
    /// Events arrive in pipeline order with increasing progress. The last event
    /// is either `Completed` or `Failed`. Dropping the receiver cancels any
    /// stage call still in flight.
    pub fn stream(&self, request: TripRequest) -> mpsc::Receiver<PlanEvent> {
        debug!(city = %request.city, "stream: called");
        self.spawn_stream(request).0
    }

    fn spawn_stream(&self, request: TripRequest) -> (mpsc::Receiver<PlanEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let this = self.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("stream: receiver dropped, cancelling pipeline");
                }
                result = this.run(&request, Some(&tx)) => {
                    let event = match result {
                        Ok(plan) => PlanEvent::completed(plan),
                        Err(e) => {
                            warn!(error = %e, "stream: pipeline failed");
                            PlanEvent::failed(e)
                        }
                    };
                    if tx.send(event).await.is_err() {
                        debug!("stream: receiver dropped before terminal event");
                    }
                }
            }
        });

        (rx, handle)
    }

    async fn run(&self, request: &TripRequest, events: Option<&mpsc::Sender<PlanEvent>>) -> Result<TripPlan, PipelineError> {
        let run_id = Uuid::now_v7();
        info!(%run_id, city = %request.city, days = request.days, "Planning trip");

        let gathered = self.gather(run_id, request, events).await?;

        let context = PlannerContext {
            request,
            attractions: &gathered.attractions,
            weather: &gathered.weather,
            hotels: &gathered.hotels,
        };
        let query = self
            .prompts
            .render(Stage::Itinerary.query_template(), &context)
            .map_err(|e| PipelineError::Prompt(e.to_string()))?;
        let raw = self
            .call_stage(run_id, Stage::Itinerary, query, self.config.planner_max_tokens)
            .await?;
        emit(events, PlanEvent::stage_done(Stage::Itinerary)).await;

        let mut plan = extract_trip_plan(&raw)?;
        info!(%run_id, days = plan.days.len(), "Trip plan extracted");

        if let Some(ref backfill) = self.backfill {
            let filled = backfill.apply(&mut plan).await;
            debug!(%run_id, filled, "run: image backfill complete");
            emit(events, PlanEvent::images_done()).await;
        }

        Ok(plan)
    }

    /// Run the independent stages concurrently
    ///
    /// Fails as soon as any stage fails, dropping the others. Progress events
    /// are released in stage order even when later stages finish first.
    async fn gather(
        &self,
        run_id: Uuid,
        request: &TripRequest,
        events: Option<&mpsc::Sender<PlanEvent>>,
    ) -> Result<Gathered, PipelineError> {
        debug!(%run_id, "gather: called");
        let mut pending: FuturesUnordered<_> = Stage::GATHER
            .iter()
            .enumerate()
            .map(|(position, &stage)| async move {
                let query = self
                    .prompts
                    .render(stage.query_template(), request)
                    .map_err(|e| PipelineError::Prompt(e.to_string()))?;
                let text = self
                    .call_stage(run_id, stage, query, self.config.stage_max_tokens)
                    .await?;
                Ok::<_, PipelineError>((position, stage, text))
            })
            .collect();

        let mut finished: [Option<(Stage, String)>; 3] = Default::default();
        let mut next_event = 0;
        let mut gathered = Gathered::default();

        while let Some(result) = pending.next().await {
            let (position, stage, text) = result?;
            finished[position] = Some((stage, text));

            while next_event < finished.len() {
                let Some((stage, text)) = finished[next_event].take() else {
                    break;
                };
                gathered.set(stage, text);
                emit(events, PlanEvent::stage_done(stage)).await;
                next_event += 1;
            }
        }

        Ok(gathered)
    }

    /// One bounded LLM call, no retry
    async fn call_stage(&self, run_id: Uuid, stage: Stage, query: String, max_tokens: u32) -> Result<String, PipelineError> {
        debug!(%run_id, %stage, query_len = query.len(), "call_stage: called");
        let system_prompt = self
            .prompts
            .load(stage.system_template())
            .map_err(|e| PipelineError::Prompt(e.to_string()))?;
        let request = CompletionRequest::single(system_prompt, query, max_tokens);
        let limit = self.config.stage_timeout();

        let response = match tokio::time::timeout(limit, self.llm.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                warn!(%run_id, %stage, error = %source, "call_stage: stage failed");
                return Err(PipelineError::StageFailure { stage, source });
            }
            Err(_) => {
                warn!(%run_id, %stage, ?limit, "call_stage: stage timed out");
                return Err(PipelineError::StageFailure {
                    stage,
                    source: LlmError::Timeout(limit),
                });
            }
        };

        if response.is_truncated() {
            warn!(%run_id, %stage, max_tokens, "call_stage: reply cut off at the token limit");
        }
        let text = response.text_or_empty().to_string();
        info!(%run_id, %stage, chars = text.len(), tokens = response.usage.total(), "Stage complete");
        Ok(text)
    }
}

async fn emit(events: Option<&mpsc::Sender<PlanEvent>>, event: PlanEvent) {
    if let Some(tx) = events {
        if tx.send(event).await.is_err() {
            debug!("emit: receiver dropped");
        }
    }
}

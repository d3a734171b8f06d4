//! Staged trip planning pipeline
//!
//! Four LLM stages (attractions, weather, hotels, itinerary), the first three
//! concurrent, feeding one structured-output extraction. Available as a
//! single call or as a stream of progress events.

mod error;
mod events;
mod orchestrator;
mod stage;

pub use error::PipelineError;
pub use events::PlanEvent;
pub use orchestrator::Orchestrator;
pub use stage::Stage;

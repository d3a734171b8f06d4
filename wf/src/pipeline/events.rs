//! Progress events for the streaming pipeline
//!
//! Each event serializes to the flat JSON object consumers expect:
//! `{step, status, progress}` while running, the same plus `data` on
//! completion, and `{error, status}` on failure.

use serde::Serialize;

use super::Stage;
use crate::plan::TripPlan;

const IMAGES_STEP: u8 = 5;
const IMAGES_PROGRESS: u8 = 90;
const IMAGES_STATUS: &str = "🖼️ Images fetched";

const DONE_STEP: u8 = 6;
const DONE_PROGRESS: u8 = 100;
const DONE_STATUS: &str = "✅ Done!";

const FAILED_STATUS: &str = "❌ An error occurred";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanEvent {
    /// A step finished
    Progress { step: u8, status: String, progress: u8 },
    /// Terminal: the plan is ready
    Completed {
        step: u8,
        status: String,
        progress: u8,
        data: Box<TripPlan>,
    },
    /// Terminal: the pipeline aborted
    Failed { error: String, status: String },
}

impl PlanEvent {
    pub fn stage_done(stage: Stage) -> Self {
        PlanEvent::Progress {
            step: stage.step(),
            status: stage.status().to_string(),
            progress: stage.progress(),
        }
    }

    pub fn images_done() -> Self {
        PlanEvent::Progress {
            step: IMAGES_STEP,
            status: IMAGES_STATUS.to_string(),
            progress: IMAGES_PROGRESS,
        }
    }

    pub fn completed(plan: TripPlan) -> Self {
        PlanEvent::Completed {
            step: DONE_STEP,
            status: DONE_STATUS.to_string(),
            progress: DONE_PROGRESS,
            data: Box::new(plan),
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        PlanEvent::Failed {
            error: error.to_string(),
            status: FAILED_STATUS.to_string(),
        }
    }

    /// Percent complete, absent on failure
    pub fn progress(&self) -> Option<u8> {
        match self {
            PlanEvent::Progress { progress, .. } | PlanEvent::Completed { progress, .. } => Some(*progress),
            PlanEvent::Failed { .. } => None,
        }
    }

    /// Nothing follows a terminal event
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlanEvent::Progress { .. })
    }

    /// Render as one server-sent-events frame: `data: {json}` plus a blank line
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiny_plan() -> TripPlan {
        TripPlan {
            city: "Dali".to_string(),
            start_date: "2025-05-01".to_string(),
            end_date: "2025-05-01".to_string(),
            days: vec![],
            weather_info: vec![],
            overall_suggestions: "Have a pleasant trip!".to_string(),
            budget: None,
            search_keywords: vec![],
        }
    }

    #[test]
    fn test_progress_event_wire_shape() {
        let value = serde_json::to_value(PlanEvent::stage_done(Stage::Weather)).unwrap();
        assert_eq!(
            value,
            json!({"step": 2, "status": "🌤️ Weather checked", "progress": 35})
        );
    }

    #[test]
    fn test_completed_event_carries_plan() {
        let event = PlanEvent::completed(tiny_plan());
        assert!(event.is_terminal());
        assert_eq!(event.progress(), Some(100));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["step"], 6);
        assert_eq!(value["data"]["city"], "Dali");
    }

    #[test]
    fn test_failed_event_wire_shape() {
        let event = PlanEvent::failed("Stage 'hotels' failed: timed out");
        assert!(event.is_terminal());
        assert_eq!(event.progress(), None);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["error"], "Stage 'hotels' failed: timed out");
        assert!(value.get("progress").is_none());
    }

    #[test]
    fn test_sse_frame_is_blank_line_delimited() {
        let frame = PlanEvent::images_done().to_sse_frame().unwrap();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("}\n\n"));
        assert!(frame.contains("\"progress\":90"));
    }
}

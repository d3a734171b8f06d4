//! Pull the JSON object out of a free-form model response
//!
//! The candidate is the text between the first `{` and the last `}`, which
//! strips commentary and markdown fences around the object.

use tracing::{debug, warn};

use super::error::ExtractError;
use super::schema::decode_trip_plan;
use super::types::TripPlan;

/// Locate the JSON object candidate inside `raw`
pub fn locate_json_object(raw: &str) -> Result<&str, ExtractError> {
    debug!(raw_len = raw.len(), "locate_json_object: called");
    let start = raw
        .find('{')
        .ok_or_else(|| ExtractError::malformed("no '{' found in model output"))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| ExtractError::malformed("no '}' found in model output"))?;

    if end < start {
        debug!(start, end, "locate_json_object: closing brace precedes opening brace");
        return Err(ExtractError::malformed("last '}' appears before first '{'"));
    }

    Ok(&raw[start..=end])
}

/// Extract and validate a `TripPlan` from raw model output
///
/// All-or-nothing: either every field validates or an error is returned.
pub fn extract_trip_plan(raw: &str) -> Result<TripPlan, ExtractError> {
    debug!(raw_len = raw.len(), "extract_trip_plan: called");
    let candidate = locate_json_object(raw)?;

    let value: serde_json::Value = serde_json::from_str(candidate).map_err(|e| {
        warn!(error = %e, "extract_trip_plan: candidate is not valid JSON");
        ExtractError::malformed_with_fragment(format!("invalid JSON: {}", e), candidate)
    })?;

    let plan = decode_trip_plan(&value).inspect_err(|e| {
        warn!(error = %e, "extract_trip_plan: schema validation failed");
    })?;

    debug!(days = plan.days.len(), city = %plan.city, "extract_trip_plan: plan validated");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PLAN_JSON: &str = r#"{
        "city": "Hangzhou",
        "start_date": "2025-04-01",
        "end_date": "2025-04-02",
        "days": [
            {"date": "2025-04-01", "day_index": 0, "attractions": [{"name": "West Lake", "ticket_price": 0}]},
            {"date": "2025-04-02", "day_index": 1, "meals": [{"type": "lunch", "name": "Lou Wai Lou", "estimated_cost": 120}]}
        ],
        "search_keywords": ["Hangzhou travel guide"]
    }"#;

    #[test]
    fn test_extracts_plan_from_markdown_fence() {
        let raw = format!("Here is your plan:\n```json\n{}\n```\nEnjoy!", PLAN_JSON);
        let plan = extract_trip_plan(&raw).unwrap();
        assert_eq!(plan.city, "Hangzhou");
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[1].meals[0].estimated_cost, 120);
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = extract_trip_plan("I could not produce a plan today.").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput { .. }));
    }

    #[test]
    fn test_only_opening_brace_is_malformed() {
        let err = extract_trip_plan("{ \"city\": \"Xi'an\"").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput { .. }));
    }

    #[test]
    fn test_reversed_braces_are_malformed() {
        let err = locate_json_object("} nothing here {").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput { .. }));
    }

    #[test]
    fn test_invalid_json_carries_fragment() {
        let err = extract_trip_plan("plan: {\"city\": \"Chengdu\",, } done").unwrap_err();
        match err {
            ExtractError::MalformedOutput { fragment, .. } => {
                assert_eq!(fragment.as_deref(), Some("{\"city\": \"Chengdu\",, }"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_schema_violation_surfaces() {
        let err = extract_trip_plan(r#"{"city": "Chengdu", "start_date": "x"}"#).unwrap_err();
        assert_eq!(
            err,
            ExtractError::SchemaViolation {
                field: "end_date".to_string(),
                expected: "a string".to_string(),
            }
        );
    }

    #[test]
    fn test_day_indices_are_contiguous() {
        let plan = extract_trip_plan(PLAN_JSON).unwrap();
        let indices: Vec<u32> = plan.days.iter().map(|d| d.day_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_recovers_object_from_noise(prefix in "[^{}]{0,40}", suffix in "[^{}]{0,40}") {
            let raw = format!("{}{}{}", prefix, PLAN_JSON, suffix);
            let located = locate_json_object(&raw).unwrap();
            prop_assert_eq!(located, PLAN_JSON);
            let plan = extract_trip_plan(&raw).unwrap();
            prop_assert_eq!(plan.city, "Hangzhou");
        }

        #[test]
        fn prop_text_without_braces_is_malformed(text in "[^{}]{0,80}") {
            let is_malformed = matches!(extract_trip_plan(&text), Err(ExtractError::MalformedOutput { .. }));
            prop_assert!(is_malformed);
        }

        #[test]
        fn prop_n_day_plan_has_indices_zero_to_n(n in 1usize..8) {
            let days: Vec<serde_json::Value> = (0..n)
                .map(|i| serde_json::json!({"date": format!("day-{}", i), "day_index": i}))
                .collect();
            let raw = serde_json::json!({
                "city": "Suzhou", "start_date": "a", "end_date": "b", "days": days
            })
            .to_string();
            let plan = extract_trip_plan(&raw).unwrap();
            let indices: Vec<u32> = plan.days.iter().map(|d| d.day_index).collect();
            prop_assert_eq!(indices, (0..n as u32).collect::<Vec<_>>());
        }
    }
}

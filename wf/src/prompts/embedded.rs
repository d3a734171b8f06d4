//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Attraction discovery system prompt
pub const ATTRACTION: &str = include_str!("../../prompts/attraction.pmt");

/// Weather lookup system prompt
pub const WEATHER: &str = include_str!("../../prompts/weather.pmt");

/// Lodging discovery system prompt
pub const HOTEL: &str = include_str!("../../prompts/hotel.pmt");

/// Itinerary synthesis system prompt (carries the JSON output contract)
pub const PLANNER: &str = include_str!("../../prompts/planner.pmt");

pub const ATTRACTION_QUERY: &str = include_str!("../../prompts/attraction-query.pmt");
pub const WEATHER_QUERY: &str = include_str!("../../prompts/weather-query.pmt");
pub const HOTEL_QUERY: &str = include_str!("../../prompts/hotel-query.pmt");
pub const PLANNER_QUERY: &str = include_str!("../../prompts/planner-query.pmt");

/// Attraction name translator, used before photo search
pub const TRANSLATE: &str = include_str!("../../prompts/translate.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let prompt = match name {
        "attraction" => ATTRACTION,
        "weather" => WEATHER,
        "hotel" => HOTEL,
        "planner" => PLANNER,
        "attraction-query" => ATTRACTION_QUERY,
        "weather-query" => WEATHER_QUERY,
        "hotel-query" => HOTEL_QUERY,
        "planner-query" => PLANNER_QUERY,
        "translate" => TRANSLATE,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(prompt)
}

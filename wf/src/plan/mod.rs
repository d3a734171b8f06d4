//! Trip plan model and structured-output extraction
//!
//! The planner stage answers in free text that is supposed to contain one
//! JSON object. [`extract_trip_plan`] locates that object, parses it, and
//! validates it field by field into a [`TripPlan`], normalizing the few
//! fields models routinely decorate (temperatures, wind intensity).

mod error;
mod extract;
mod schema;
mod types;

pub use error::ExtractError;
pub use extract::{extract_trip_plan, locate_json_object};
pub use schema::{coerce_temperature, coerce_wind_power, decode_trip_plan};
pub use types::{
    Attraction, Budget, DayPlan, Hotel, Location, Meal, SEARCH_KEYWORD_COUNT, TripPlan, TripRequest,
    UNKNOWN_WIND_POWER, WeatherInfo,
};

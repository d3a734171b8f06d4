//! Pipeline stages

use std::fmt;

/// One LLM call in the planning pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Attraction discovery
    Attractions,
    /// Weather lookup for the travel dates
    Weather,
    /// Lodging discovery
    Hotels,
    /// Itinerary synthesis from the three gathered outputs
    Itinerary,
}

impl Stage {
    /// Every stage, in pipeline order
    pub const ALL: [Stage; 4] = [Stage::Attractions, Stage::Weather, Stage::Hotels, Stage::Itinerary];

    /// Independent stages that run concurrently before synthesis
    pub const GATHER: [Stage; 3] = [Stage::Attractions, Stage::Weather, Stage::Hotels];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Attractions => "attractions",
            Stage::Weather => "weather",
            Stage::Hotels => "hotels",
            Stage::Itinerary => "itinerary",
        }
    }

    /// Position in the progress stream (1-based)
    pub fn step(&self) -> u8 {
        match self {
            Stage::Attractions => 1,
            Stage::Weather => 2,
            Stage::Hotels => 3,
            Stage::Itinerary => 4,
        }
    }

    /// Percent complete once this stage has finished
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Attractions => 15,
            Stage::Weather => 35,
            Stage::Hotels => 55,
            Stage::Itinerary => 75,
        }
    }

    /// Human-readable status label for progress events
    pub fn status(&self) -> &'static str {
        match self {
            Stage::Attractions => "🔍 Attractions found",
            Stage::Weather => "🌤️ Weather checked",
            Stage::Hotels => "🏨 Hotels found",
            Stage::Itinerary => "📋 Itinerary generated",
        }
    }

    /// Name of the system prompt template
    pub fn system_template(&self) -> &'static str {
        match self {
            Stage::Attractions => "attraction",
            Stage::Weather => "weather",
            Stage::Hotels => "hotel",
            Stage::Itinerary => "planner",
        }
    }

    /// Name of the user query template
    pub fn query_template(&self) -> &'static str {
        match self {
            Stage::Attractions => "attraction-query",
            Stage::Weather => "weather-query",
            Stage::Hotels => "hotel-query",
            Stage::Itinerary => "planner-query",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Trip request and structured trip plan types

use serde::{Deserialize, Serialize};

/// Number of search keywords a plan carries
pub const SEARCH_KEYWORD_COUNT: usize = 5;

/// Sentinel for a wind intensity the model did not report
pub const UNKNOWN_WIND_POWER: &str = "unknown";

/// A trip planning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Destination city
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    /// Number of days
    pub days: u32,
    pub preferences: String,
    pub budget: String,
    pub transportation: String,
    pub accommodation: String,
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub address: String,
    pub location: Option<Location>,
    /// Suggested visit length in minutes
    pub visit_duration: u32,
    pub description: String,
    pub category: Option<String>,
    /// 0.0 - 5.0
    pub rating: Option<f64>,
    pub image_urls: Vec<String>,
    pub ticket_price: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// breakfast, lunch, dinner or snack
    #[serde(rename = "type")]
    pub meal_type: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Location>,
    pub description: Option<String>,
    pub estimated_cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub address: String,
    pub location: Option<Location>,
    pub price_range: String,
    pub rating: String,
    /// Distance to the day's attractions, free text
    pub distance: String,
    #[serde(rename = "type")]
    pub hotel_type: String,
    /// Per night
    pub estimated_cost: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub total_attractions: u32,
    pub total_hotels: u32,
    pub total_meals: u32,
    pub total_transportation: u32,
    pub total: u32,
}

/// One day of the itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: String,
    /// Zero-based, equal to the position in `TripPlan::days`
    pub day_index: u32,
    pub description: String,
    pub transportation: String,
    pub accommodation: String,
    pub hotel: Option<Hotel>,
    pub attractions: Vec<Attraction>,
    pub meals: Vec<Meal>,
}

/// Weather forecast for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub date: String,
    pub day_weather: String,
    pub night_weather: String,
    /// Celsius
    pub day_temp: i32,
    /// Celsius
    pub night_temp: i32,
    pub wind_direction: String,
    pub wind_power: String,
}

/// The validated, structured result of the planning pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<DayPlan>,
    pub weather_info: Vec<WeatherInfo>,
    pub overall_suggestions: String,
    pub budget: Option<Budget>,
    pub search_keywords: Vec<String>,
}

impl TripPlan {
    /// Iterate over every attraction across all days
    pub fn attractions(&self) -> impl Iterator<Item = &Attraction> {
        self.days.iter().flat_map(|d| d.attractions.iter())
    }

    /// Attractions that arrived without any image URL
    pub fn attractions_missing_images(&self) -> usize {
        self.attractions().filter(|a| a.image_urls.is_empty()).count()
    }
}

//! Field-by-field decoding of a parsed plan against the TripPlan schema
//!
//! Decoding walks the JSON tree with the dotted path of the current node so a
//! violation always names the exact field (`days[1].attractions[0].ticket_price`).
//! Optional fields given as `null` take their default.

use serde_json::{Map, Value};
use tracing::debug;

use super::error::ExtractError;
use super::types::{
    Attraction, Budget, DayPlan, Hotel, Location, Meal, SEARCH_KEYWORD_COUNT, TripPlan, UNKNOWN_WIND_POWER,
    WeatherInfo,
};

type Result<T> = std::result::Result<T, ExtractError>;

const EXPECT_STRING: &str = "a string";
const EXPECT_UINT: &str = "a non-negative integer";
const EXPECT_OBJECT: &str = "an object";
const EXPECT_ARRAY: &str = "an array";

/// Decode a parsed JSON value into a validated `TripPlan`
pub fn decode_trip_plan(value: &Value) -> Result<TripPlan> {
    debug!("decode_trip_plan: called");
    let root = Node::root(value)?;

    let days = root
        .array("days")?
        .into_iter()
        .enumerate()
        .map(|(i, (path, v))| decode_day(&Node::object(v, path)?, i))
        .collect::<Result<Vec<_>>>()?;

    let weather_info = root
        .array("weather_info")?
        .into_iter()
        .map(|(path, v)| decode_weather(&Node::object(v, path)?))
        .collect::<Result<Vec<_>>>()?;

    let budget = root.opt_object("budget")?.map(|b| decode_budget(&b)).transpose()?;

    let mut search_keywords = root.string_list("search_keywords")?;
    if search_keywords.len() > SEARCH_KEYWORD_COUNT {
        debug!(count = search_keywords.len(), "decode_trip_plan: truncating search keywords");
        search_keywords.truncate(SEARCH_KEYWORD_COUNT);
    }

    Ok(TripPlan {
        city: root.required_str("city")?,
        start_date: root.required_str("start_date")?,
        end_date: root.required_str("end_date")?,
        days,
        weather_info,
        overall_suggestions: root.str_or("overall_suggestions", "Have a pleasant trip!")?,
        budget,
        search_keywords,
    })
}

fn decode_day(node: &Node<'_>, position: usize) -> Result<DayPlan> {
    let day_index = node.required_uint("day_index")?;
    if day_index as usize != position {
        return Err(ExtractError::violation(
            node.child("day_index"),
            format!("{} (zero-based, contiguous day index)", position),
        ));
    }

    let attractions = node
        .array("attractions")?
        .into_iter()
        .map(|(path, v)| decode_attraction(&Node::object(v, path)?))
        .collect::<Result<Vec<_>>>()?;

    let meals = node
        .array("meals")?
        .into_iter()
        .map(|(path, v)| decode_meal(&Node::object(v, path)?))
        .collect::<Result<Vec<_>>>()?;

    Ok(DayPlan {
        date: node.required_str("date")?,
        day_index,
        description: node.str_or("description", "Day itinerary")?,
        transportation: node.str_or("transportation", "Taxi or public transport")?,
        accommodation: node.str_or("accommodation", "Hotel stay")?,
        hotel: node.opt_object("hotel")?.map(|h| decode_hotel(&h)).transpose()?,
        attractions,
        meals,
    })
}

fn decode_attraction(node: &Node<'_>) -> Result<Attraction> {
    Ok(Attraction {
        name: node.required_str("name")?,
        address: node.str_or("address", "Unknown address")?,
        location: node.location("location")?,
        visit_duration: node.uint_or("visit_duration", 120)?,
        description: node.str_or("description", "No description")?,
        category: Some(node.str_or("category", "Attraction")?),
        rating: node.opt_f64_in("rating", 0.0, 5.0)?,
        image_urls: node.string_list("image_urls")?,
        ticket_price: node.uint_or("ticket_price", 0)?,
    })
}

fn decode_meal(node: &Node<'_>) -> Result<Meal> {
    Ok(Meal {
        meal_type: node.required_str("type")?,
        name: node.required_str("name")?,
        address: node.opt_str("address")?,
        location: node.location("location")?,
        description: node.opt_str("description")?,
        estimated_cost: node.uint_or("estimated_cost", 0)?,
    })
}

fn decode_hotel(node: &Node<'_>) -> Result<Hotel> {
    Ok(Hotel {
        name: node.required_str("name")?,
        address: node.str_or("address", "")?,
        location: node.location("location")?,
        price_range: node.scalar_text_or("price_range", "")?,
        rating: node.scalar_text_or("rating", "")?,
        distance: node.scalar_text_or("distance", "")?,
        hotel_type: node.str_or("type", "")?,
        estimated_cost: node.uint_or("estimated_cost", 0)?,
    })
}

fn decode_weather(node: &Node<'_>) -> Result<WeatherInfo> {
    Ok(WeatherInfo {
        date: node.required_str("date")?,
        day_weather: node.required_str("day_weather")?,
        night_weather: node.required_str("night_weather")?,
        day_temp: node.temperature("day_temp")?,
        night_temp: node.temperature("night_temp")?,
        wind_direction: node.required_str("wind_direction")?,
        wind_power: coerce_wind_power(node.get("wind_power")),
    })
}

fn decode_budget(node: &Node<'_>) -> Result<Budget> {
    Ok(Budget {
        total_attractions: node.uint_or("total_attractions", 0)?,
        total_hotels: node.uint_or("total_hotels", 0)?,
        total_meals: node.uint_or("total_meals", 0)?,
        total_transportation: node.uint_or("total_transportation", 0)?,
        total: node.uint_or("total", 0)?,
    })
}

/// Normalize a temperature value to whole degrees
///
/// Accepts a number or a string decorated with `°C`, `℃` or `°`. A string
/// whose remainder is not numeric becomes 0. Returns `None` for non-scalar
/// input.
pub fn coerce_temperature(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n.as_f64().and_then(round_to_i32),
        },
        Value::String(s) => {
            let stripped = s.replace("°C", "").replace('℃', "").replace('°', "");
            let stripped = stripped.trim();
            match stripped.parse::<f64>() {
                // Numeric but outside i32 is a violation, not a zero
                Ok(f) if f.is_finite() => round_to_i32(f),
                _ => Some(0),
            }
        }
        _ => None,
    }
}

fn round_to_i32(f: f64) -> Option<i32> {
    let rounded = f.round();
    (rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX)).then_some(rounded as i32)
}

/// Normalize a wind intensity to text; absent or null becomes the "unknown" sentinel
pub fn coerce_wind_power(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_WIND_POWER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Integer coercion: integral numbers and numeric strings
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// A JSON object plus the dotted path that reached it
struct Node<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Node<'a> {
    fn root(value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: String::new(),
            }),
            _ => Err(ExtractError::violation("$", EXPECT_OBJECT)),
        }
    }

    fn object(value: &'a Value, path: String) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            _ => Err(ExtractError::violation(path, EXPECT_OBJECT)),
        }
    }

    fn child(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// The value at `key`, treating `null` as absent
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required_str(&self, key: &str) -> Result<String> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ExtractError::violation(self.child(key), EXPECT_STRING)),
        }
    }

    fn opt_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ExtractError::violation(self.child(key), EXPECT_STRING)),
        }
    }

    fn str_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.opt_str(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Free-text field that tolerates a bare number (e.g. a hotel rating of 4.5)
    fn scalar_text_or(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(_) => Err(ExtractError::violation(self.child(key), EXPECT_STRING)),
        }
    }

    fn required_uint(&self, key: &str) -> Result<u32> {
        match self.get(key) {
            Some(v) => self.to_uint(key, v),
            None => Err(ExtractError::violation(self.child(key), EXPECT_UINT)),
        }
    }

    fn uint_or(&self, key: &str, default: u32) -> Result<u32> {
        match self.get(key) {
            Some(v) => self.to_uint(key, v),
            None => Ok(default),
        }
    }

    fn to_uint(&self, key: &str, value: &Value) -> Result<u32> {
        coerce_int(value)
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| ExtractError::violation(self.child(key), EXPECT_UINT))
    }

    fn opt_f64_in(&self, key: &str, min: f64, max: f64) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => self.f64_in_range(key, v, min, max).map(Some),
        }
    }

    fn f64_in_range(&self, key: &str, value: &Value, min: f64, max: f64) -> Result<f64> {
        let expected = || format!("a number between {} and {}", min, max);
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(f) if f.is_finite() && (min..=max).contains(&f) => Ok(f),
            _ => Err(ExtractError::violation(self.child(key), expected())),
        }
    }

    fn temperature(&self, key: &str) -> Result<i32> {
        self.get(key)
            .and_then(coerce_temperature)
            .ok_or_else(|| ExtractError::violation(self.child(key), "a temperature (integer or \"25°C\")"))
    }

    fn location(&self, key: &str) -> Result<Option<Location>> {
        let Some(node) = self.opt_object(key)? else {
            return Ok(None);
        };
        let longitude = match node.get("longitude") {
            Some(v) => node.f64_in_range("longitude", v, -180.0, 180.0)?,
            None => return Err(ExtractError::violation(node.child("longitude"), "a number between -180 and 180")),
        };
        let latitude = match node.get("latitude") {
            Some(v) => node.f64_in_range("latitude", v, -90.0, 90.0)?,
            None => return Err(ExtractError::violation(node.child("latitude"), "a number between -90 and 90")),
        };
        Ok(Some(Location { longitude, latitude }))
    }

    fn opt_object(&self, key: &str) -> Result<Option<Node<'a>>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => Node::object(v, self.child(key)).map(Some),
        }
    }

    /// Elements of an array field with their paths; absent means empty
    fn array(&self, key: &str) -> Result<Vec<(String, &'a Value)>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("{}[{}]", self.child(key), i), v))
                .collect()),
            Some(_) => Err(ExtractError::violation(self.child(key), EXPECT_ARRAY)),
        }
    }

    fn string_list(&self, key: &str) -> Result<Vec<String>> {
        self.array(key)?
            .into_iter()
            .map(|(path, v)| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(ExtractError::violation(path, EXPECT_STRING)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_day(index: u32) -> Value {
        json!({"date": format!("2025-06-0{}", index + 1), "day_index": index})
    }

    fn minimal_plan() -> Value {
        json!({
            "city": "Beijing",
            "start_date": "2025-06-01",
            "end_date": "2025-06-02",
            "days": [minimal_day(0), minimal_day(1)],
        })
    }

    fn violation_field(err: ExtractError) -> String {
        match err {
            ExtractError::SchemaViolation { field, .. } => field,
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_plan_gets_defaults() {
        let plan = decode_trip_plan(&minimal_plan()).unwrap();
        assert_eq!(plan.city, "Beijing");
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[1].day_index, 1);
        assert_eq!(plan.days[0].description, "Day itinerary");
        assert_eq!(plan.overall_suggestions, "Have a pleasant trip!");
        assert!(plan.budget.is_none());
        assert!(plan.weather_info.is_empty());
    }

    #[test]
    fn test_missing_required_root_field() {
        let mut value = minimal_plan();
        value.as_object_mut().unwrap().remove("city");
        assert_eq!(violation_field(decode_trip_plan(&value).unwrap_err()), "city");
    }

    #[test]
    fn test_non_object_root() {
        let err = decode_trip_plan(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(violation_field(err), "$");
    }

    #[test]
    fn test_day_index_must_match_position() {
        let mut value = minimal_plan();
        value["days"] = json!([minimal_day(0), minimal_day(2)]);
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "days[1].day_index");
    }

    #[test]
    fn test_day_index_starting_at_one_is_rejected() {
        let mut value = minimal_plan();
        value["days"] = json!([minimal_day(1)]);
        assert_eq!(violation_field(decode_trip_plan(&value).unwrap_err()), "days[0].day_index");
    }

    #[test]
    fn test_negative_ticket_price_is_rejected() {
        let mut value = minimal_plan();
        value["days"][0]["attractions"] = json!([{"name": "Palace Museum", "ticket_price": -5}]);
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "days[0].attractions[0].ticket_price");
    }

    #[test]
    fn test_attraction_defaults_and_coercions() {
        let mut value = minimal_plan();
        value["days"][0]["attractions"] = json!([{
            "name": "Palace Museum",
            "visit_duration": "180",
            "ticket_price": 60.0,
            "location": {"longitude": 116.397, "latitude": 39.918},
            "rating": null
        }]);
        let plan = decode_trip_plan(&value).unwrap();
        let attraction = &plan.days[0].attractions[0];
        assert_eq!(attraction.visit_duration, 180);
        assert_eq!(attraction.ticket_price, 60);
        assert_eq!(attraction.address, "Unknown address");
        assert_eq!(attraction.category.as_deref(), Some("Attraction"));
        assert!(attraction.rating.is_none());
        assert!(attraction.image_urls.is_empty());
        assert_eq!(attraction.location.unwrap().latitude, 39.918);
    }

    #[test]
    fn test_location_out_of_range() {
        let mut value = minimal_plan();
        value["days"][1]["hotel"] = json!({"name": "Grand", "location": {"longitude": 200.0, "latitude": 10.0}});
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "days[1].hotel.location.longitude");
    }

    #[test]
    fn test_oversized_temperature_is_rejected() {
        let mut value = minimal_plan();
        value["weather_info"] = json!([{
            "date": "2025-06-01", "day_weather": "Sunny", "night_weather": "Clear",
            "day_temp": 4_294_967_321_i64, "night_temp": "18", "wind_direction": "North"
        }]);
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "weather_info[0].day_temp");
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut value = minimal_plan();
        value["days"][0]["attractions"] = json!([{"name": "Tower", "rating": 7.5}]);
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "days[0].attractions[0].rating");
    }

    #[test]
    fn test_wrong_type_for_meals() {
        let mut value = minimal_plan();
        value["days"][0]["meals"] = json!("breakfast, lunch, dinner");
        let err = decode_trip_plan(&value).unwrap_err();
        assert_eq!(violation_field(err), "days[0].meals");
    }

    #[test]
    fn test_meal_requires_type() {
        let mut value = minimal_plan();
        value["days"][0]["meals"] = json!([{"name": "Noodle House"}]);
        assert_eq!(violation_field(decode_trip_plan(&value).unwrap_err()), "days[0].meals[0].type");
    }

    #[test]
    fn test_hotel_rating_number_becomes_text() {
        let mut value = minimal_plan();
        value["days"][0]["hotel"] = json!({"name": "Grand", "rating": 4.5, "type": "business"});
        let plan = decode_trip_plan(&value).unwrap();
        let hotel = plan.days[0].hotel.as_ref().unwrap();
        assert_eq!(hotel.rating, "4.5");
        assert_eq!(hotel.hotel_type, "business");
    }

    #[test]
    fn test_weather_normalization() {
        let mut value = minimal_plan();
        value["weather_info"] = json!([{
            "date": "2025-06-01",
            "day_weather": "Sunny",
            "night_weather": "Cloudy",
            "day_temp": "25°C",
            "night_temp": 15,
            "wind_direction": "North",
            "wind_power": 3
        }, {
            "date": "2025-06-02",
            "day_weather": "Rain",
            "night_weather": "Rain",
            "day_temp": "hot",
            "night_temp": "18℃",
            "wind_direction": "East"
        }]);
        let plan = decode_trip_plan(&value).unwrap();
        assert_eq!(plan.weather_info[0].day_temp, 25);
        assert_eq!(plan.weather_info[0].night_temp, 15);
        assert_eq!(plan.weather_info[0].wind_power, "3");
        assert_eq!(plan.weather_info[1].day_temp, 0);
        assert_eq!(plan.weather_info[1].night_temp, 18);
        assert_eq!(plan.weather_info[1].wind_power, UNKNOWN_WIND_POWER);
    }

    #[test]
    fn test_weather_requires_temperature() {
        let mut value = minimal_plan();
        value["weather_info"] = json!([{
            "date": "2025-06-01",
            "day_weather": "Sunny",
            "night_weather": "Cloudy",
            "night_temp": 15,
            "wind_direction": "North"
        }]);
        assert_eq!(violation_field(decode_trip_plan(&value).unwrap_err()), "weather_info[0].day_temp");
    }

    #[test]
    fn test_search_keywords_truncated() {
        let mut value = minimal_plan();
        value["search_keywords"] = json!(["a", "b", "c", "d", "e", "f", "g"]);
        let plan = decode_trip_plan(&value).unwrap();
        assert_eq!(plan.search_keywords, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_search_keywords_must_be_strings() {
        let mut value = minimal_plan();
        value["search_keywords"] = json!(["a", 2]);
        assert_eq!(violation_field(decode_trip_plan(&value).unwrap_err()), "search_keywords[1]");
    }

    #[test]
    fn test_budget_decoded() {
        let mut value = minimal_plan();
        value["budget"] = json!({"total_attractions": 200, "total_hotels": 1000, "total": 1800});
        let plan = decode_trip_plan(&value).unwrap();
        let budget = plan.budget.unwrap();
        assert_eq!(budget.total_hotels, 1000);
        assert_eq!(budget.total_meals, 0);
        assert_eq!(budget.total, 1800);
    }

    #[test]
    fn test_coerce_temperature_variants() {
        assert_eq!(coerce_temperature(&json!("25°C")), Some(25));
        assert_eq!(coerce_temperature(&json!("25℃")), Some(25));
        assert_eq!(coerce_temperature(&json!("25°")), Some(25));
        assert_eq!(coerce_temperature(&json!("25")), Some(25));
        assert_eq!(coerce_temperature(&json!(25)), Some(25));
        assert_eq!(coerce_temperature(&json!(" -3 °C ")), Some(-3));
        assert_eq!(coerce_temperature(&json!("warm")), Some(0));
        assert_eq!(coerce_temperature(&json!(true)), None);
        assert_eq!(coerce_temperature(&json!(4_294_967_321_i64)), None);
        assert_eq!(coerce_temperature(&json!("4294967321°C")), None);
        assert_eq!(coerce_temperature(&json!(1e12)), None);
        assert_eq!(coerce_temperature(&json!(24.6)), Some(25));
    }

    #[test]
    fn test_coerce_wind_power_variants() {
        assert_eq!(coerce_wind_power(Some(&json!("3-4 level"))), "3-4 level");
        assert_eq!(coerce_wind_power(Some(&json!(4))), "4");
        assert_eq!(coerce_wind_power(Some(&json!(2.5))), "2.5");
        assert_eq!(coerce_wind_power(Some(&json!(false))), "false");
        assert_eq!(coerce_wind_power(Some(&Value::Null)), UNKNOWN_WIND_POWER);
        assert_eq!(coerce_wind_power(None), UNKNOWN_WIND_POWER);
    }
}

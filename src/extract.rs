//! Strict extraction of a trip plan from model output
//!
//! Anything that does not decode into a [`TripPlan`] satisfying the plan
//! invariants for the originating request is a [`ParseError`]. The caller
//! treats that as a signal to fall back, never as a hard failure.

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{TripPlan, TripRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Not valid JSON, or a required key / field type is off
    #[error("Model output does not decode as a trip plan: {0}")]
    Decode(String),

    /// Decodes, but breaks a plan invariant
    #[error("Model output violates the plan shape: {0}")]
    Shape(String),
}

/// Parse raw batch output as a trip plan for `request`
pub fn extract_plan(raw: &str, request: &TripRequest) -> Result<TripPlan, ParseError> {
    let body = strip_code_fence(raw.trim());

    let plan: TripPlan = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Model output is not a trip plan");
        debug!(raw = %raw, "Rejected model output");
        ParseError::Decode(e.to_string())
    })?;

    check_shape(&plan, request).inspect_err(|e| {
        warn!(error = %e, "Model output rejected");
    })?;

    debug!(
        days = plan.itinerary.len(),
        places = plan.places.len(),
        packing_items = plan.packing_list.len(),
        "Model output accepted"
    );
    Ok(plan)
}

/// Models sometimes wrap JSON in a Markdown fence despite instructions
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Check the plan invariants that serde cannot express
pub fn check_shape(plan: &TripPlan, request: &TripRequest) -> Result<(), ParseError> {
    let expected_days = request.day_count();

    if plan.itinerary.len() != expected_days {
        return Err(ParseError::Shape(format!(
            "itinerary has {} days, expected {expected_days}",
            plan.itinerary.len()
        )));
    }
    if plan.weather.len() != expected_days {
        return Err(ParseError::Shape(format!(
            "weather has {} days, expected {expected_days}",
            plan.weather.len()
        )));
    }

    for (i, (day, forecast)) in plan.itinerary.iter().zip(&plan.weather).enumerate() {
        let expected = request.date_of_day(i);
        if day.date != expected {
            return Err(ParseError::Shape(format!(
                "itinerary day {i} is {}, expected {expected}",
                day.date
            )));
        }
        if forecast.date != expected {
            return Err(ParseError::Shape(format!(
                "weather day {i} is {}, expected {expected}",
                forecast.date
            )));
        }
        if !(0.0..=100.0).contains(&forecast.precipitation) {
            return Err(ParseError::Shape(format!(
                "precipitation {} on {expected} is outside 0-100",
                forecast.precipitation
            )));
        }
        if !(0.0..=100.0).contains(&forecast.humidity) {
            return Err(ParseError::Shape(format!(
                "humidity {} on {expected} is outside 0-100",
                forecast.humidity
            )));
        }
        if forecast.wind_speed < 0.0 {
            return Err(ParseError::Shape(format!(
                "wind speed {} on {expected} is negative",
                forecast.wind_speed
            )));
        }
    }

    if let Some(place) = plan
        .places
        .iter()
        .find(|p| p.rating.is_some_and(|r| !(1.0..=5.0).contains(&r)))
    {
        return Err(ParseError::Shape(format!(
            "rating of '{}' is outside 1-5",
            place.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripRequestDraft;
    use crate::validation::validate;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn request() -> TripRequest {
        validate(&TripRequestDraft {
            destination: Some("Lisbon".into()),
            start_date: Some("2024-09-10".into()),
            end_date: Some("2024-09-11".into()),
            interests: Some(vec!["culinary".into()]),
            travel_with: Some("friends".into()),
        })
        .unwrap()
    }

    fn day(date: &str) -> Value {
        json!({
            "date": date,
            "morning": [{"time": "8:00 AM - 9:00 AM", "title": "Breakfast", "description": "Pastries", "location": "Belém"}],
            "afternoon": [{"time": "1:00 PM - 2:00 PM", "title": "Lunch", "description": "Sardines"}],
            "evening": []
        })
    }

    fn forecast(date: &str) -> Value {
        json!({
            "date": date,
            "condition": "Sunny",
            "temperature": {"min": 18, "max": 27.5, "unit": "C"},
            "precipitation": 5,
            "humidity": 60,
            "windSpeed": 12
        })
    }

    fn valid_plan() -> Value {
        json!({
            "itinerary": [day("2024-09-10"), day("2024-09-11")],
            "places": [{"name": "Time Out Market", "description": "Food hall", "type": "Culinary", "rating": 4.5}],
            "weather": [forecast("2024-09-10"), forecast("2024-09-11")],
            "packingList": [{"name": "Sunscreen", "category": "Toiletries", "essential": true, "weatherDependent": true}]
        })
    }

    #[test]
    fn test_valid_plan_is_extracted() {
        let plan = extract_plan(&valid_plan().to_string(), &request()).unwrap();
        assert_eq!(plan.itinerary.len(), 2);
        assert_eq!(plan.weather[0].temperature.max, 27.5);
        assert_eq!(plan.places[0].kind, "Culinary");
        assert_eq!(plan.packing_list[0].weather_dependent, Some(true));
        assert!(plan.itinerary[0].afternoon[0].location.is_none());
    }

    #[test]
    fn test_code_fence_is_tolerated() {
        let raw = format!("```json\n{}\n```", valid_plan());
        assert!(extract_plan(&raw, &request()).is_ok());
    }

    #[rstest]
    #[case::not_json("Sure! Here is your itinerary.")]
    #[case::truncated(r#"{"itinerary": ["#)]
    #[case::array("[]")]
    fn test_undecodable_output(#[case] raw: &str) {
        assert!(matches!(
            extract_plan(raw, &request()),
            Err(ParseError::Decode(_))
        ));
    }

    #[rstest]
    #[case::itinerary("itinerary")]
    #[case::places("places")]
    #[case::weather("weather")]
    #[case::packing_list("packingList")]
    fn test_missing_collection(#[case] key: &str) {
        let mut plan = valid_plan();
        plan.as_object_mut().unwrap().remove(key);
        assert!(matches!(
            extract_plan(&plan.to_string(), &request()),
            Err(ParseError::Decode(_))
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        let mut plan = valid_plan();
        plan["packingList"][0]["essential"] = json!("yes");
        assert!(matches!(
            extract_plan(&plan.to_string(), &request()),
            Err(ParseError::Decode(_))
        ));
    }

    #[test]
    fn test_unknown_activity_tag_is_rejected() {
        let mut plan = valid_plan();
        plan["packingList"][0]["activityDependent"] = json!(["surfing"]);
        assert!(extract_plan(&plan.to_string(), &request()).is_err());
    }

    #[rstest]
    #[case::short_itinerary("/itinerary", json!([day("2024-09-10")]))]
    #[case::long_weather("/weather", json!([forecast("2024-09-10"), forecast("2024-09-11"), forecast("2024-09-12")]))]
    #[case::wrong_start("/itinerary", json!([day("2024-09-09"), day("2024-09-10")]))]
    #[case::not_increasing("/itinerary", json!([day("2024-09-11"), day("2024-09-10")]))]
    #[case::humidity("/weather/1/humidity", json!(140))]
    #[case::wind("/weather/0/windSpeed", json!(-3))]
    #[case::rating("/places/0/rating", json!(7.5))]
    fn test_shape_violations(#[case] pointer: &str, #[case] replacement: Value) {
        let mut plan = valid_plan();
        *plan.pointer_mut(pointer).unwrap() = replacement;
        assert!(matches!(
            extract_plan(&plan.to_string(), &request()),
            Err(ParseError::Shape(_))
        ));
    }
}

//! Prompt construction for itinerary generation
//!
//! Rendering is a pure function of the request: the same request always
//! yields the same payload, byte for byte.

use crate::gateway::{CompletionPayload, ResponseFormat};
use crate::models::{Interest, Message, TripRequest};

pub const PLANNER_SYSTEM_PROMPT: &str = "You are a travel planning assistant. Generate detailed travel itineraries in JSON format only. Do not include any explanatory text outside the JSON.";

pub const ITINERARY_TEMPERATURE: f32 = 0.7;
pub const ITINERARY_MAX_TOKENS: u32 = 4000;

const OUTPUT_SCHEMA: &str = r#"{
  "itinerary": [
    {
      "date": "YYYY-MM-DD",
      "morning": [
        {
          "time": "time range, e.g. 9:30 AM - 12:00 PM",
          "title": "activity name",
          "description": "detailed description",
          "location": "location name (optional)"
        }
      ],
      "afternoon": [same structure as morning],
      "evening": [same structure as morning]
    }
  ],
  "places": [
    {
      "name": "place name",
      "description": "detailed description",
      "type": "category (Historical, Nature, Cultural, Shopping, Sightseeing, Adventure, ...)",
      "rating": number between 1 and 5 (optional),
      "visitDuration": "estimated visit time (optional)",
      "address": "address (optional)"
    }
  ],
  "weather": [
    {
      "date": "YYYY-MM-DD",
      "condition": "weather condition",
      "temperature": {
        "min": number,
        "max": number,
        "unit": "C"
      },
      "precipitation": number (percentage 0-100),
      "humidity": number (percentage 0-100),
      "windSpeed": number (0 or more)
    }
  ],
  "packingList": [
    {
      "name": "item name",
      "category": "category name",
      "essential": boolean,
      "weatherDependent": boolean (optional),
      "activityDependent": [array of interest tags] (optional)
    }
  ]
}"#;

/// Render the batch generation payload for a validated request
#[must_use]
pub fn build_itinerary_payload(request: &TripRequest) -> CompletionPayload {
    CompletionPayload {
        messages: vec![
            Message::system(PLANNER_SYSTEM_PROMPT),
            Message::user(render_brief(request)),
        ],
        temperature: ITINERARY_TEMPERATURE,
        max_tokens: ITINERARY_MAX_TOKENS,
        response_format: Some(ResponseFormat::json_object()),
        stream: false,
    }
}

/// Natural-language brief followed by the literal output schema
#[must_use]
pub fn render_brief(request: &TripRequest) -> String {
    let day_count = request.day_count();
    let dates = request
        .dates()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let interest_tags = Interest::ALL.map(Interest::as_str).join(", ");

    format!(
        "Create a detailed travel itinerary for {destination} from {range}.\n\
         The trip is for {day_count} {days}.\n\
         Interests: {interests}.\n\
         Traveling with: {travel_with}.\n\
         \n\
         Please provide a complete travel plan in JSON format with the following structure:\n\
         {OUTPUT_SCHEMA}\n\
         \n\
         Requirements:\n\
         - \"itinerary\" and \"weather\" must each contain exactly {day_count} entries, one per date in this order: {dates}.\n\
         - All four top-level keys (itinerary, places, weather, packingList) are required.\n\
         - \"activityDependent\" may only contain these interest tags: {interest_tags}.\n\
         \n\
         Make sure to include activities that match the specified interests and are appropriate for the travel companions.\n\
         For the weather, provide realistic forecasts based on the destination and time of year.\n\
         For the packing list, include items that are appropriate for the activities, weather, and destination.",
        destination = request.destination(),
        range = request.date_range_label(),
        days = if day_count == 1 { "day" } else { "days" },
        interests = request.interests_label(),
        travel_with = request.travel_with(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripRequestDraft;
    use crate::validation::validate;

    fn paris() -> TripRequest {
        validate(&TripRequestDraft {
            destination: Some("Paris".into()),
            start_date: Some("2024-06-01".into()),
            end_date: Some("2024-06-03".into()),
            interests: Some(vec!["nightlife".into(), "historical".into()]),
            travel_with: Some("couple".into()),
        })
        .unwrap()
    }

    #[test]
    fn test_payload_is_deterministic() {
        let request = paris();
        assert_eq!(
            build_itinerary_payload(&request),
            build_itinerary_payload(&request)
        );
    }

    #[test]
    fn test_brief_states_the_request() {
        let brief = render_brief(&paris());
        assert!(brief.contains("itinerary for Paris from June 1, 2024 to June 3, 2024"));
        assert!(brief.contains("The trip is for 3 days."));
        assert!(brief.contains("Interests: historical, nightlife."));
        assert!(brief.contains("Traveling with: couple."));
        assert!(brief.contains("2024-06-01, 2024-06-02, 2024-06-03"));
    }

    #[test]
    fn test_brief_spells_out_the_schema() {
        let brief = render_brief(&paris());
        for key in [
            "\"itinerary\"",
            "\"packingList\"",
            "\"visitDuration\"",
            "\"windSpeed\"",
            "\"activityDependent\"",
            "\"unit\": \"C\"",
        ] {
            assert!(brief.contains(key), "schema is missing {key}");
        }
        assert!(brief.contains("adventure, sightseeing, historical"));
    }

    #[test]
    fn test_payload_shape() {
        let payload = build_itinerary_payload(&paris());
        assert_eq!(payload.messages.len(), 2);
        assert_eq!(payload.messages[0].content, PLANNER_SYSTEM_PROMPT);
        assert_eq!(payload.max_tokens, 4000);
        assert!(!payload.stream);
        assert_eq!(payload.response_format, Some(ResponseFormat::json_object()));
    }
}

//! Trip plan model and display helpers

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::request::Interest;

/// Complete structured plan for a trip
///
/// The same shape is produced by the model-backed path and by the offline
/// synthesizer; consumers cannot tell the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    /// One entry per trip day, ascending by date
    pub itinerary: Vec<DayPlan>,
    pub places: Vec<Place>,
    /// One entry per trip day, ascending by date
    pub weather: Vec<WeatherDay>,
    pub packing_list: Vec<PackingItem>,
}

impl TripPlan {
    /// Distinct packing categories in first-seen order
    #[must_use]
    pub fn packing_categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.packing_list {
            if !seen.contains(&item.category.as_str()) {
                seen.push(item.category.as_str());
            }
        }
        seen
    }

    /// Packing items in one category, catalog order preserved
    pub fn packing_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a PackingItem> + 'a {
        self.packing_list
            .iter()
            .filter(move |item| item.category == category)
    }
}

/// Activities of one trip day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub morning: Vec<Activity>,
    pub afternoon: Vec<Activity>,
    pub evening: Vec<Activity>,
}

impl DayPlan {
    /// All activities of the day in chronological order
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.morning
            .iter()
            .chain(self.afternoon.iter())
            .chain(self.evening.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Display range, e.g. "9:30 AM - 12:00 PM"
    pub time: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Point of interest at the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    pub description: String,
    /// Category tag such as "Historical" or "Nature"
    #[serde(rename = "type")]
    pub kind: String,
    /// Between 1.0 and 5.0 when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Forecast for one trip day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDay {
    pub date: NaiveDate,
    /// Free-text label, e.g. "Partly Cloudy"
    pub condition: String,
    pub temperature: Temperature,
    /// Chance of precipitation in percent (0-100)
    pub precipitation: f64,
    /// Relative humidity in percent (0-100)
    pub humidity: f64,
    /// Non-negative
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

/// Coarse sky classification of a free-text weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sky {
    Rain,
    Cloud,
    Sun,
    Unknown,
}

impl WeatherDay {
    /// Classify the condition label for icon selection
    #[must_use]
    pub fn sky(&self) -> Sky {
        let condition = self.condition.to_lowercase();
        if condition.contains("rain") || condition.contains("shower") {
            Sky::Rain
        } else if condition.contains("cloud") {
            Sky::Cloud
        } else if condition.contains("sun") || condition.contains("clear") {
            Sky::Sun
        } else {
            Sky::Unknown
        }
    }

    /// Format temperature range with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!(
            "{:.0}-{:.0}°{}",
            self.temperature.min, self.temperature.max, self.temperature.unit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingItem {
    pub name: String,
    pub category: String,
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_dependent: Option<bool>,
    /// Interests that make this item relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_dependent: Option<BTreeSet<Interest>>,
}

impl PackingItem {
    /// True when any of the item's activity tags was selected
    #[must_use]
    pub fn is_relevant_to(&self, interests: &BTreeSet<Interest>) -> bool {
        self.activity_dependent
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|tag| interests.contains(tag)))
    }
}

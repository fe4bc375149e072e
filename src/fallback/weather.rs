//! Randomized per-day forecast

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use rand::RngExt;

use crate::models::{Temperature, WeatherDay};

pub const CONDITIONS: [&str; 5] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain", "Clear"];

const MIN_TEMPERATURE: RangeInclusive<u32> = 15..=24;
const MAX_TEMPERATURE: RangeInclusive<u32> = 25..=34;
const PRECIPITATION: RangeInclusive<u32> = 0..=29;
const HUMIDITY: RangeInclusive<u32> = 50..=79;
const WIND_SPEED: RangeInclusive<u32> = 5..=24;

/// Draw one day of weather
///
/// Values are whole numbers. The draw order is fixed (condition, min, max,
/// precipitation, humidity, wind) so a seeded source replays identically.
pub fn forecast_day<R: RngExt + ?Sized>(date: NaiveDate, rng: &mut R) -> WeatherDay {
    let condition = CONDITIONS[rng.random_range(0..CONDITIONS.len())];
    let min = rng.random_range(MIN_TEMPERATURE);
    let max = rng.random_range(MAX_TEMPERATURE);

    WeatherDay {
        date,
        condition: condition.to_string(),
        temperature: Temperature {
            min: f64::from(min),
            max: f64::from(max),
            unit: "C".to_string(),
        },
        precipitation: f64::from(rng.random_range(PRECIPITATION)),
        humidity: f64::from(rng.random_range(HUMIDITY)),
        wind_speed: f64::from(rng.random_range(WIND_SPEED)),
    }
}

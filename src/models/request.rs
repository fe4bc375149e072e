//! Trip request model

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Interest tags a traveller can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Adventure,
    Sightseeing,
    Historical,
    Spiritual,
    Culinary,
    Shopping,
    Nature,
    Cultural,
    Relaxation,
    Nightlife,
}

impl Interest {
    pub const ALL: [Interest; 10] = [
        Interest::Adventure,
        Interest::Sightseeing,
        Interest::Historical,
        Interest::Spiritual,
        Interest::Culinary,
        Interest::Shopping,
        Interest::Nature,
        Interest::Cultural,
        Interest::Relaxation,
        Interest::Nightlife,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Interest::Adventure => "adventure",
            Interest::Sightseeing => "sightseeing",
            Interest::Historical => "historical",
            Interest::Spiritual => "spiritual",
            Interest::Culinary => "culinary",
            Interest::Shopping => "shopping",
            Interest::Nature => "nature",
            Interest::Cultural => "cultural",
            Interest::Relaxation => "relaxation",
            Interest::Nightlife => "nightlife",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Interest::ALL
            .into_iter()
            .find(|interest| interest.as_str() == wanted)
            .ok_or_else(|| format!("unknown interest '{s}'"))
    }
}

/// Who the traveller is going with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelWith {
    Solo,
    Couple,
    Family,
    Friends,
}

impl TravelWith {
    pub const ALL: [TravelWith; 4] = [
        TravelWith::Solo,
        TravelWith::Couple,
        TravelWith::Family,
        TravelWith::Friends,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelWith::Solo => "solo",
            TravelWith::Couple => "couple",
            TravelWith::Family => "family",
            TravelWith::Friends => "friends",
        }
    }
}

impl fmt::Display for TravelWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelWith {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TravelWith::ALL
            .into_iter()
            .find(|companion| companion.as_str() == wanted)
            .ok_or_else(|| format!("unknown companion type '{s}'"))
    }
}

/// Raw trip request as posted by a client, before validation
///
/// Every field is optional so that validation can report all problems at once
/// instead of failing on the first missing key during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequestDraft {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub interests: Option<Vec<String>>,
    pub travel_with: Option<String>,
}

/// Validated, immutable trip request
///
/// Only constructed through [`crate::validation::validate`], so
/// `start_date <= end_date` and a non-empty interest set always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    interests: BTreeSet<Interest>,
    travel_with: TravelWith,
}

impl TripRequest {
    pub(crate) fn new_unchecked(
        destination: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interests: BTreeSet<Interest>,
        travel_with: TravelWith,
    ) -> Self {
        Self {
            destination,
            start_date,
            end_date,
            interests,
            travel_with,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    #[must_use]
    pub fn interests(&self) -> &BTreeSet<Interest> {
        &self.interests
    }

    #[must_use]
    pub fn travel_with(&self) -> TravelWith {
        self.travel_with
    }

    #[must_use]
    pub fn has_interest(&self, interest: Interest) -> bool {
        self.interests.contains(&interest)
    }

    /// Number of calendar days covered, both endpoints included
    #[must_use]
    pub fn day_count(&self) -> usize {
        // start <= end is guaranteed by construction
        (self.end_date - self.start_date).num_days() as usize + 1
    }

    /// Calendar date of the `index`-th day of the trip
    #[must_use]
    pub fn date_of_day(&self, index: usize) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(index as u64))
            .unwrap_or(self.end_date)
    }

    /// Iterator over every trip date in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.day_count()).map(|i| self.date_of_day(i))
    }

    /// Human-readable date range, e.g. "June 1, 2024 to June 3, 2024"
    #[must_use]
    pub fn date_range_label(&self) -> String {
        format!(
            "{} to {}",
            self.start_date.format("%B %-d, %Y"),
            self.end_date.format("%B %-d, %Y")
        )
    }

    /// Interests joined for display, in stable tag order
    #[must_use]
    pub fn interests_label(&self) -> String {
        self.interests
            .iter()
            .map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(start: &str, end: &str) -> TripRequest {
        TripRequest::new_unchecked(
            "Paris".into(),
            date(start),
            date(end),
            BTreeSet::from([Interest::Historical, Interest::Culinary]),
            TravelWith::Solo,
        )
    }

    #[rstest]
    #[case("2024-06-01", "2024-06-01", 1)]
    #[case("2024-06-01", "2024-06-03", 3)]
    #[case("2024-02-27", "2024-03-01", 4)]
    #[case("2023-12-30", "2024-01-02", 4)]
    fn test_day_count_includes_both_ends(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: usize,
    ) {
        assert_eq!(request(start, end).day_count(), expected);
    }

    #[test]
    fn test_dates_are_consecutive() {
        let req = request("2024-02-28", "2024-03-01");
        let dates: Vec<_> = req.dates().collect();
        assert_eq!(
            dates,
            vec![date("2024-02-28"), date("2024-02-29"), date("2024-03-01")]
        );
    }

    #[test]
    fn test_labels() {
        let req = request("2024-06-01", "2024-06-03");
        assert_eq!(req.date_range_label(), "June 1, 2024 to June 3, 2024");
        assert_eq!(req.interests_label(), "historical, culinary");
    }

    #[rstest]
    #[case("adventure", Interest::Adventure)]
    #[case("Nightlife", Interest::Nightlife)]
    #[case(" nature ", Interest::Nature)]
    fn test_interest_parsing(#[case] raw: &str, #[case] expected: Interest) {
        assert_eq!(raw.parse::<Interest>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert!("skiing".parse::<Interest>().is_err());
        assert!("pets".parse::<TravelWith>().is_err());
        assert_eq!("Family".parse::<TravelWith>().unwrap(), TravelWith::Family);
    }

    #[test]
    fn test_draft_uses_camel_case() {
        let draft: TripRequestDraft = serde_json::from_str(
            r#"{"destination":"Rome","startDate":"2024-05-01","travelWith":"couple"}"#,
        )
        .unwrap();
        assert_eq!(draft.destination.as_deref(), Some("Rome"));
        assert_eq!(draft.start_date.as_deref(), Some("2024-05-01"));
        assert!(draft.end_date.is_none());
        assert!(draft.interests.is_none());
        assert_eq!(draft.travel_with.as_deref(), Some("couple"));
    }
}

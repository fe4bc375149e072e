//! Trip request validation
//!
//! Turns a raw [`TripRequestDraft`] into an immutable [`TripRequest`], or
//! reports every violated field at once.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::error::{FieldViolation, RequestField, ValidationError};
use crate::models::{Interest, TravelWith, TripRequest, TripRequestDraft};

/// Longest trip that can be planned, both endpoints included
pub const MAX_TRIP_DAYS: i64 = 30;

/// Validate a raw trip request
pub fn validate(draft: &TripRequestDraft) -> Result<TripRequest, ValidationError> {
    let mut violations = Vec::new();
    let mut reject = |field: RequestField, reason: String| {
        violations.push(FieldViolation { field, reason });
    };

    let destination = match draft.destination.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => Some(d.to_string()),
        Some(_) => {
            reject(RequestField::Destination, "must not be empty".into());
            None
        }
        None => {
            reject(RequestField::Destination, "is required".into());
            None
        }
    };

    let start_date = check_date(draft.start_date.as_deref(), RequestField::StartDate, &mut reject);
    let end_date = check_date(draft.end_date.as_deref(), RequestField::EndDate, &mut reject);

    if let (Some(start), Some(end)) = (start_date, end_date) {
        let days = (end - start).num_days() + 1;
        if start > end {
            reject(
                RequestField::EndDate,
                format!("must not be before startDate ({start})"),
            );
        } else if days > MAX_TRIP_DAYS {
            reject(
                RequestField::EndDate,
                format!("trip spans {days} days, at most {MAX_TRIP_DAYS} can be planned"),
            );
        }
    }

    let interests = match draft.interests.as_deref() {
        None => {
            reject(RequestField::Interests, "is required".into());
            None
        }
        Some([]) => {
            reject(RequestField::Interests, "select at least one interest".into());
            None
        }
        Some(tags) => {
            let parsed: Result<BTreeSet<Interest>, String> =
                tags.iter().map(|tag| tag.parse::<Interest>()).collect();
            match parsed {
                Ok(set) => Some(set),
                Err(reason) => {
                    reject(RequestField::Interests, reason);
                    None
                }
            }
        }
    };

    let travel_with = match draft.travel_with.as_deref() {
        None => {
            reject(RequestField::TravelWith, "is required".into());
            None
        }
        Some(raw) if raw.trim().is_empty() => {
            reject(RequestField::TravelWith, "is required".into());
            None
        }
        Some(raw) => match raw.parse::<TravelWith>() {
            Ok(companion) => Some(companion),
            Err(reason) => {
                reject(RequestField::TravelWith, reason);
                None
            }
        },
    };

    match (destination, start_date, end_date, interests, travel_with) {
        (Some(destination), Some(start), Some(end), Some(interests), Some(travel_with))
            if violations.is_empty() =>
        {
            let request =
                TripRequest::new_unchecked(destination, start, end, interests, travel_with);
            debug!(
                destination = request.destination(),
                days = request.day_count(),
                "Trip request validated"
            );
            Ok(request)
        }
        _ => {
            debug!(violations = violations.len(), "Trip request rejected");
            Err(ValidationError { violations })
        }
    }
}

fn check_date(
    raw: Option<&str>,
    field: RequestField,
    reject: &mut impl FnMut(RequestField, String),
) -> Option<NaiveDate> {
    match raw.map(str::trim) {
        None | Some("") => {
            reject(field, "is required".into());
            None
        }
        Some(value) => match parse_date(value) {
            Some(date) => Some(date),
            None => {
                reject(
                    field,
                    format!("'{value}' is not a YYYY-MM-DD date or RFC 3339 timestamp"),
                );
                None
            }
        },
    }
}

/// Accepts plain calendar dates and the ISO timestamps browsers send
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc().date())
        })
}

//! Error types and handling for the travel planner

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for the travel planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors, raised at startup
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Caller-supplied trip request is incomplete or invalid
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { message } => format!(
                "{message}\nCheck the configuration file (see --config) and the environment."
            ),
            PlannerError::Validation(err) => {
                let mut message = String::from("The trip request is not valid:");
                for violation in &err.violations {
                    message.push_str(&format!("\n  {}: {}", violation.field, violation.reason));
                }
                message
            }
        }
    }
}

/// Trip request field names as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestField {
    #[serde(rename = "destination")]
    Destination,
    #[serde(rename = "startDate")]
    StartDate,
    #[serde(rename = "endDate")]
    EndDate,
    #[serde(rename = "interests")]
    Interests,
    #[serde(rename = "travelWith")]
    TravelWith,
}

impl RequestField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestField::Destination => "destination",
            RequestField::StartDate => "startDate",
            RequestField::EndDate => "endDate",
            RequestField::Interests => "interests",
            RequestField::TravelWith => "travelWith",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated field of a trip request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: RequestField,
    pub reason: String,
}

/// Every problem found in a trip request, in field order
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Invalid trip request: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Names of the offending fields, in the order they were checked
    #[must_use]
    pub fn fields(&self) -> Vec<RequestField> {
        self.violations.iter().map(|v| v.field).collect()
    }

    #[must_use]
    pub fn contains(&self, field: RequestField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field, v.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

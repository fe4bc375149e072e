//! Data models for the travel planner
//!
//! This module contains the core domain models organized by concern:
//! - Request: the validated trip request and its raw wire form
//! - Plan: the structured trip plan returned to callers
//! - Chat: conversation messages exchanged with the assistant

pub mod chat;
pub mod plan;
pub mod request;

// Re-export all public types for convenient access
pub use chat::{Message, Role};
pub use plan::{
    Activity, DayPlan, PackingItem, Place, Sky, Temperature, TripPlan, WeatherDay,
};
pub use request::{Interest, TravelWith, TripRequest, TripRequestDraft};

//! Travel planner - AI itinerary generation with an offline fallback
//!
//! This library validates trip requests, asks a hosted language model for a
//! structured day-by-day plan, and synthesizes a complete plan locally
//! whenever the model is unreachable or answers with something unusable. It
//! also relays a streaming travel-assistant chat.

pub mod api;
pub mod assembler;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod gateway;
pub mod models;
pub mod prompt;
pub mod telemetry;
pub mod validation;
pub mod web;

// Re-export core types for public API
pub use assembler::{FallbackReason, ItineraryAssembler};
pub use chat::{ChatRelay, ChatSession, TurnOutcome};
pub use config::PlannerConfig;
pub use error::{PlannerError, RequestField, ValidationError};
pub use gateway::{GatewayError, HttpModelGateway, ModelGateway};
pub use models::{TripPlan, TripRequest, TripRequestDraft};
pub use validation::validate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

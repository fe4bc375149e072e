//! Itinerary generation pipeline
//!
//! validate -> prompt -> gateway -> extract, with the offline synthesizer
//! standing in whenever the model path fails. Generation over a validated
//! request always yields a plan; callers never learn which path produced it
//! except through logs and metrics.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::metrics::Counter;
use opentelemetry::{KeyValue, global};
use tracing::{info, instrument, warn};

use crate::error::ValidationError;
use crate::extract::{ParseError, extract_plan};
use crate::fallback;
use crate::gateway::{GatewayError, ModelGateway};
use crate::models::{TripPlan, TripRequest, TripRequestDraft};
use crate::prompt::build_itinerary_payload;
use crate::validation::validate;

/// Why the model path was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Transport,
    Upstream,
    Parse,
}

impl FallbackReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::Transport => "transport",
            FallbackReason::Upstream => "upstream",
            FallbackReason::Parse => "parse",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&GatewayError> for FallbackReason {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Upstream { .. } => FallbackReason::Upstream,
            GatewayError::Transport(_) => FallbackReason::Transport,
            GatewayError::MalformedEnvelope(_) => FallbackReason::Parse,
        }
    }
}

impl From<&ParseError> for FallbackReason {
    fn from(_: &ParseError) -> Self {
        FallbackReason::Parse
    }
}

struct Metrics {
    generated: Counter<u64>,
    fallbacks: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter(env!("CARGO_PKG_NAME"));
        Self {
            generated: meter
                .u64_counter("itinerary.generated")
                .with_description("Trip plans returned, by source")
                .build(),
            fallbacks: meter
                .u64_counter("itinerary.fallbacks")
                .with_description("Model attempts replaced by the offline synthesizer")
                .build(),
        }
    }
}

pub struct ItineraryAssembler {
    gateway: Arc<dyn ModelGateway>,
    weather_seed: Option<u64>,
    model_budget: Option<Duration>,
    metrics: Metrics,
}

impl ItineraryAssembler {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            weather_seed: None,
            model_budget: None,
            metrics: Metrics::new(),
        }
    }

    /// Fix the synthesizer's weather sequence
    #[must_use]
    pub fn with_weather_seed(mut self, seed: u64) -> Self {
        self.weather_seed = Some(seed);
        self
    }

    /// Give up on the model after `budget`, retries included
    #[must_use]
    pub fn with_model_budget(mut self, budget: Duration) -> Self {
        self.model_budget = Some(budget);
        self
    }

    /// Validate a raw request, then generate
    ///
    /// Only validation can fail; nothing is sent upstream for an invalid
    /// request.
    pub async fn generate_raw(
        &self,
        draft: &TripRequestDraft,
    ) -> Result<TripPlan, ValidationError> {
        let request = validate(draft)?;
        Ok(self.generate(&request).await)
    }

    /// Generate a plan for a validated request
    #[instrument(
        skip(self, request),
        fields(destination = request.destination(), days = request.day_count())
    )]
    pub async fn generate(&self, request: &TripRequest) -> TripPlan {
        let started = Instant::now();

        let attempt = self.ask_model(request);
        let outcome = match self.model_budget {
            Some(budget) => tokio::time::timeout(budget, attempt)
                .await
                .unwrap_or_else(|_| {
                    warn!(
                        reason = %FallbackReason::Transport,
                        "Model gave no answer within {:.3}s, using offline plan",
                        budget.as_secs_f64()
                    );
                    Err(FallbackReason::Transport)
                }),
            None => attempt.await,
        };

        match outcome {
            Ok(plan) => {
                info!(
                    source = "model",
                    "Generated itinerary in {:.3}s",
                    started.elapsed().as_secs_f64()
                );
                self.metrics
                    .generated
                    .add(1, &[KeyValue::new("source", "model")]);
                plan
            }
            Err(reason) => {
                self.metrics
                    .fallbacks
                    .add(1, &[KeyValue::new("reason", reason.as_str())]);
                let plan = self.synthesize(request);
                info!(
                    source = "fallback",
                    "Generated itinerary in {:.3}s",
                    started.elapsed().as_secs_f64()
                );
                self.metrics
                    .generated
                    .add(1, &[KeyValue::new("source", "fallback")]);
                plan
            }
        }
    }

    async fn ask_model(&self, request: &TripRequest) -> Result<TripPlan, FallbackReason> {
        let payload = build_itinerary_payload(request);

        let raw = self.gateway.complete(payload).await.map_err(|e| {
            let reason = FallbackReason::from(&e);
            warn!(%reason, error = %e, "Model call failed, using offline plan");
            reason
        })?;

        extract_plan(&raw, request).map_err(|e| {
            let reason = FallbackReason::from(&e);
            warn!(%reason, error = %e, "Model output unusable, using offline plan");
            reason
        })
    }

    fn synthesize(&self, request: &TripRequest) -> TripPlan {
        match self.weather_seed {
            Some(seed) => fallback::synthesize_seeded(request, seed),
            None => fallback::synthesize_with_entropy(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestField;
    use crate::gateway::ScriptedGateway;
    use crate::prompt::PLANNER_SYSTEM_PROMPT;
    use rstest::rstest;
    use serde_json::{Value, json};

    const SEED: u64 = 11;

    fn draft() -> TripRequestDraft {
        TripRequestDraft {
            destination: Some("Paris".into()),
            start_date: Some("2024-06-01".into()),
            end_date: Some("2024-06-03".into()),
            interests: Some(vec!["historical".into()]),
            travel_with: Some("solo".into()),
        }
    }

    fn paris() -> TripRequest {
        validate(&draft()).unwrap()
    }

    fn assembler(gateway: ScriptedGateway) -> (Arc<ScriptedGateway>, ItineraryAssembler) {
        let gateway = Arc::new(gateway);
        let assembler = ItineraryAssembler::new(gateway.clone()).with_weather_seed(SEED);
        (gateway, assembler)
    }

    fn model_plan() -> Value {
        let days = ["2024-06-01", "2024-06-02", "2024-06-03"];
        json!({
            "itinerary": days.iter().map(|d| json!({
                "date": d,
                "morning": [{"time": "9:00 AM - 11:00 AM", "title": "Louvre", "description": "Museum"}],
                "afternoon": [],
                "evening": []
            })).collect::<Vec<_>>(),
            "places": [{"name": "Louvre", "description": "Art", "type": "Cultural"}],
            "weather": days.iter().map(|d| json!({
                "date": d,
                "condition": "Clear",
                "temperature": {"min": 14, "max": 23, "unit": "C"},
                "precipitation": 10,
                "humidity": 55,
                "windSpeed": 9
            })).collect::<Vec<_>>(),
            "packingList": [{"name": "Umbrella", "category": "Weather Gear", "essential": false}]
        })
    }

    #[tokio::test]
    async fn test_valid_model_output_is_returned() {
        let (gateway, assembler) =
            assembler(ScriptedGateway::new().with_completion(Ok(model_plan().to_string())));

        let plan = assembler.generate(&paris()).await;

        assert_eq!(plan.itinerary[0].morning[0].title, "Louvre");
        assert_eq!(plan.places.len(), 1);
        let payloads = gateway.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].messages[0].content, PLANNER_SYSTEM_PROMPT);
    }

    #[rstest]
    #[case::upstream(Err(GatewayError::Upstream { status_code: 500, raw_body: "oops".into() }))]
    #[case::transport(Err(GatewayError::Transport("connection refused".into())))]
    #[case::envelope(Err(GatewayError::MalformedEnvelope("no choices".into())))]
    #[case::prose(Ok("I'd love to help you plan Paris!".into()))]
    #[tokio::test]
    async fn test_failures_resolve_to_fallback(#[case] response: Result<String, GatewayError>) {
        let (_, assembler) = assembler(ScriptedGateway::new().with_completion(response));

        let plan = assembler.generate(&paris()).await;

        assert_eq!(plan, fallback::synthesize_seeded(&paris(), SEED));
    }

    #[tokio::test]
    async fn test_missing_packing_list_falls_back() {
        let mut raw = model_plan();
        raw.as_object_mut().unwrap().remove("packingList");
        let (_, assembler) = assembler(ScriptedGateway::new().with_completion(Ok(raw.to_string())));

        let plan = assembler.generate(&paris()).await;

        assert_eq!(plan.packing_list.len(), 25);
        assert_eq!(plan.itinerary[0].morning[1].title, "Historical Site Visit");
    }

    #[tokio::test]
    async fn test_wrong_day_count_falls_back() {
        let mut raw = model_plan();
        raw["itinerary"].as_array_mut().unwrap().pop();
        let (_, assembler) = assembler(ScriptedGateway::new().with_completion(Ok(raw.to_string())));

        let plan = assembler.generate(&paris()).await;

        assert_eq!(plan.itinerary.len(), 3);
        assert_eq!(plan.places.len(), 6);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_gateway() {
        let (gateway, assembler) = assembler(ScriptedGateway::new());
        let invalid = TripRequestDraft {
            destination: None,
            ..draft()
        };

        let err = assembler.generate_raw(&invalid).await.unwrap_err();

        assert_eq!(err.fields(), vec![RequestField::Destination]);
        assert!(gateway.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_paris_scenario_through_raw_entry() {
        let (_, assembler) = assembler(ScriptedGateway::new());

        let plan = assembler.generate_raw(&draft()).await.unwrap();

        assert_eq!(plan.itinerary.len(), 3);
        assert_eq!(plan.weather.len(), 3);
        assert_eq!(plan.itinerary[0].morning[1].title, "Historical Site Visit");
        assert_eq!(plan.places.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_model_falls_back_within_budget() {
        let gateway = Arc::new(ScriptedGateway::new().with_stalled_completion());
        let assembler = ItineraryAssembler::new(gateway.clone())
            .with_weather_seed(SEED)
            .with_model_budget(Duration::from_secs(30));

        let started = tokio::time::Instant::now();
        let plan = assembler.generate(&paris()).await;

        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(30) && waited < Duration::from_secs(31));
        assert_eq!(plan, fallback::synthesize_seeded(&paris(), SEED));
        assert_eq!(gateway.payloads().len(), 1);
    }

    #[test]
    fn test_fallback_reason_mapping() {
        assert_eq!(
            FallbackReason::from(&GatewayError::Transport("x".into())),
            FallbackReason::Transport
        );
        assert_eq!(
            FallbackReason::from(&GatewayError::Upstream {
                status_code: 429,
                raw_body: String::new()
            }),
            FallbackReason::Upstream
        );
        assert_eq!(
            FallbackReason::from(&ParseError::Decode("eof".into())).to_string(),
            "parse"
        );
    }
}

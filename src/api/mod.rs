use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{
        IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    VERSION,
    assembler::ItineraryAssembler,
    chat::{APOLOGY, ChatRelay, ReplyStream},
    config::ServerConfig,
    error::{RequestField, ValidationError},
    gateway::{ModelGateway, StreamChunk},
    models::{Message, TripPlan, TripRequestDraft},
};

const CHAT_FAILURE: &str = "Failed to process chat request";
const DONE_SENTINEL: &str = "[DONE]";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    assembler: Arc<ItineraryAssembler>,
    relay: ChatRelay,
}

impl AppState {
    /// State for a server whose requests time out per `config`
    pub fn new(gateway: Arc<dyn ModelGateway>, config: &ServerConfig) -> Self {
        let assembler =
            ItineraryAssembler::new(gateway.clone()).with_model_budget(config.model_budget());
        Self::with_assembler(assembler, gateway)
    }

    pub fn with_assembler(assembler: ItineraryAssembler, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            assembler: Arc::new(assembler),
            relay: ChatRelay::new(gateway),
        }
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<RequestField>>,
}

/// Handler failures mapped onto status codes
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    BadRequest(String),
    /// Body could not be read or decoded
    Rejected { status: StatusCode, message: String },
    Internal(&'static str),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: err.to_string(),
                    fields: Some(err.fields()),
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    fields: None,
                },
            ),
            ApiError::Rejected { status, message } => (
                status,
                ErrorBody {
                    error: message,
                    fields: None,
                },
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: message.to_string(),
                    fields: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/itinerary", post(create_itinerary))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn create_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<TripRequestDraft>, JsonRejection>,
) -> Result<Json<TripPlan>, ApiError> {
    let Json(draft) = payload?;
    let plan = state.assembler.generate_raw(&draft).await.inspect_err(|e| {
        info!(error = %e, "Rejected trip request");
    })?;
    Ok(Json(plan))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let Json(request) = payload?;
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".to_string()));
    }

    let reply = state.relay.open(&request.messages).await.map_err(|e| {
        warn!(error = %e, "Chat request failed");
        ApiError::Internal(CHAT_FAILURE)
    })?;

    Ok(Sse::new(relay_events(reply)).keep_alive(KeepAlive::default()))
}

/// Re-frame decoded tokens as completion deltas, ending with the sentinel
fn relay_events(reply: ReplyStream) -> impl Stream<Item = Result<Event, axum::Error>> {
    let deltas = stream::unfold(Some(reply), |reply| async move {
        let mut reply = reply?;
        match reply.next_token().await? {
            Ok(token) => Some((delta_event(token), Some(reply))),
            Err(e) => {
                warn!(error = %e, "Chat stream broke off");
                Some((delta_event(APOLOGY), None))
            }
        }
    });

    deltas.chain(stream::once(async { Ok(Event::default().data(DONE_SENTINEL)) }))
}

fn delta_event(token: impl Into<String>) -> Result<Event, axum::Error> {
    Event::default().json_data(StreamChunk::token(token))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
    })
}

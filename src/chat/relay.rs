//! Streaming chat turns against the model gateway

use std::collections::VecDeque;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::session::ChatSession;
use super::sse::{SseDecoder, SseEvent};
use crate::gateway::{CompletionPayload, FragmentStream, GatewayError, ModelGateway};
use crate::models::Message;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful travel assistant. Provide concise, accurate information about destinations, travel tips, local customs, attractions, and answer any travel-related questions. If asked about specific itineraries, refer to the travel planner feature of the application.";

pub const GREETING: &str =
    "Hello! I'm your AI travel assistant. How can I help you plan your perfect trip today?";

pub const APOLOGY: &str = "I'm sorry, I encountered an error. Please try again later.";

pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_TOKENS: u32 = 800;

/// How a chat turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Stream reached the sentinel or closed normally
    Completed,
    /// Stopped by the caller; content received so far is kept
    Cancelled,
    /// Gateway failed; the apology is in the history
    Failed,
}

/// Stream-mode payload: fixed preamble followed by the full history
#[must_use]
pub fn build_chat_payload(history: &[Message]) -> CompletionPayload {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(CHAT_SYSTEM_PROMPT));
    messages.extend_from_slice(history);

    CompletionPayload {
        messages,
        temperature: CHAT_TEMPERATURE,
        max_tokens: CHAT_MAX_TOKENS,
        response_format: None,
        stream: true,
    }
}

/// Decoded content tokens of one streamed reply
pub struct ReplyStream {
    fragments: FragmentStream,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

impl ReplyStream {
    fn new(fragments: FragmentStream) -> Self {
        Self {
            fragments,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Next content token; `None` once the reply is complete
    pub async fn next_token(&mut self) -> Option<Result<String, GatewayError>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }

            match self.fragments.next().await {
                Some(Ok(chunk)) => {
                    let events = self.decoder.feed(&chunk);
                    self.absorb(events);
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    let events = self.decoder.finish();
                    self.absorb(events);
                    self.finished = true;
                }
            }
        }
    }

    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Token(token) => self.pending.push_back(token),
                SseEvent::Done => self.finished = true,
            }
        }
    }
}

/// Forwards chat history to the gateway and reassembles streamed replies
#[derive(Clone)]
pub struct ChatRelay {
    gateway: Arc<dyn ModelGateway>,
}

impl ChatRelay {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Start a streamed reply to `history`
    ///
    /// Resolves once the upstream accepted the request.
    #[instrument(skip_all, fields(messages = history.len()))]
    pub async fn open(&self, history: &[Message]) -> Result<ReplyStream, GatewayError> {
        let fragments = self.gateway.stream(build_chat_payload(history)).await?;
        debug!("Chat stream established");
        Ok(ReplyStream::new(fragments))
    }

    /// Run one user turn against `session`
    ///
    /// `on_token` sees every token as it is appended to the reply.
    #[instrument(skip_all, fields(history = session.messages().len()))]
    pub async fn submit(
        &self,
        session: &mut ChatSession,
        text: impl Into<String>,
        cancel: &CancellationToken,
        mut on_token: impl FnMut(&str),
    ) -> TurnOutcome {
        session.push(Message::user(text));

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("Chat turn cancelled before the reply started");
                return TurnOutcome::Cancelled;
            }
            opened = self.open(session.messages()) => opened,
        };
        let mut reply = match opened {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                session.push(Message::assistant(APOLOGY));
                return TurnOutcome::Failed;
            }
        };

        session.push(Message::assistant(""));
        let mut tokens = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(tokens, "Chat turn cancelled");
                    return TurnOutcome::Cancelled;
                }
                next = reply.next_token() => next,
            };

            match next {
                Some(Ok(token)) => {
                    session.append_to_reply(&token);
                    on_token(&token);
                    tokens += 1;
                }
                Some(Err(e)) => {
                    warn!(error = %e, tokens, "Chat stream broke off");
                    session.fail_reply(APOLOGY);
                    return TurnOutcome::Failed;
                }
                None => {
                    debug!(tokens, "Chat reply complete");
                    return TurnOutcome::Completed;
                }
            }
        }
    }
}

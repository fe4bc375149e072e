//! In-memory gateway replaying queued responses
//!
//! Used to drive the assembler, the chat relay and the HTTP handlers without
//! a network. Each call pops the next scripted response of its mode; an
//! exhausted queue behaves like an unreachable service.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::{StreamExt, future, stream};

use super::{CompletionPayload, FragmentStream, GatewayError, ModelGateway};

/// `None` never answers
type ScriptedCompletion = Option<Result<String, GatewayError>>;

enum StreamEnd {
    Close,
    Fail(GatewayError),
    Stall,
}

struct ScriptedStream {
    chunks: Vec<Vec<u8>>,
    end: StreamEnd,
}

#[derive(Default)]
pub struct ScriptedGateway {
    completions: Mutex<VecDeque<ScriptedCompletion>>,
    streams: Mutex<VecDeque<Result<ScriptedStream, GatewayError>>>,
    payloads: Mutex<Vec<CompletionPayload>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch response
    #[must_use]
    pub fn with_completion(self, response: Result<String, GatewayError>) -> Self {
        lock(&self.completions).push_back(Some(response));
        self
    }

    /// Queue a batch call that never answers
    #[must_use]
    pub fn with_stalled_completion(self) -> Self {
        lock(&self.completions).push_back(None);
        self
    }

    /// Queue a stream delivering `chunks` and then closing
    #[must_use]
    pub fn with_stream<I, C>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.push_stream(chunks, StreamEnd::Close)
    }

    /// Queue a stream delivering `chunks` and then failing with `error`
    #[must_use]
    pub fn with_broken_stream<I, C>(self, chunks: I, error: GatewayError) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.push_stream(chunks, StreamEnd::Fail(error))
    }

    /// Queue a stream delivering `chunks` and then going silent
    #[must_use]
    pub fn with_stalled_stream<I, C>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.push_stream(chunks, StreamEnd::Stall)
    }

    fn push_stream<I, C>(self, chunks: I, end: StreamEnd) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        lock(&self.streams).push_back(Ok(ScriptedStream { chunks, end }));
        self
    }

    /// Queue a stream request that is refused outright
    #[must_use]
    pub fn with_stream_error(self, error: GatewayError) -> Self {
        lock(&self.streams).push_back(Err(error));
        self
    }

    /// Payloads received so far, oldest first
    #[must_use]
    pub fn payloads(&self) -> Vec<CompletionPayload> {
        lock(&self.payloads).clone()
    }

    fn exhausted() -> GatewayError {
        GatewayError::Transport("no scripted response left".to_string())
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, payload: CompletionPayload) -> Result<String, GatewayError> {
        lock(&self.payloads).push(payload);
        let next = lock(&self.completions).pop_front();
        match next {
            Some(Some(response)) => response,
            Some(None) => future::pending().await,
            None => Err(Self::exhausted()),
        }
    }

    async fn stream(&self, payload: CompletionPayload) -> Result<FragmentStream, GatewayError> {
        lock(&self.payloads).push(payload);
        let ScriptedStream { chunks, end } = lock(&self.streams)
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted()))?;

        let head = stream::iter(chunks.into_iter().map(Ok::<_, GatewayError>));
        Ok(match end {
            StreamEnd::Close => head.boxed(),
            StreamEnd::Fail(error) => head.chain(stream::once(future::ready(Err(error)))).boxed(),
            StreamEnd::Stall => head.chain(stream::pending()).boxed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use std::time::Duration;

    fn payload() -> CompletionPayload {
        CompletionPayload {
            messages: vec![Message::user("hi")],
            temperature: 0.7,
            max_tokens: 10,
            response_format: None,
            stream: false,
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_then_runs_dry() {
        let gateway = ScriptedGateway::new()
            .with_completion(Ok("first".into()))
            .with_completion(Err(GatewayError::Upstream {
                status_code: 500,
                raw_body: "boom".into(),
            }));

        assert_eq!(gateway.complete(payload()).await.unwrap(), "first");
        assert!(matches!(
            gateway.complete(payload()).await,
            Err(GatewayError::Upstream { status_code: 500, .. })
        ));
        assert!(matches!(
            gateway.complete(payload()).await,
            Err(GatewayError::Transport(_))
        ));
        assert_eq!(gateway.payloads().len(), 3);
    }

    #[tokio::test]
    async fn test_broken_stream_ends_with_error() {
        let gateway = ScriptedGateway::new()
            .with_broken_stream(["a", "b"], GatewayError::Transport("reset".into()));

        let items = gateway.stream(payload()).await.unwrap().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), b"a");
        assert!(items[2].is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_stream_goes_silent_after_chunks() {
        let gateway = ScriptedGateway::new().with_stalled_stream(["a"]);

        let mut fragments = gateway.stream(payload()).await.unwrap();
        assert_eq!(fragments.next().await.unwrap().unwrap(), b"a");
        let silent = tokio::time::timeout(Duration::from_secs(60), fragments.next()).await;
        assert!(silent.is_err());
    }
}

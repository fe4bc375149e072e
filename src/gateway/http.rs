//! HTTP implementation of the model gateway
//!
//! Talks to an Azure OpenAI compatible chat-completions deployment. Transport
//! errors and 5xx answers are retried with jittered exponential backoff,
//! every other non-success status fails on the first attempt.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{
    Jitter, RetryTransientMiddleware, Retryable, RetryableStrategy, default_on_request_failure,
};
use tracing::{debug, error, info, instrument, warn};

use super::{CompletionEnvelope, CompletionPayload, FragmentStream, GatewayError, ModelGateway};
use crate::config::{MAX_RETRY_DELAY, ModelConfig};
use crate::error::PlannerError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries server-side failures, gives up on client errors
struct UpstreamRetryStrategy;

impl RetryableStrategy for UpstreamRetryStrategy {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) if response.status().is_success() => None,
            Ok(response) if response.status().is_server_error() => {
                warn!(status = %response.status(), "Upstream server error, retrying");
                Some(Retryable::Transient)
            }
            Ok(_) => Some(Retryable::Fatal),
            Err(err) => default_on_request_failure(err),
        }
    }
}

/// Gateway to the hosted model over HTTPS
pub struct HttpModelGateway {
    client: ClientWithMiddleware,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl HttpModelGateway {
    /// Create a gateway from validated model settings
    pub fn from_config(config: &ModelConfig) -> Result<Self, PlannerError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| PlannerError::config("Model endpoint is not configured"))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PlannerError::config("Model API key is not configured"))?;
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        // Several rustls providers may be compiled in; pin ring.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(timeout)
            .user_agent(format!("travel-planner/{}", crate::VERSION))
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        let policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(config.retry_base_ms), MAX_RETRY_DELAY)
            .jitter(Jitter::Bounded)
            .base(2)
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                policy,
                UpstreamRetryStrategy,
            ))
            .build();

        info!(
            endpoint = %endpoint,
            max_retries = config.max_retries,
            timeout_seconds = config.timeout_seconds,
            "Model gateway ready"
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
            timeout,
        })
    }

    fn request(
        &self,
        payload: &CompletionPayload,
    ) -> Result<reqwest_middleware::RequestBuilder, GatewayError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| GatewayError::Transport(format!("failed to encode request: {e}")))?;

        Ok(self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("api-key", self.api_key.as_str())
            .body(body))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw_body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %raw_body, "Model API error");
        Err(GatewayError::Upstream {
            status_code: status.as_u16(),
            raw_body,
        })
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    #[instrument(skip(self, payload), fields(messages = payload.messages.len()))]
    async fn complete(&self, mut payload: CompletionPayload) -> Result<String, GatewayError> {
        payload.stream = false;
        let start_time = Instant::now();

        let response = self.request(&payload)?.timeout(self.timeout).send().await?;
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;

        let envelope: CompletionEnvelope = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedEnvelope(e.to_string()))?;
        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::MalformedEnvelope("no completion content".into()))?;

        let elapsed = start_time.elapsed();
        info!(
            chars = content.len(),
            "Completion received in {:.3}s",
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 30 {
            warn!("Slow completion: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(content)
    }

    #[instrument(skip(self, payload), fields(messages = payload.messages.len()))]
    async fn stream(&self, mut payload: CompletionPayload) -> Result<FragmentStream, GatewayError> {
        payload.stream = true;

        let response = self.request(&payload)?.send().await?;
        let response = Self::ensure_success(response).await?;
        debug!("Stream established");

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(GatewayError::from))
            .boxed())
    }
}

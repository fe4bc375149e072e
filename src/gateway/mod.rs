//! Model gateway
//!
//! Boundary to the hosted generation service. Batch mode returns the complete
//! completion text, stream mode hands back the raw response body as it
//! arrives so the chat relay can reassemble it.

use async_trait::async_trait;
use futures::stream::BoxStream;

mod error;
mod http;
#[cfg(test)]
mod scripted;
mod types;

pub use error::GatewayError;
pub use http::HttpModelGateway;
#[cfg(test)]
pub use scripted::ScriptedGateway;
pub use types::{CompletionPayload, ResponseFormat, StreamChoice, StreamChunk, StreamDelta};
pub(crate) use types::CompletionEnvelope;

/// Raw body chunks of a streamed completion, in arrival order
pub type FragmentStream = BoxStream<'static, Result<Vec<u8>, GatewayError>>;

/// Access to the remote generation service
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Batch mode: one request, one complete completion text
    async fn complete(&self, payload: CompletionPayload) -> Result<String, GatewayError>;

    /// Stream mode: resolves once the upstream accepted the request
    async fn stream(&self, payload: CompletionPayload) -> Result<FragmentStream, GatewayError>;
}

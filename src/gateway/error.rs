//! Gateway error types

use thiserror::Error;

/// Errors that can occur while calling the generation service
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Upstream returned {status_code}: {raw_body}")]
    Upstream { status_code: u16, raw_body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    /// Success status but no usable completion in the body
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),
}

impl GatewayError {
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Upstream { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for GatewayError {
    fn from(err: reqwest_middleware::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = GatewayError::Upstream {
            status_code: 429,
            raw_body: "slow down".into(),
        };
        assert_eq!(err.status_code(), Some(429));
        assert!(err.to_string().contains("429"));
        assert_eq!(GatewayError::Transport("x".into()).status_code(), None);
    }
}

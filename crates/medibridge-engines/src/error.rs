//! Error types for remote engine adapters.

use thiserror::Error;

use medibridge_core::error::MediBridgeError;

/// Errors from a remote engine call.
///
/// Everything here is a single-attempt outcome; retry policy lives with
/// the caller, not the adapters.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(String),
    #[error("engine returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode engine response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Http(err.to_string())
    }
}

impl From<EngineError> for MediBridgeError {
    fn from(err: EngineError) -> Self {
        MediBridgeError::Engine(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::Config("empty api key".to_string());
        assert_eq!(
            err.to_string(),
            "invalid engine configuration: empty api key"
        );

        let err = EngineError::Api {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "engine returned status 429: rate limited");

        let err = EngineError::Decode("missing field".to_string());
        assert_eq!(
            err.to_string(),
            "failed to decode engine response: missing field"
        );
    }

    #[test]
    fn test_conversion_to_top_level_error() {
        let err: MediBridgeError = EngineError::Http("connection refused".to_string()).into();
        assert!(matches!(err, MediBridgeError::Engine(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}

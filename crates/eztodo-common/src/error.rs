use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the gateway can produce while serving a chat request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selected provider needs a credential and none was configured.
    #[error("{provider} API key is not configured")]
    MissingCredential { provider: String },

    /// The backend answered, but with a non-success status or an unusable body.
    #[error("{message}")]
    Backend {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("AI service not configured: {0}")]
    UnknownProvider(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Machine-readable discriminant of [`Error`], emitted in failure responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    BackendError,
    TransportFailure,
    UnknownProvider,
    MalformedRequest,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingCredential { .. } => ErrorKind::MissingCredential,
            Error::Backend { .. } => ErrorKind::BackendError,
            Error::Transport { .. } => ErrorKind::TransportFailure,
            Error::UnknownProvider(_) => ErrorKind::UnknownProvider,
            Error::MalformedRequest(_) => ErrorKind::MalformedRequest,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = Error::MissingCredential {
            provider: "OpenAI".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert_eq!(err.to_string(), "OpenAI API key is not configured");

        let err = Error::UnknownProvider("anthropic".to_string());
        assert_eq!(err.kind(), ErrorKind::UnknownProvider);
        assert_eq!(err.to_string(), "AI service not configured: anthropic");
    }

    #[test]
    fn backend_error_displays_raw_message() {
        let err = Error::Backend {
            provider: "DeepSeek".to_string(),
            status: Some(402),
            message: "DeepSeek API request failed: 402 Insufficient Balance".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::BackendError);
        assert_eq!(
            err.to_string(),
            "DeepSeek API request failed: 402 Insufficient Balance"
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TransportFailure).unwrap();
        assert_eq!(json, "\"transport_failure\"");
    }
}

use thiserror::Error;

/// Why a provider could not produce a usable example.
///
/// Every variant means "no example"; providers never hand back a partially
/// populated record.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to scenario provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("scenario provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("scenario provider returned no text")]
    EmptyResponse,

    #[error("scenario is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    InvalidExample(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidExample(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_body() {
        let err = ProviderError::Status {
            status: 429,
            body: "quota exceeded".into(),
        };
        assert_eq!(
            err.to_string(),
            "scenario provider returned 429: quota exceeded"
        );
    }

    #[test]
    fn test_json_errors_convert() {
        let err: ProviderError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ProviderError::MalformedJson(_)));
    }
}

pub mod types;
pub mod vitals;
pub mod classify;
pub mod coerce;
pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod consistency;
pub mod yandex;
pub mod orchestrator;

pub use types::*;
pub use vitals::*;
pub use classify::*;
pub use coerce::*;
pub use parser::*;
pub use prompt::*;
pub use sanitize::*;
pub use consistency::*;
pub use yandex::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Completion provider API key is not configured")]
    MissingApiKey,

    #[error("Completion provider unreachable at {0}")]
    ProviderConnection(String),

    #[error("Completion provider returned error (status {status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unexpected completion envelope: {0}")]
    ResponseParsing(String),

    #[error("No JSON object in model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Triage result failed schema check: {0}")]
    Schema(String),
}

impl TriageError {
    /// Errors caused by the provider or the transport to it.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TriageError::ProviderConnection(_)
                | TriageError::ProviderError { .. }
                | TriageError::HttpClient(_)
                | TriageError::ResponseParsing(_)
        )
    }

    /// Errors caused by the text the model produced.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            TriageError::MalformedResponse(_)
                | TriageError::JsonParsing(_)
                | TriageError::Schema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_are_upstream() {
        assert!(TriageError::ProviderConnection("x".into()).is_upstream());
        assert!(TriageError::ProviderError { status: 503, body: String::new() }.is_upstream());
        assert!(!TriageError::JsonParsing("x".into()).is_upstream());
    }

    #[test]
    fn model_text_failures_are_parse() {
        assert!(TriageError::MalformedResponse("x".into()).is_parse());
        assert!(TriageError::Schema("x".into()).is_parse());
        assert!(!TriageError::MissingApiKey.is_parse());
        assert!(!TriageError::MissingApiKey.is_upstream());
    }
}

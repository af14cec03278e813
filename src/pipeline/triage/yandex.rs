use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{ChatMessage, Completion, CompletionClient, CompletionRequest};
use super::TriageError;
use crate::config::TriageConfig;

/// Public Yandex Foundation Models completion endpoint.
pub const YANDEX_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Yandex Foundation Models completion client.
pub struct YandexClient {
    client: reqwest::Client,
    completion_url: String,
    api_key: Option<String>,
    folder_id: Option<String>,
    model_uri: String,
    temperature: f64,
    max_tokens: u32,
    timeout_secs: u64,
}

impl YandexClient {
    pub fn from_config(config: &TriageConfig) -> Result<Self, TriageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .map_err(|e| TriageError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            completion_url: config.completion_url.clone(),
            api_key: config.api_key.clone(),
            folder_id: config.folder_id.clone(),
            model_uri: config.model_uri.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.provider_timeout_secs,
        })
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> CompletionBody<'a> {
        CompletionBody {
            model_uri: request.model_uri.as_deref().unwrap_or(&self.model_uri),
            completion_options: CompletionOptions {
                stream: false,
                temperature: request.temperature.unwrap_or(self.temperature),
                max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
                reasoning_options: ReasoningOptions { mode: "DISABLED" },
            },
            messages: &request.messages,
        }
    }

    fn api_key(&self) -> Result<&str, TriageError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TriageError::MissingApiKey)
    }
}

/// Request body for the completion endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionBody<'a> {
    model_uri: &'a str,
    completion_options: CompletionOptions,
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
    reasoning_options: ReasoningOptions,
}

#[derive(Serialize)]
struct ReasoningOptions {
    mode: &'static str,
}

/// Response envelope: `result.alternatives[0].message.text`.
#[derive(Deserialize)]
struct CompletionEnvelope {
    result: CompletionResultBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionResultBody {
    alternatives: Vec<Alternative>,
    #[serde(default)]
    usage: Option<Value>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    text: String,
}

/// Decode a successful completion envelope.
pub fn parse_completion_envelope(body: &str) -> Result<Completion, TriageError> {
    let envelope: CompletionEnvelope =
        serde_json::from_str(body).map_err(|e| TriageError::ResponseParsing(e.to_string()))?;

    let result = envelope.result;
    let text = result
        .alternatives
        .into_iter()
        .next()
        .map(|a| a.message.text)
        .ok_or_else(|| TriageError::ResponseParsing("no alternatives in result".into()))?;

    Ok(Completion {
        text,
        usage: result.usage,
        model_version: result.model_version,
    })
}

#[async_trait]
impl CompletionClient for YandexClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, TriageError> {
        let api_key = self.api_key()?;
        let body = self.request_body(request);

        let mut builder = self
            .client
            .post(&self.completion_url)
            .header("Authorization", format!("Api-Key {api_key}"))
            .header("Accept", "application/json")
            .json(&body);
        if let Some(folder) = self.folder_id.as_deref() {
            builder = builder.header("x-folder-id", folder);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TriageError::ProviderConnection(self.completion_url.clone())
            } else if e.is_timeout() {
                TriageError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                TriageError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TriageError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Completion provider returned error status");
            return Err(TriageError::ProviderError {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_completion_envelope(&text)
    }

    fn model_uri(&self) -> &str {
        &self.model_uri
    }
}

/// Canned answer of a `MockCompletionClient`.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ProviderError { status: u16, body: String },
}

/// Mock completion client for testing — returns a configurable reply and
/// records every request it receives.
pub struct MockCompletionClient {
    reply: MockReply,
    model_uri: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    pub fn new(text: &str) -> Self {
        Self::with_reply(MockReply::Text(text.to_string()))
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self::with_reply(MockReply::ProviderError {
            status,
            body: body.to_string(),
        })
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            model_uri: "gpt://mock-folder/yandexgpt/latest".to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, TriageError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        match &self.reply {
            MockReply::Text(text) => Ok(Completion {
                text: text.clone(),
                usage: None,
                model_version: Some("mock".to_string()),
            }),
            MockReply::ProviderError { status, body } => Err(TriageError::ProviderError {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn model_uri(&self) -> &str {
        &self.model_uri
    }
}

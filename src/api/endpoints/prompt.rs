//! Raw prompt proxy to the completion provider.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::triage::{ChatMessage, CompletionRequest, TriageError};

#[derive(Debug, Deserialize)]
pub struct PromptProxyRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub model_uri: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PromptProxyResponse {
    Completed {
        text: String,
        usage: Option<Value>,
        #[serde(rename = "modelVersion")]
        model_version: Option<String>,
    },
    /// Provider rejected the call; reported in-band with HTTP 200.
    ProviderError {
        status: &'static str,
        http_status: u16,
        body: String,
    },
}

impl PromptProxyRequest {
    /// Explicit `messages` win; otherwise optional system + user.
    fn into_completion_request(self) -> CompletionRequest {
        let messages = match self.messages {
            Some(messages) if !messages.is_empty() => messages,
            _ => {
                let mut messages = Vec::with_capacity(2);
                if let Some(system) = self.system.filter(|s| !s.is_empty()) {
                    messages.push(ChatMessage::system(system));
                }
                messages.push(ChatMessage::user(self.user));
                messages
            }
        };

        CompletionRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            model_uri: self.model_uri.filter(|m| !m.is_empty()),
        }
    }
}

/// `POST /yandex/prompt` — forward an arbitrary prompt and return the raw text.
pub async fn proxy(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PromptProxyRequest>, JsonRejection>,
) -> Result<Json<PromptProxyResponse>, ApiError> {
    let Json(req) = payload?;
    let request = req.into_completion_request();

    match ctx.client().complete(&request).await {
        Ok(completion) => Ok(Json(PromptProxyResponse::Completed {
            text: completion.text,
            usage: completion.usage,
            model_version: completion.model_version,
        })),
        Err(TriageError::ProviderError { status, body }) => {
            Ok(Json(PromptProxyResponse::ProviderError {
                status: "yandex_error",
                http_status: status,
                body,
            }))
        }
        Err(e) => Err(e.into()),
    }
}

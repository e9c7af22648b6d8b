//! Shared wire format for OpenAI-compatible chat-completion endpoints.

use eztodo_common::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::ChatMessage;

pub(crate) const MAX_TOKENS: u32 = 1000;
pub(crate) const TEMPERATURE: f64 = 0.7;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

/// One OpenAI-style backend: endpoint, model and display name for errors.
#[derive(Clone)]
pub(crate) struct ChatCompletionClient {
    client: Client,
    label: &'static str,
    base_url: String,
    model: String,
}

impl ChatCompletionClient {
    pub(crate) fn new(label: &'static str, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            label,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    /// POST the conversation. Only network-level failures are errors here;
    /// status handling is left to the caller.
    pub(crate) async fn send(&self, api_key: &str, messages: &[ChatMessage]) -> Result<Response> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(
            provider = self.label,
            model = %self.model,
            messages = messages.len(),
            "sending chat completion"
        );

        self.client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport(e))
    }

    /// Read the full body of a response, mapping read failures to transport errors.
    pub(crate) async fn body_text(&self, response: Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport(e))?;
        Ok((status, text))
    }

    /// Pull `choices[0].message.content` out of a successful response body.
    ///
    /// A body that is not JSON is a backend error; a JSON body without the
    /// field yields an empty reply.
    pub(crate) fn extract_reply(&self, status: StatusCode, body: &str) -> Result<String> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            self.backend(
                status,
                format!("{} API returned an invalid response body: {}", self.label, e),
            )
        })?;

        Ok(value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    pub(crate) fn missing_credential(&self) -> Error {
        Error::MissingCredential {
            provider: self.label.to_string(),
        }
    }

    pub(crate) fn backend(&self, status: StatusCode, message: String) -> Error {
        Error::Backend {
            provider: self.label.to_string(),
            status: Some(status.as_u16()),
            message,
        }
    }

    fn transport(&self, err: reqwest::Error) -> Error {
        Error::Transport {
            provider: self.label.to_string(),
            message: err.to_string(),
        }
    }
}

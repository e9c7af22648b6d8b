use async_trait::async_trait;
use eztodo_common::Result;
use tracing::warn;

use super::wire::ChatCompletionClient;
use super::{CompletionRequest, LlmProvider};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone)]
pub struct OpenAiProvider {
    inner: ChatCompletionClient,
}

impl OpenAiProvider {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            inner: ChatCompletionClient::new(
                "OpenAI",
                base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            ),
        }
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        eztodo_config::OPENAI
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = request
            .api_key()
            .ok_or_else(|| self.inner.missing_credential())?;

        let response = self
            .inner
            .send(api_key, request.conversation.messages())
            .await?;
        let (status, body) = self.inner.body_text(response).await?;

        if !status.is_success() {
            // OpenAI reports errors as JSON; forward the payload as-is.
            let payload = serde_json::from_str::<serde_json::Value>(&body)
                .map(|v| v.to_string())
                .unwrap_or(body);
            warn!(status = status.as_u16(), "OpenAI API returned an error");
            return Err(self
                .inner
                .backend(status, format!("OpenAI API error: {}", payload)));
        }

        self.inner.extract_reply(status, &body)
    }
}

use async_trait::async_trait;
use eztodo_common::Result;
use tracing::{info, warn};

use super::wire::ChatCompletionClient;
use super::{CompletionRequest, LlmProvider};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Clone)]
pub struct DeepSeekProvider {
    inner: ChatCompletionClient,
}

impl DeepSeekProvider {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            inner: ChatCompletionClient::new(
                "DeepSeek",
                base_url.unwrap_or_else(|| DEEPSEEK_BASE_URL.to_string()),
                model.unwrap_or_else(|| DEEPSEEK_DEFAULT_MODEL.to_string()),
            ),
        }
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

impl Default for DeepSeekProvider {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    fn provider_id(&self) -> &str {
        eztodo_config::DEEPSEEK
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

        // DeepSeek may answer errors in plain text, so the body is not parsed.
        if !status.is_success() {
            warn!(status = status.as_u16(), "DeepSeek API returned an error");
            return Err(self.inner.backend(
                status,
                format!("DeepSeek API request failed: {} {}", status.as_u16(), body),
            ));
        }

        let reply = self.inner.extract_reply(status, &body)?;
        info!(chars = reply.len(), "DeepSeek API responded");
        Ok(reply)
    }
}

use async_trait::async_trait;
use eztodo_common::Result;

use super::{CompletionRequest, ContextCounts, LlmProvider};

/// Offline stand-in that answers with a fixed template. Useful in development
/// when no API key is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn reply(message: &str, counts: ContextCounts) -> String {
        format!(
            "Local simulation: {message}\n\n\
             You currently have {} tasks and {} plans.\n\n\
             Suggestions:\n\
             1. Handle important tasks first\n\
             2. Allocate your time sensibly\n\
             3. Review progress regularly\n\n\
             Tip: configure an API key to enable real AI responses.",
            counts.todos, counts.plans
        )
    }
}

#[async_trait]
impl LlmProvider for LocalProvider {
    fn provider_id(&self) -> &str {
        eztodo_config::LOCAL
    }

    fn requires_credential(&self) -> bool {
        false
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        Ok(Self::reply(
            request.conversation.current_message(),
            request.counts,
        ))
    }
}

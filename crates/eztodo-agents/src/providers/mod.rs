use std::fmt;

use async_trait::async_trait;
use eztodo_common::Result;
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;

pub mod deepseek;
pub mod local;
pub mod openai;
mod wire;

pub use deepseek::DeepSeekProvider;
pub use local::LocalProvider;
pub use openai::OpenAiProvider;

/// A chat-completion backend (OpenAI, DeepSeek, local simulator).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier, matched against the resolved provider name.
    fn provider_id(&self) -> &str;

    /// Whether [`LlmProvider::complete`] fails without a credential.
    fn requires_credential(&self) -> bool {
        true
    }

    /// Run one completion and return the assistant's reply text.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

/// Everything a provider needs for one completion.
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub conversation: &'a Conversation,
    pub credential: Option<&'a str>,
    pub counts: ContextCounts,
}

impl CompletionRequest<'_> {
    /// The credential, if present and not blank.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.credential.filter(|key| !key.trim().is_empty())
    }
}

impl fmt::Debug for CompletionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("conversation", self.conversation)
            .field("has_credential", &self.api_key().is_some())
            .field("counts", &self.counts)
            .finish()
    }
}

/// Number of task and plan items the caller supplied as context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCounts {
    pub todos: usize,
    pub plans: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

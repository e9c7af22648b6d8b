pub mod conversation;
pub mod providers;
pub mod registry;

pub use conversation::{Conversation, HISTORY_WINDOW, system_prompt};
pub use providers::{
    ChatMessage, ChatRole, CompletionRequest, ContextCounts, DeepSeekProvider, LlmProvider,
    LocalProvider, OpenAiProvider,
};
pub use registry::ProviderRegistry;

use crate::providers::{ChatMessage, ContextCounts};

/// Maximum number of caller-supplied history messages forwarded per request.
pub const HISTORY_WINDOW: usize = 6;

/// The role-tagged message sequence sent to a provider.
///
/// Always one system message, then at most [`HISTORY_WINDOW`] history
/// entries, then the current user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn assemble(current_message: &str, history: &[ChatMessage], counts: ContextCounts) -> Self {
        let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(system_prompt(counts)));
        messages.extend_from_slice(window);
        messages.push(ChatMessage::user(current_message));

        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// History entries that made it into the window.
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages[1..self.messages.len() - 1]
    }

    /// Text of the trailing user message.
    pub fn current_message(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

pub fn system_prompt(counts: ContextCounts) -> String {
    format!(
        "You are a professional task-management assistant that helps the user manage tasks, \
         plan their time and work more efficiently.\n\
         The user currently has {} tasks and {} plans.\n\
         Give personalised advice based on this task data; keep answers concise and practical, \
         highlighting what matters most.",
        counts.todos, counts.plans
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatRole;

    fn history(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("question {i}"))
                } else {
                    ChatMessage::assistant(format!("answer {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn length_is_history_plus_two() {
        for n in [0, 1, 5, 6, 7, 10, 40] {
            let conv = Conversation::assemble("hi", &history(n), ContextCounts::default());
            assert_eq!(conv.len(), 2 + n.min(HISTORY_WINDOW), "history of {n}");
            assert_eq!(conv.messages()[0].role, ChatRole::System);
            assert_eq!(conv.messages().last().unwrap().role, ChatRole::User);
        }
    }

    #[test]
    fn keeps_most_recent_six_in_order() {
        let hist = history(10);
        let conv = Conversation::assemble("next", &hist, ContextCounts::default());
        assert_eq!(conv.history(), &hist[4..]);
        assert_eq!(conv.history()[0].content, "question 4");
        assert_eq!(conv.current_message(), "next");
    }

    #[test]
    fn short_history_kept_whole() {
        let hist = history(3);
        let conv = Conversation::assemble("next", &hist, ContextCounts::default());
        assert_eq!(conv.history(), hist.as_slice());
    }

    #[test]
    fn trailing_user_message_even_if_history_ends_with_user() {
        let hist = vec![ChatMessage::user("earlier")];
        let conv = Conversation::assemble("now", &hist, ContextCounts::default());
        assert_eq!(conv.len(), 3);
        assert_eq!(conv.messages()[1].content, "earlier");
        assert_eq!(conv.messages()[2], ChatMessage::user("now"));
    }

    #[test]
    fn system_prompt_embeds_counts() {
        let counts = ContextCounts { todos: 4, plans: 2 };
        let conv = Conversation::assemble("hi", &[], counts);
        let prompt = &conv.messages()[0].content;
        assert!(prompt.contains("4 tasks and 2 plans"));
        assert!(prompt.contains("task-management assistant"));
    }

    #[test]
    fn history_system_messages_pass_through() {
        let hist = vec![ChatMessage::system("be brief")];
        let conv = Conversation::assemble("hi", &hist, ContextCounts::default());
        assert_eq!(conv.history()[0].role, ChatRole::System);
    }
}

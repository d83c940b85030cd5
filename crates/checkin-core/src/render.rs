//! Message log that the conversation client renders into.

use crate::state::{ChatMessage, ChatRole};

/// Anything that can show a labelled chat entry. Displaying cannot fail.
pub trait Renderer {
    fn display(&mut self, text: &str, role: ChatRole);
}

/// Append-only log of displayed messages, in call order.
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    follow_tail: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
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

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Returns true once after each display, so the view can jump to the newest entry.
    pub fn take_follow_request(&mut self) -> bool {
        std::mem::take(&mut self.follow_tail)
    }
}

impl Renderer for MessageLog {
    fn display(&mut self, text: &str, role: ChatRole) {
        self.messages.push(ChatMessage {
            role,
            content: text.to_string(),
        });
        self.follow_tail = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_in_order() {
        let mut log = MessageLog::new();
        log.display("hi", ChatRole::User);
        log.display("hello", ChatRole::Bot);

        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].content, "hi");
        assert_eq!(log.messages()[0].role, ChatRole::User);
        assert_eq!(log.messages()[1].role, ChatRole::Bot);
    }

    #[test]
    fn test_follow_request_is_consumed() {
        let mut log = MessageLog::new();
        assert!(!log.take_follow_request());

        log.display("", ChatRole::Bot);
        assert!(log.take_follow_request());
        assert!(!log.take_follow_request());
    }
}

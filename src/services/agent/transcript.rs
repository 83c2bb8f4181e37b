//! Conversation Transcript
//!
//! The per-run conversation, threaded through the loop by value. Each step
//! consumes the previous transcript and returns the extended one.

use responder_llm::{Message, ToolCall};
use responder_tools::ToolResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript with the incident message.
    pub fn open(incident: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(incident)],
        }
    }

    /// Record a model turn.
    pub fn with_assistant_turn(mut self, text: Option<&str>, tool_calls: &[ToolCall]) -> Self {
        self.messages.push(Message::assistant_turn(text, tool_calls));
        self
    }

    /// Record tool observations, one message per call.
    pub fn with_tool_results(mut self, results: Vec<(String, ToolResult)>) -> Self {
        self.messages
            .extend(results.into_iter().map(|(call_id, result)| {
                Message::tool_result(call_id, result.to_content(), !result.success)
            }));
        self
    }

    pub fn with_user_message(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

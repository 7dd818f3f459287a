use crate::client::Backend;
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

pub const NO_INFORMATION_REPLY: &str = "I don't have enough information on that.";
pub const ERROR_REPLY: &str = "An error occurred. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Append-only chat history with the location's scraped knowledge.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(Sender::User, text));
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(Sender::Bot, text));
    }
}

/// Ask the backend one chat question and produce the bot's reply text.
///
/// Never fails: backend errors become the inline error reply.
pub async fn bot_reply(backend: &dyn Backend, session: &SessionId, question: &str) -> String {
    match backend.analyze_data(session, question).await {
        Ok(response) => response
            .response
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_INFORMATION_REPLY.to_string()),
        Err(e) => {
            error!(error = %e, "Error fetching chat response");
            ERROR_REPLY.to_string()
        }
    }
}

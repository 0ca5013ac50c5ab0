//! Transport-neutral inbound events and outbound replies.

use program_advisor_core::{EventId, TopicId, UserId};
use serde::{Deserialize, Serialize};

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Start or restart the conversation.
    Start,
    /// Choose a topic from the menu.
    SelectTopic { topic_id: TopicId },
    /// Press a quick-question button.
    QuickQuestion { question_id: String },
    /// Type a message.
    FreeText { text: String },
}

impl EventKind {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectTopic { .. } => "select_topic",
            Self::QuickQuestion { .. } => "quick_question",
            Self::FreeText { .. } => "free_text",
        }
    }

    /// Returns true for events that may wait on the model.
    #[must_use]
    pub fn asks_question(&self) -> bool {
        matches!(self, Self::QuickQuestion { .. } | Self::FreeText { .. })
    }
}

/// One inbound event from a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// The sending user.
    pub user_id: UserId,
    /// What happened.
    pub kind: EventKind,
    /// Transport handle needed to acknowledge the event, if any.
    pub ack_token: Option<String>,
}

impl InboundEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(user_id: UserId, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            kind,
            ack_token: None,
        }
    }

    /// Attaches the transport acknowledgement handle.
    #[must_use]
    pub fn with_ack_token(mut self, token: impl Into<String>) -> Self {
        self.ack_token = Some(token.into());
        self
    }
}

/// Semantic keyboards; the transport decides how to render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyboard {
    /// One button per catalog topic.
    TopicMenu,
    /// One button per quick question.
    QuickQuestions,
}

/// A message sent back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message text.
    pub text: String,
    /// Optional keyboard shown with the message.
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    /// Creates a plain text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Attaches a keyboard.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// The single reply produced for an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Recipient.
    pub user_id: UserId,
    /// Messages in send order. May be empty for a bare acknowledgement.
    pub messages: Vec<OutboundMessage>,
    /// Short notice attached to the acknowledgement.
    pub acknowledgement: Option<String>,
}

impl Reply {
    /// Creates an empty reply that only acknowledges the event.
    #[must_use]
    pub fn acknowledge(user_id: UserId) -> Self {
        Self {
            user_id,
            messages: Vec::new(),
            acknowledgement: None,
        }
    }

    /// Creates a reply with one message.
    #[must_use]
    pub fn message(user_id: UserId, message: OutboundMessage) -> Self {
        Self::acknowledge(user_id).with_message(message)
    }

    /// Appends a message.
    #[must_use]
    pub fn with_message(mut self, message: OutboundMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the acknowledgement notice.
    #[must_use]
    pub fn with_acknowledgement(mut self, notice: impl Into<String>) -> Self {
        self.acknowledgement = Some(notice.into());
        self
    }

    /// Returns message texts, for logs and assertions.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }
}

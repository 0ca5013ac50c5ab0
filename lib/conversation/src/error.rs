//! Error types for the conversation crate.
//!
//! - `SessionError`: rejected session updates
//! - `AnswerError`: terminal failures of answering one question
//! - `DeliveryError`: the transport could not deliver a reply

use crate::answer::AnswerStage;
use program_advisor_core::TopicId;
use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The topic is not part of the static catalog.
    UnknownTopic { topic: TopicId },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic { topic } => write!(f, "unknown topic: {topic}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Terminal failures of answering a question.
///
/// All of these are converted into a single user-visible reply by the
/// router; none of them is fatal for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    /// The user has not chosen a topic yet.
    NoTopicSelected,
    /// The topic's knowledge could not be loaded.
    KnowledgeUnavailable { topic: TopicId },
    /// The model call failed or produced no usable text.
    ModelUnavailable { reason: String },
}

impl AnswerError {
    /// Returns the stage the request terminated in.
    #[must_use]
    pub fn stage(&self) -> AnswerStage {
        match self {
            Self::NoTopicSelected => AnswerStage::AwaitingTopic,
            Self::KnowledgeUnavailable { .. } => AnswerStage::LoadingKnowledge,
            Self::ModelUnavailable { .. } => AnswerStage::Invoking,
        }
    }

    /// Returns true for failures the user can fix by choosing again.
    #[must_use]
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::NoTopicSelected)
    }
}

impl fmt::Display for AnswerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTopicSelected => write!(f, "no topic selected"),
            Self::KnowledgeUnavailable { topic } => {
                write!(f, "knowledge unavailable for topic '{topic}'")
            }
            Self::ModelUnavailable { reason } => write!(f, "model unavailable: {reason}"),
        }
    }
}

impl std::error::Error for AnswerError {}

/// Errors from delivering a reply through the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The transport rejected or failed to send the reply.
    SendFailed { reason: String },
    /// The callback acknowledgement failed.
    AcknowledgeFailed { reason: String },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed { reason } => write!(f, "failed to send reply: {reason}"),
            Self::AcknowledgeFailed { reason } => {
                write!(f, "failed to acknowledge event: {reason}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

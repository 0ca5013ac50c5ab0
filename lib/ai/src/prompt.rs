//! Grounded prompt building.
//!
//! The knowledge and the question travel as two separate messages: a
//! system message framing the serialized knowledge as the only allowed
//! source, and a user message holding the question exactly as received.

use crate::backend::Content;
use program_advisor_knowledge::KnowledgeDocument;
use serde::{Deserialize, Serialize};

/// Preamble used when none is configured.
pub const DEFAULT_PREAMBLE: &str = "Ты — бот-консультант по магистратуре Университета ИТМО. \
                                    Отвечай только на основе следующего JSON:";

/// The two-part prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    /// Preamble plus serialized knowledge.
    pub context: Content,
    /// The question, byte-for-byte.
    pub question: Content,
}

impl PromptPayload {
    /// Returns the parts in send order.
    #[must_use]
    pub fn to_contents(&self) -> Vec<Content> {
        vec![self.context.clone(), self.question.clone()]
    }
}

/// Builds grounded prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PREAMBLE)
    }
}

impl PromptBuilder {
    /// Creates a builder with a custom preamble.
    #[must_use]
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Returns the configured preamble.
    #[must_use]
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Builds the payload for a question against a knowledge document.
    #[must_use]
    pub fn build(&self, knowledge: &KnowledgeDocument, question: &str) -> PromptPayload {
        let context = format!("{}\n\n{}", self.preamble, knowledge.to_json_string());
        PromptPayload {
            context: Content::system(context),
            question: Content::user(question),
        }
    }
}

//! LLM backend abstraction.
//!
//! The bot talks to its model through this one call: an ordered list of
//! role-tagged messages in, a list of candidate texts out.

use crate::error::LlmError;
use async_trait::async_trait;
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and grounding context.
    System,
    /// User/human message.
    User,
    /// Model message.
    Model,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The role of the message sender.
    pub role: Role,
    /// The message text.
    pub text: String,
}

impl Content {
    /// Creates a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// Sampling options for a generate call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Number of candidates to request.
    pub candidate_count: u32,
    /// Temperature for sampling.
    pub temperature: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            candidate_count: 1,
            temperature: 0.6,
        }
    }
}

/// One generated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Generated text.
    pub text: String,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A response from an LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Candidates in provider order.
    pub candidates: Vec<Candidate>,
    /// Model that generated the response.
    pub model: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
}

impl GenerateResponse {
    /// Returns the first candidate's text, unless it is missing or blank.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .map(|c| c.text.as_str())
            .filter(|text| !text.trim().is_empty())
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Trait for LLM backends.
///
/// Implementations make exactly one provider request per call and never
/// retry on their own.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates candidates for the given messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, rejects the
    /// request, or answers with something unparseable.
    async fn generate(
        &self,
        contents: &[Content],
        options: &GenerateOptions,
    ) -> Result<GenerateResponse, Report<LlmError>>;

    /// Returns the provider name.
    fn provider(&self) -> &str;

    /// Returns the model name.
    fn model(&self) -> &str;
}

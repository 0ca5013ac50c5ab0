//! AI primitives for the program-advisor bot.
//!
//! This crate provides:
//!
//! - **LLM Backend**: the provider-neutral `generate` boundary
//! - **Gemini**: the `generateContent` HTTP implementation of that boundary
//! - **Prompt Builder**: two-part prompts that keep answers grounded in a
//!   knowledge document

pub mod backend;
pub mod error;
pub mod gemini;
pub mod prompt;

pub use backend::{
    Candidate, Content, GenerateOptions, GenerateResponse, LlmBackend, Role, TokenUsage,
};
pub use error::LlmError;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::{DEFAULT_PREAMBLE, PromptBuilder, PromptPayload};

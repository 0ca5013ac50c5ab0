//! Telegram bot answering questions about master's programs.
//!
//! The binary wires configuration, the knowledge store, the Gemini backend
//! and the conversation layer to the Telegram Bot API.

pub mod app;
pub mod config;
pub mod error;
pub mod telegram;

//! Core types and utilities for the program-advisor bot.
//!
//! This crate provides the identifiers and error handling foundation shared
//! by the knowledge, AI and conversation crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EventId, ParseIdError, TopicId, UserId};

//! Knowledge base for the program-advisor bot.
//!
//! This crate provides:
//!
//! - **Topic Catalog**: the static set of selectable programs and the
//!   documents that describe each of them
//! - **Knowledge Documents**: ordered JSON mappings with an explicit
//!   last-source-wins merge rule
//! - **Knowledge Store**: all-or-nothing loading of a topic's merged
//!   document, with an optional per-topic cache

pub mod document;
pub mod error;
pub mod store;
pub mod topic;

pub use document::KnowledgeDocument;
pub use error::{CatalogError, KnowledgeError};
pub use store::{FileKnowledgeStore, KnowledgeStore, WarmUpReport};
pub use topic::{Topic, TopicCatalog};

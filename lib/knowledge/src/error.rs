//! Error types for the knowledge crate.
//!
//! Errors are returned wrapped in a rootcause `Report`:
//! - `CatalogError`: Invalid static topic configuration
//! - `KnowledgeError`: Failures loading a topic's knowledge

use program_advisor_core::TopicId;
use std::fmt;
use std::path::PathBuf;

/// Errors from building the topic catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no topics at all.
    Empty,
    /// A topic has a blank id.
    BlankTopicId { title: String },
    /// Two topics share the same id.
    DuplicateTopic { id: TopicId },
    /// A topic lists no source documents.
    NoSources { id: TopicId },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "topic catalog is empty"),
            Self::BlankTopicId { title } => {
                write!(f, "topic '{title}' has a blank id")
            }
            Self::DuplicateTopic { id } => write!(f, "duplicate topic id: {id}"),
            Self::NoSources { id } => {
                write!(f, "topic '{id}' has no source documents")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Errors from loading knowledge for a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// The topic is not part of the catalog.
    UnknownTopic { topic: TopicId },
    /// A source document could not be read.
    ReadFailed { path: PathBuf, reason: String },
    /// A source document is not valid JSON.
    ParseFailed { path: PathBuf, reason: String },
    /// A source document is valid JSON but not an object.
    NotAnObject { path: PathBuf, found: &'static str },
    /// The merged knowledge for the topic has no entries.
    Empty { topic: TopicId },
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic { topic } => {
                write!(f, "no knowledge configured for unknown topic: {topic}")
            }
            Self::ReadFailed { path, reason } => {
                write!(f, "failed to read {}: {reason}", path.display())
            }
            Self::ParseFailed { path, reason } => {
                write!(f, "failed to parse {}: {reason}", path.display())
            }
            Self::NotAnObject { path, found } => {
                write!(
                    f,
                    "{} must hold a JSON object, found {found}",
                    path.display()
                )
            }
            Self::Empty { topic } => {
                write!(f, "knowledge for topic '{topic}' is empty")
            }
        }
    }
}

impl std::error::Error for KnowledgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_display() {
        let err = CatalogError::DuplicateTopic {
            id: TopicId::new("ai"),
        };
        assert!(err.to_string().contains("duplicate"));
        assert!(err.to_string().contains("ai"));
    }

    #[test]
    fn knowledge_error_display_names_path() {
        let err = KnowledgeError::ReadFailed {
            path: PathBuf::from("data/ai_program.json"),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("data/ai_program.json"));
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn not_an_object_display() {
        let err = KnowledgeError::NotAnObject {
            path: PathBuf::from("data/list.json"),
            found: "array",
        };
        assert!(err.to_string().contains("found array"));
    }
}

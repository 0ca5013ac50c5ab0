//! Static topic catalog.
//!
//! A topic is one selectable program. It is backed by one or more JSON
//! documents; the catalog is built once at startup and never mutated.

use crate::error::CatalogError;
use program_advisor_core::TopicId;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A selectable topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic key, used in session state and callback data.
    pub id: TopicId,
    /// Human readable title shown in the selection menu.
    pub title: String,
    /// Source documents in merge order. Later sources win on key collision.
    pub sources: Vec<PathBuf>,
}

impl Topic {
    /// Creates a topic.
    #[must_use]
    pub fn new(
        id: impl Into<TopicId>,
        title: impl Into<String>,
        sources: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

/// The ordered, validated set of topics.
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
    index: HashMap<TopicId, usize>,
}

impl TopicCatalog {
    /// Builds a catalog, keeping the given order.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty, or a topic has a blank id, a duplicate
    /// id, or no sources.
    pub fn new(topics: Vec<Topic>) -> Result<Self, Report<CatalogError>> {
        if topics.is_empty() {
            return Err(CatalogError::Empty.into());
        }

        let mut index = HashMap::with_capacity(topics.len());
        for (position, topic) in topics.iter().enumerate() {
            if topic.id.is_blank() {
                return Err(CatalogError::BlankTopicId {
                    title: topic.title.clone(),
                }
                .into());
            }
            if topic.sources.is_empty() {
                return Err(CatalogError::NoSources {
                    id: topic.id.clone(),
                }
                .into());
            }
            if index.insert(topic.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTopic {
                    id: topic.id.clone(),
                }
                .into());
            }
        }

        Ok(Self { topics, index })
    }

    /// Looks up a topic by id.
    #[must_use]
    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.index.get(id).map(|&position| &self.topics[position])
    }

    /// Returns whether the id names a configured topic.
    #[must_use]
    pub fn contains(&self, id: &TopicId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns topics in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Returns the number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Returns whether the catalog is empty. A built catalog never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

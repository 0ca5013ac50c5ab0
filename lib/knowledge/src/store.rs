//! Knowledge loading.
//!
//! Loading is all-or-nothing per topic: every source must be readable and
//! hold a JSON object, and the merged result must not be empty.

use crate::document::{KnowledgeDocument, json_type_name};
use crate::error::KnowledgeError;
use crate::topic::TopicCatalog;
use async_trait::async_trait;
use program_advisor_core::{Result, TopicId};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Source of merged knowledge per topic.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Loads the merged knowledge document for a topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic is unknown, any source cannot be read
    /// or parsed, or the merged document is empty.
    async fn load(&self, topic: &TopicId) -> Result<Arc<KnowledgeDocument>, KnowledgeError>;

    /// Drops any cached documents so the next load reads storage again.
    fn reload(&self) {}
}

/// Outcome of loading every catalog topic at startup.
#[derive(Debug, Default)]
pub struct WarmUpReport {
    /// Topics that loaded successfully.
    pub loaded: Vec<TopicId>,
    /// Topics that failed, with the rendered error.
    pub failed: Vec<(TopicId, String)>,
}

impl WarmUpReport {
    /// Returns whether every topic loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Knowledge store reading JSON files from disk.
pub struct FileKnowledgeStore {
    catalog: Arc<TopicCatalog>,
    base_dir: PathBuf,
    cache_enabled: bool,
    cache: RwLock<HashMap<TopicId, Arc<KnowledgeDocument>>>,
}

impl FileKnowledgeStore {
    /// Creates a store resolving relative source paths against `base_dir`.
    #[must_use]
    pub fn new(catalog: Arc<TopicCatalog>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            base_dir: base_dir.into(),
            cache_enabled: true,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Enables or disables the per-topic cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Resolves a configured source path.
    #[must_use]
    pub fn resolve(&self, source: &Path) -> PathBuf {
        self.base_dir.join(source)
    }

    /// Loads every catalog topic once, collecting failures.
    pub async fn warm_up(&self) -> WarmUpReport {
        let mut report = WarmUpReport::default();
        for topic in self.catalog.iter() {
            match self.load(&topic.id).await {
                Ok(document) => {
                    debug!(topic = %topic.id, entries = document.len(), "knowledge warmed up");
                    report.loaded.push(topic.id.clone());
                }
                Err(e) => {
                    warn!(topic = %topic.id, error = %e, "knowledge warm-up failed");
                    report.failed.push((topic.id.clone(), e.to_string()));
                }
            }
        }
        report
    }

    /// Returns the number of cached topics.
    #[must_use]
    pub fn cached_topics(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cached(&self, topic: &TopicId) -> Option<Arc<KnowledgeDocument>> {
        if !self.cache_enabled {
            return None;
        }
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
    }

    async fn read_source(&self, path: &Path) -> Result<KnowledgeDocument, KnowledgeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| KnowledgeError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let value: JsonValue =
            serde_json::from_slice(&bytes).map_err(|e| KnowledgeError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let document =
            KnowledgeDocument::from_value(value).map_err(|other| KnowledgeError::NotAnObject {
                path: path.to_path_buf(),
                found: json_type_name(&other),
            })?;

        Ok(document)
    }
}

#[async_trait]
impl KnowledgeStore for FileKnowledgeStore {
    #[instrument(skip(self, topic), fields(topic = %topic))]
    async fn load(&self, topic: &TopicId) -> Result<Arc<KnowledgeDocument>, KnowledgeError> {
        if let Some(document) = self.cached(topic) {
            return Ok(document);
        }

        let sources = self
            .catalog
            .get(topic)
            .map(|t| t.sources.clone())
            .ok_or_else(|| KnowledgeError::UnknownTopic {
                topic: topic.clone(),
            })?;

        let mut documents = Vec::with_capacity(sources.len());
        for source in &sources {
            let path = self.resolve(source);
            let document = self.read_source(&path).await?;
            debug!(path = %path.display(), entries = document.len(), "read knowledge source");
            documents.push(document);
        }

        let merged = KnowledgeDocument::merge_all(documents);
        if merged.is_empty() {
            return Err(KnowledgeError::Empty {
                topic: topic.clone(),
            }
            .into());
        }

        let merged = Arc::new(merged);
        if self.cache_enabled {
            self.cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(topic.clone(), Arc::clone(&merged));
        }

        Ok(merged)
    }

    fn reload(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "knowledge cache cleared");
    }
}

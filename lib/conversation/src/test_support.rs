//! In-memory fakes shared by the conversation tests.

use async_trait::async_trait;
use program_advisor_ai::{
    Candidate, Content, GenerateOptions, GenerateResponse, LlmBackend, LlmError, Role,
};
use program_advisor_core::TopicId;
use program_advisor_knowledge::{
    KnowledgeDocument, KnowledgeError, KnowledgeStore, Topic, TopicCatalog,
};
use rootcause::Report;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn catalog() -> Arc<TopicCatalog> {
    Arc::new(
        TopicCatalog::new(vec![
            Topic::new("ai", "Искусственный интеллект", ["data/ai_program.json"]),
            Topic::new("product", "AI Product", ["data/ai_product.json"]),
            Topic::new(
                "both",
                "Ещё не определился",
                ["data/ai_program.json", "data/ai_product.json"],
            ),
        ])
        .expect("catalog"),
    )
}

/// Knowledge store backed by a map, counting loads.
#[derive(Default)]
pub(crate) struct FakeKnowledge {
    documents: HashMap<TopicId, Arc<KnowledgeDocument>>,
    loads: AtomicUsize,
}

impl FakeKnowledge {
    pub(crate) fn programs() -> Self {
        Self::default()
            .with(
                "ai",
                json!({"program": "Искусственный интеллект", "cost": "599 000 ₽"}),
            )
            .with("product", json!({"program": "AI Product", "cost": "650 000 ₽"}))
    }

    pub(crate) fn with(mut self, topic: &str, value: JsonValue) -> Self {
        let document = KnowledgeDocument::from_value(value).expect("object");
        self.documents
            .insert(TopicId::new(topic), Arc::new(document));
        self
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeStore for FakeKnowledge {
    async fn load(&self, topic: &TopicId) -> Result<Arc<KnowledgeDocument>, Report<KnowledgeError>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let document = self
            .documents
            .get(topic)
            .cloned()
            .ok_or_else(|| KnowledgeError::ReadFailed {
                path: PathBuf::from(format!("data/{topic}.json")),
                reason: "No such file or directory".to_string(),
            })?;
        Ok(document)
    }
}

/// What the scripted backend answers.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Reply(String),
    /// Replies with the system part it was given.
    EchoContext,
    NoCandidates,
    Fail(LlmError),
}

/// LLM backend that records every call.
pub(crate) struct ScriptedBackend {
    script: Script,
    calls: Mutex<Vec<Vec<Content>>>,
}

impl ScriptedBackend {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<Vec<Content>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(
        &self,
        contents: &[Content],
        _options: &GenerateOptions,
    ) -> Result<GenerateResponse, Report<LlmError>> {
        self.calls.lock().unwrap().push(contents.to_vec());

        let candidates = match &self.script {
            Script::Reply(text) => vec![Candidate::new(text.clone())],
            Script::EchoContext => contents
                .iter()
                .filter(|c| c.role == Role::System)
                .map(|c| Candidate::new(c.text.clone()))
                .collect(),
            Script::NoCandidates => Vec::new(),
            Script::Fail(error) => return Err(error.clone().into()),
        };

        Ok(GenerateResponse {
            candidates,
            model: "scripted".to_string(),
            ..Default::default()
        })
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

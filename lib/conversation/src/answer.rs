//! Answering questions against the selected topic's knowledge.
//!
//! Each question runs through a short, linear state machine:
//!
//! 1. `AwaitingTopic`: resolve the session; stop with `NoTopicSelected` if
//!    no topic is chosen
//! 2. `LoadingKnowledge`: load the topic's merged document
//! 3. `BuildingPrompt`: build the two-part grounded prompt
//! 4. `Invoking`: one model call, never retried here
//! 5. `Done`: take the first candidate's text
//!
//! Nothing persistent changes after step 1, so a failure needs no rollback.

use crate::error::AnswerError;
use crate::session::SessionStore;
use program_advisor_ai::{GenerateOptions, LlmBackend, PromptBuilder};
use program_advisor_core::{TopicId, UserId};
use program_advisor_knowledge::KnowledgeStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument, trace};

/// A question asked by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text, already trimmed by the caller.
    pub text: String,
}

impl Question {
    /// Creates a question.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text.
    pub text: String,
    /// Topic whose knowledge grounded the answer.
    pub topic_id: TopicId,
}

/// Stages of answering one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStage {
    /// Resolving the user's topic.
    AwaitingTopic,
    /// Loading the topic's knowledge.
    LoadingKnowledge,
    /// Building the prompt.
    BuildingPrompt,
    /// Waiting for the model.
    Invoking,
    /// Answer extracted.
    Done,
}

impl fmt::Display for AnswerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingTopic => "awaiting_topic",
            Self::LoadingKnowledge => "loading_knowledge",
            Self::BuildingPrompt => "building_prompt",
            Self::Invoking => "invoking",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Orchestrates session, knowledge, prompt and model for one question.
pub struct AnswerService {
    sessions: Arc<SessionStore>,
    knowledge: Arc<dyn KnowledgeStore>,
    llm: Arc<dyn LlmBackend>,
    prompts: PromptBuilder,
    options: GenerateOptions,
}

impl AnswerService {
    /// Creates a service with the default prompt and sampling options.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionStore>,
        knowledge: Arc<dyn KnowledgeStore>,
        llm: Arc<dyn LlmBackend>,
    ) -> Self {
        Self {
            sessions,
            knowledge,
            llm,
            prompts: PromptBuilder::default(),
            options: GenerateOptions::default(),
        }
    }

    /// Replaces the prompt builder.
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Replaces the sampling options.
    #[must_use]
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Answers a question for a user.
    ///
    /// # Errors
    ///
    /// Returns `NoTopicSelected`, `KnowledgeUnavailable` or
    /// `ModelUnavailable`; each is terminal for this question only.
    #[instrument(skip_all, fields(user = %user_id))]
    pub async fn answer(&self, user_id: UserId, question: &Question) -> Result<Answer, AnswerError> {
        enter(AnswerStage::AwaitingTopic);
        let session = self.sessions.touch(user_id);
        let Some(topic) = session.topic_id else {
            debug!("question asked before a topic was selected");
            return Err(AnswerError::NoTopicSelected);
        };

        enter(AnswerStage::LoadingKnowledge);
        let knowledge = self.knowledge.load(&topic).await.map_err(|report| {
            error!(topic = %topic, error = %report, "knowledge unavailable");
            AnswerError::KnowledgeUnavailable {
                topic: topic.clone(),
            }
        })?;
        if knowledge.is_empty() {
            error!(topic = %topic, "knowledge is empty");
            return Err(AnswerError::KnowledgeUnavailable { topic });
        }

        enter(AnswerStage::BuildingPrompt);
        let payload = self.prompts.build(&knowledge, &question.text);

        enter(AnswerStage::Invoking);
        let response = self
            .llm
            .generate(&payload.to_contents(), &self.options)
            .await
            .map_err(|report| {
                error!(
                    topic = %topic,
                    provider = self.llm.provider(),
                    error = %report,
                    "model call failed"
                );
                AnswerError::ModelUnavailable {
                    reason: report.to_string(),
                }
            })?;

        let Some(text) = response.first_text() else {
            error!(
                topic = %topic,
                provider = self.llm.provider(),
                candidates = response.candidates.len(),
                "model returned no usable candidate"
            );
            return Err(AnswerError::ModelUnavailable {
                reason: "empty response".to_string(),
            });
        };

        enter(AnswerStage::Done);
        debug!(topic = %topic, tokens = response.usage.total(), "question answered");
        Ok(Answer {
            text: text.to_string(),
            topic_id: topic,
        })
    }
}

fn enter(stage: AnswerStage) {
    trace!(%stage, "answer stage");
}

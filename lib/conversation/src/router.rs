//! Routing of inbound events.
//!
//! Every event produces exactly one `Reply`, including the failure paths,
//! so the transport can always acknowledge what it received.

use crate::answer::{AnswerService, Question};
use crate::error::AnswerError;
use crate::event::{EventKind, InboundEvent, Keyboard, OutboundMessage, Reply};
use crate::quick::QuickQuestionCatalog;
use crate::session::SessionStore;
use program_advisor_core::{TopicId, UserId};
use program_advisor_knowledge::TopicCatalog;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const GREETING: &str =
    "👋 Привет! Я бот-консультант по магистратуре ИТМО.\n\nВыбери образовательную программу:";
const UNKNOWN_TOPIC: &str = "❌ Неизвестная программа";
const CHOOSE_TOPIC_FIRST: &str = "⛔ Сначала выбери программу:";
const EMPTY_QUESTION: &str = "✍ Напиши вопрос текстом или выбери из популярных.";
const KNOWLEDGE_UNAVAILABLE: &str = "⚠ Не удалось загрузить данные о программе.";
const MODEL_UNAVAILABLE: &str = "⚠ Ошибка при обращении к модели. Попробуй ещё раз позже.";

/// Maps inbound events onto session updates and answers.
pub struct DispatchRouter {
    sessions: Arc<SessionStore>,
    answers: Arc<AnswerService>,
    topics: Arc<TopicCatalog>,
    quick_questions: Arc<QuickQuestionCatalog>,
}

impl DispatchRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionStore>,
        answers: Arc<AnswerService>,
        topics: Arc<TopicCatalog>,
        quick_questions: Arc<QuickQuestionCatalog>,
    ) -> Self {
        Self {
            sessions,
            answers,
            topics,
            quick_questions,
        }
    }

    /// Handles one event and returns its reply.
    #[instrument(skip_all, fields(event = %event.id, user = %event.user_id, kind = event.kind.name()))]
    pub async fn handle(&self, event: &InboundEvent) -> Reply {
        let user = event.user_id;
        match &event.kind {
            EventKind::Start => self.start(user),
            EventKind::SelectTopic { topic_id } => self.select_topic(user, topic_id),
            EventKind::QuickQuestion { question_id } => {
                self.quick_question(user, question_id).await
            }
            EventKind::FreeText { text } => self.free_text(user, text).await,
        }
    }

    fn start(&self, user: UserId) -> Reply {
        self.sessions.clear(user);
        Reply::message(
            user,
            OutboundMessage::text(GREETING).with_keyboard(Keyboard::TopicMenu),
        )
    }

    fn select_topic(&self, user: UserId, topic_id: &TopicId) -> Reply {
        if let Err(report) = self.sessions.set_topic(user, topic_id) {
            debug!(topic = %topic_id, error = %report, "topic selection rejected");
            return Reply::acknowledge(user).with_acknowledgement(UNKNOWN_TOPIC);
        }

        let title = self
            .topics
            .get(topic_id)
            .map_or(topic_id.as_str(), |t| t.title.as_str());
        info!(topic = %topic_id, "topic selected");
        Reply::message(
            user,
            OutboundMessage::text(format!(
                "✅ Программа выбрана: {title}\n\nЗадай вопрос или выбери из популярных:"
            ))
            .with_keyboard(Keyboard::QuickQuestions),
        )
    }

    async fn quick_question(&self, user: UserId, question_id: &str) -> Reply {
        let Some(text) = self.quick_questions.get(question_id) else {
            debug!(question_id, "unknown quick question ignored");
            return Reply::acknowledge(user);
        };

        let echo = OutboundMessage::text(format!("❓ {text}"));
        let mut reply = Reply::message(user, echo);
        reply
            .messages
            .push(self.ask(user, Question::new(text)).await);
        reply
    }

    async fn free_text(&self, user: UserId, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::message(user, OutboundMessage::text(EMPTY_QUESTION));
        }
        Reply::message(user, self.ask(user, Question::new(text)).await)
    }

    async fn ask(&self, user: UserId, question: Question) -> OutboundMessage {
        match self.answers.answer(user, &question).await {
            Ok(answer) => OutboundMessage::text(answer.text),
            Err(error) => failure_message(&error),
        }
    }
}

/// Converts an answer failure into the user-visible message.
fn failure_message(error: &AnswerError) -> OutboundMessage {
    match error {
        AnswerError::NoTopicSelected => {
            OutboundMessage::text(CHOOSE_TOPIC_FIRST).with_keyboard(Keyboard::TopicMenu)
        }
        AnswerError::KnowledgeUnavailable { .. } => OutboundMessage::text(KNOWLEDGE_UNAVAILABLE),
        AnswerError::ModelUnavailable { .. } => OutboundMessage::text(MODEL_UNAVAILABLE),
    }
}

//! Telegram Bot API transport.
//!
//! Long-polls `getUpdates`, turns updates into [`InboundEvent`]s and
//! delivers [`Reply`]s with `sendMessage` and `answerCallbackQuery`.
//! A `typing` chat action is sent while a question is being answered.
//! Chats are private, so a user's id doubles as the chat id.

use crate::config::TelegramConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use program_advisor_conversation::{
    DeliveryError, Dispatcher, EventKind, InboundEvent, Keyboard, OutboundMessage,
    QuickQuestionCatalog, Reply, ReplySink,
};
use program_advisor_core::{TopicId, UserId};
use program_advisor_knowledge::TopicCatalog;
use reqwest::Client;
use rootcause::prelude::Report;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Maximum characters in one Telegram message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const TOPIC_PREFIX: &str = "program:";
const QUICK_PREFIX: &str = "quick:";
const POLL_BACKOFF: Duration = Duration::from_secs(5);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic id; the next poll starts after it.
    pub update_id: i64,
    /// A new incoming message.
    #[serde(default)]
    pub message: Option<Message>,
    /// An inline keyboard button press.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// An incoming chat message. Only the fields the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Sender; absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Chat the message was sent in.
    pub chat: Chat,
    /// Message text; absent for stickers, photos and the like.
    #[serde(default)]
    pub text: Option<String>,
}

/// A Telegram user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Numeric user id.
    pub id: i64,
}

/// A Telegram chat.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Numeric chat id. Equals the user id in private chats.
    pub id: i64,
}

/// A press of an inline keyboard button.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Id to pass to `answerCallbackQuery`.
    pub id: String,
    /// User who pressed the button.
    pub from: User,
    /// The button's `callback_data`.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    /// Button rows, top to bottom.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A button that sends `callback_data` back when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    /// Label shown to the user.
    pub text: String,
    /// Opaque data returned in the callback query.
    pub callback_data: String,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendChatAction {
    chat_id: i64,
    action: &'static str,
}

// ============================================================================
// Update parsing
// ============================================================================

/// What an update means to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A routable event.
    Event(InboundEvent),
    /// A button press with data the bot does not understand.
    UnknownCallback { callback_id: String },
    /// Nothing the bot reacts to.
    Ignored,
}

/// Parses callback data into an event kind.
#[must_use]
pub fn parse_callback_data(data: &str) -> Option<EventKind> {
    if let Some(id) = data.strip_prefix(TOPIC_PREFIX) {
        return Some(EventKind::SelectTopic {
            topic_id: TopicId::new(id),
        });
    }
    data.strip_prefix(QUICK_PREFIX)
        .map(|id| EventKind::QuickQuestion {
            question_id: id.to_string(),
        })
}

fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    command == "/start" || command.starts_with("/start@")
}

/// Converts an update into what the bot should do with it.
#[must_use]
pub fn parse_update(update: Update) -> Inbound {
    if let Some(query) = update.callback_query {
        let user_id = UserId::new(query.from.id);
        return match query.data.as_deref().and_then(parse_callback_data) {
            Some(kind) => Inbound::Event(InboundEvent::new(user_id, kind).with_ack_token(query.id)),
            None => Inbound::UnknownCallback {
                callback_id: query.id,
            },
        };
    }

    let Some(message) = update.message else {
        return Inbound::Ignored;
    };
    let Some(text) = message.text else {
        return Inbound::Ignored;
    };
    let user_id = UserId::new(message.from.map_or(message.chat.id, |u| u.id));
    let kind = if is_start_command(&text) {
        EventKind::Start
    } else {
        EventKind::FreeText { text }
    };
    Inbound::Event(InboundEvent::new(user_id, kind))
}

// ============================================================================
// Rendering
// ============================================================================

/// Splits text into chunks of at most `limit` characters, preferring to
/// break after a newline.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some((end, _)) = rest.char_indices().nth(limit) else {
            chunks.push(rest.to_string());
            break;
        };
        let cut = rest[..end]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map_or(end, |i| i + 1);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

/// Renders a semantic keyboard as an inline keyboard, one button per row.
#[must_use]
pub fn render_keyboard(
    keyboard: Keyboard,
    topics: &TopicCatalog,
    quick_questions: &QuickQuestionCatalog,
) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = match keyboard {
        Keyboard::TopicMenu => topics
            .iter()
            .map(|topic| InlineKeyboardButton {
                text: topic.title.clone(),
                callback_data: format!("{TOPIC_PREFIX}{}", topic.id),
            })
            .collect(),
        Keyboard::QuickQuestions => quick_questions
            .iter()
            .map(|question| InlineKeyboardButton {
                text: question.text.clone(),
                callback_data: format!("{QUICK_PREFIX}{}", question.id),
            })
            .collect(),
    };
    InlineKeyboardMarkup {
        inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Telegram transport: polls for updates and delivers replies.
pub struct TelegramTransport {
    client: Client,
    api_base: String,
    token: String,
    poll_timeout_seconds: u64,
    topics: Arc<TopicCatalog>,
    quick_questions: Arc<QuickQuestionCatalog>,
}

impl TelegramTransport {
    /// Creates a transport.
    ///
    /// # Errors
    ///
    /// Returns `ClientBuild` if the HTTP client cannot be created.
    pub fn new(
        config: &TelegramConfig,
        topics: Arc<TopicCatalog>,
        quick_questions: Arc<QuickQuestionCatalog>,
    ) -> Result<Self, Report<TransportError>> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.poll_timeout_seconds + 15))
            .build()
            .map_err(|e| TransportError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_timeout_seconds: config.poll_timeout_seconds,
            topics,
            quick_questions,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    /// Calls a Bot API method. The token never appears in returned errors.
    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, Report<TransportError>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                method,
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let api: ApiResponse<T> =
            response
                .json()
                .await
                .map_err(|e| TransportError::RequestFailed {
                    method,
                    reason: format!("HTTP {status}: {}", e.without_url()),
                })?;

        if !api.ok {
            return Err(TransportError::Api {
                method,
                description: api.description.unwrap_or_else(|| status.to_string()),
            }
            .into());
        }
        let result = api.result.ok_or(TransportError::Api {
            method,
            description: "response has no result".to_string(),
        })?;
        Ok(result)
    }

    /// Fetches updates after `offset`, waiting up to the poll timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, Report<TransportError>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout_seconds,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &body).await
    }

    #[instrument(skip(self, message), fields(chars = message.text.chars().count()))]
    async fn send_message(&self, chat_id: i64, message: &OutboundMessage) -> Result<(), Report<TransportError>> {
        let markup = message
            .keyboard
            .map(|k| render_keyboard(k, &self.topics, &self.quick_questions));
        let chunks = split_message(&message.text, MAX_MESSAGE_CHARS);
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            let body = SendMessage {
                chat_id,
                text: chunk,
                reply_markup: if i == last { markup.as_ref() } else { None },
            };
            let _: IgnoredAny = self.call("sendMessage", &body).await?;
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), Report<TransportError>> {
        let body = AnswerCallbackQuery {
            callback_query_id: callback_id,
            text,
        };
        let _: IgnoredAny = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), Report<TransportError>> {
        let body = SendChatAction {
            chat_id,
            action: "typing",
        };
        let _: IgnoredAny = self.call("sendChatAction", &body).await?;
        Ok(())
    }

    /// Polls forever, submitting events to the dispatcher.
    pub async fn run(&self, dispatcher: &Dispatcher) {
        let mut offset = None;
        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(report) => {
                    warn!(error = %report, "polling failed, backing off");
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                match parse_update(update) {
                    Inbound::Event(event) => {
                        debug!(event = %event.id, user = %event.user_id, kind = event.kind.name(), "event received");
                        dispatcher.submit(event);
                    }
                    Inbound::UnknownCallback { callback_id } => {
                        debug!("unknown callback data dropped");
                        if let Err(report) = self.answer_callback(&callback_id, None).await {
                            warn!(error = %report, "failed to acknowledge callback");
                        }
                    }
                    Inbound::Ignored => {}
                }
            }
        }
    }
}

#[async_trait]
impl ReplySink for TelegramTransport {
    async fn started(&self, event: &InboundEvent) {
        if let Err(report) = self.send_typing(event.user_id.get()).await {
            debug!(event = %event.id, error = %report, "typing indicator not sent");
        }
    }

    /// Sends every message, then answers the callback query even when a
    /// send failed, so the client never keeps a spinning button. Returns
    /// the first failure.
    async fn deliver(&self, event: &InboundEvent, reply: Reply) -> Result<(), Report<DeliveryError>> {
        let chat_id = reply.user_id.get();
        let mut first_error = None;
        for message in &reply.messages {
            if let Err(report) = self.send_message(chat_id, message).await {
                warn!(event = %event.id, error = %report, "failed to send message");
                first_error.get_or_insert(DeliveryError::SendFailed {
                    reason: report.to_string(),
                });
            }
        }

        if let Some(callback_id) = &event.ack_token {
            let acknowledged = self
                .answer_callback(callback_id, reply.acknowledgement.as_deref())
                .await;
            if let Err(report) = acknowledged {
                first_error.get_or_insert(DeliveryError::AcknowledgeFailed {
                    reason: report.to_string(),
                });
            }
        }

        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use program_advisor_conversation::QuickQuestion;
    use program_advisor_knowledge::Topic;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn start_command_becomes_start() {
        let inbound = parse_update(update(json!({
            "update_id": 1,
            "message": {"from": {"id": 42}, "chat": {"id": 42}, "text": "/start"}
        })));
        match inbound {
            Inbound::Event(event) => {
                assert_eq!(event.user_id, UserId::new(42));
                assert_eq!(event.kind, EventKind::Start);
                assert!(event.ack_token.is_none());
            }
            other => panic!("expected event, got {other:?}"),
        }

        assert!(is_start_command("/start@itmo_advisor_bot"));
        assert!(is_start_command("/start deep-link"));
        assert!(!is_start_command("/started"));
    }

    #[test]
    fn other_text_becomes_free_text() {
        let inbound = parse_update(update(json!({
            "update_id": 2,
            "message": {"from": {"id": 7}, "chat": {"id": 7}, "text": "Как поступить?"}
        })));
        let Inbound::Event(event) = inbound else {
            panic!("expected event");
        };
        assert_eq!(
            event.kind,
            EventKind::FreeText {
                text: "Как поступить?".to_string()
            }
        );
    }

    #[test]
    fn non_text_messages_are_ignored() {
        let inbound = parse_update(update(json!({
            "update_id": 3,
            "message": {"from": {"id": 7}, "chat": {"id": 7}}
        })));
        assert_eq!(inbound, Inbound::Ignored);
        assert_eq!(parse_update(update(json!({"update_id": 4}))), Inbound::Ignored);
    }

    #[test]
    fn callbacks_carry_ack_token() {
        let inbound = parse_update(update(json!({
            "update_id": 5,
            "callback_query": {"id": "cb-9", "from": {"id": 7}, "data": "program:ai"}
        })));
        let Inbound::Event(event) = inbound else {
            panic!("expected event");
        };
        assert_eq!(event.ack_token.as_deref(), Some("cb-9"));
        assert_eq!(
            event.kind,
            EventKind::SelectTopic {
                topic_id: TopicId::new("ai")
            }
        );
    }

    #[test]
    fn unknown_callback_data_is_flagged() {
        let inbound = parse_update(update(json!({
            "update_id": 6,
            "callback_query": {"id": "cb-1", "from": {"id": 7}, "data": "vote:yes"}
        })));
        assert_eq!(
            inbound,
            Inbound::UnknownCallback {
                callback_id: "cb-1".to_string()
            }
        );
    }

    #[test]
    fn callback_data_prefixes() {
        assert_eq!(
            parse_callback_data("quick:cost"),
            Some(EventKind::QuickQuestion {
                question_id: "cost".to_string()
            })
        );
        assert_eq!(parse_callback_data("cost"), None);
    }

    #[test]
    fn short_text_is_not_split() {
        assert_eq!(split_message("привет", 4096), vec!["привет"]);
        assert_eq!(split_message("", 4096), vec![""]);
    }

    #[test]
    fn long_text_splits_on_char_boundaries() {
        let text = "я".repeat(10);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks, vec!["яяяя", "яяяя", "яя"]);
    }

    #[test]
    fn split_prefers_newlines() {
        let chunks = split_message("ab\ncdef", 5);
        assert_eq!(chunks, vec!["ab\n", "cdef"]);
        assert_eq!(chunks.concat(), "ab\ncdef");
    }

    #[test]
    fn keyboards_use_callback_prefixes() {
        let topics = TopicCatalog::new(vec![
            Topic::new("ai", "Искусственный интеллект", ["a.json"]),
            Topic::new("product", "AI Product", ["b.json"]),
        ])
        .unwrap();
        let quick = QuickQuestionCatalog::new(vec![QuickQuestion::new(
            "cost",
            "Сколько стоит обучение?",
        )]);

        let menu = render_keyboard(Keyboard::TopicMenu, &topics, &quick);
        assert_eq!(menu.inline_keyboard.len(), 2);
        assert_eq!(menu.inline_keyboard[1][0].callback_data, "program:product");
        assert_eq!(menu.inline_keyboard[1][0].text, "AI Product");

        let questions = render_keyboard(Keyboard::QuickQuestions, &topics, &quick);
        assert_eq!(questions.inline_keyboard[0][0].callback_data, "quick:cost");
        assert_eq!(
            parse_callback_data(&questions.inline_keyboard[0][0].callback_data),
            Some(EventKind::QuickQuestion {
                question_id: "cost".to_string()
            })
        );
    }

    #[test]
    fn send_message_body_shape() {
        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: "AI Product".to_string(),
                callback_data: "program:product".to_string(),
            }]],
        };
        let body = SendMessage {
            chat_id: 7,
            text: "hi",
            reply_markup: Some(&markup),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "chat_id": 7,
                "text": "hi",
                "reply_markup": {"inline_keyboard": [[{"text": "AI Product", "callback_data": "program:product"}]]}
            })
        );

        let plain = SendMessage {
            chat_id: 7,
            text: "hi",
            reply_markup: None,
        };
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            json!({"chat_id": 7, "text": "hi"})
        );
    }

    fn transport_for(server: &MockServer) -> TelegramTransport {
        let config = TelegramConfig {
            token: "t".to_string(),
            api_base: server.uri(),
            poll_timeout_seconds: 1,
        };
        let topics = TopicCatalog::new(vec![Topic::new(
            "ai",
            "Искусственный интеллект",
            ["a.json"],
        )])
        .unwrap();
        let quick = QuickQuestionCatalog::new(vec![QuickQuestion::new(
            "cost",
            "Сколько стоит обучение?",
        )]);
        TelegramTransport::new(&config, Arc::new(topics), Arc::new(quick)).unwrap()
    }

    fn quick_question(user: UserId) -> InboundEvent {
        InboundEvent::new(
            user,
            EventKind::QuickQuestion {
                question_id: "cost".to_string(),
            },
        )
        .with_ack_token("cb-7")
    }

    async fn bodies(server: &MockServer, method_path: &str) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|request| request.url.path() == method_path)
            .map(|request| request.body_json::<Value>().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn deliver_sends_messages_then_acknowledges() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 1}})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/answerCallbackQuery"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let user = UserId::new(42);
        let reply = Reply::message(user, OutboundMessage::text("❓ Сколько стоит обучение?"))
            .with_message(OutboundMessage::text("599 000 ₽ в год").with_keyboard(Keyboard::QuickQuestions))
            .with_acknowledgement("ok");
        transport_for(&server)
            .deliver(&quick_question(user), reply)
            .await
            .unwrap();

        let sent = bodies(&server, "/bott/sendMessage").await;
        assert_eq!(sent[0], json!({"chat_id": 42, "text": "❓ Сколько стоит обучение?"}));
        assert_eq!(sent[1]["text"], "599 000 ₽ в год");
        assert_eq!(
            sent[1]["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "quick:cost"
        );
        let acks = bodies(&server, "/bott/answerCallbackQuery").await;
        assert_eq!(acks, vec![json!({"callback_query_id": "cb-7", "text": "ok"})]);
    }

    #[tokio::test]
    async fn deliver_acknowledges_even_when_send_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"ok": false, "description": "Bad Request: chat not found"})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/answerCallbackQuery"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let user = UserId::new(42);
        let reply = Reply::message(user, OutboundMessage::text("one"))
            .with_message(OutboundMessage::text("two"));
        let err = transport_for(&server)
            .deliver(&quick_question(user), reply)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("failed to send reply"), "{message}");
        assert!(message.contains("chat not found"), "{message}");
    }

    #[tokio::test]
    async fn deliver_reports_failed_acknowledgement() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/answerCallbackQuery"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"ok": false, "description": "Bad Request: query is too old"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let user = UserId::new(42);
        let err = transport_for(&server)
            .deliver(&quick_question(user), Reply::acknowledge(user))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to acknowledge event"));
    }

    #[tokio::test]
    async fn started_sends_typing_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendChatAction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        transport_for(&server)
            .started(&quick_question(UserId::new(42)))
            .await;

        let actions = bodies(&server, "/bott/sendChatAction").await;
        assert_eq!(actions, vec![json!({"chat_id": 42, "action": "typing"})]);
    }

    #[tokio::test]
    async fn failed_typing_action_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendChatAction"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        transport_for(&server)
            .started(&quick_question(UserId::new(42)))
            .await;
    }
}

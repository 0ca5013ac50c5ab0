//! Conversation layer for program-advisor.
//!
//! This crate provides:
//!
//! - **Sessions**: each user's selected topic
//! - **Answering**: knowledge-grounded answers to one question at a time
//! - **Routing**: mapping inbound events to replies
//! - **Dispatch**: per-user ordered handling of events

pub mod answer;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod quick;
pub mod router;
pub mod session;

#[cfg(test)]
mod test_support;

pub use answer::{Answer, AnswerService, AnswerStage, Question};
pub use dispatch::{Dispatcher, ReplySink};
pub use error::{AnswerError, DeliveryError, SessionError};
pub use event::{EventKind, InboundEvent, Keyboard, OutboundMessage, Reply};
pub use quick::{QuickQuestion, QuickQuestionCatalog};
pub use router::DispatchRouter;
pub use session::{Session, SessionStore};

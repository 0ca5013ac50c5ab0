//! Per-user session state.
//!
//! The `SessionStore` is the only owner of sessions. It is shared by handle
//! between the router and the answer service; access is in-memory and never
//! held across an await point.

use crate::error::SessionError;
use chrono::{DateTime, Duration, Utc};
use program_advisor_core::{TopicId, UserId};
use program_advisor_knowledge::TopicCatalog;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A user's conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user who owns this session.
    pub user_id: UserId,
    /// Selected topic, unset until the user chooses one.
    pub topic_id: Option<TopicId>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last active.
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session with no topic.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            topic_id: None,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Returns true once a topic has been chosen.
    #[must_use]
    pub fn has_topic(&self) -> bool {
        self.topic_id.is_some()
    }

    fn select_topic(&mut self, topic: TopicId) {
        self.topic_id = Some(topic);
        self.touch();
    }

    fn clear_topic(&mut self) {
        self.topic_id = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

/// Thread-safe map from user to session.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<TopicCatalog>,
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl SessionStore {
    /// Creates an empty store validating topics against `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<TopicCatalog>) -> Self {
        Self {
            catalog,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the user's session, creating it if absent.
    pub fn get(&self, user_id: UserId) -> Session {
        if let Some(session) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
        {
            return session.clone();
        }

        self.update(user_id, |_| {})
    }

    /// Selects a topic for the user.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTopic` if the topic is not in the catalog; the
    /// session is left untouched in that case.
    pub fn set_topic(
        &self,
        user_id: UserId,
        topic: &TopicId,
    ) -> Result<Session, Report<SessionError>> {
        if !self.catalog.contains(topic) {
            return Err(SessionError::UnknownTopic {
                topic: topic.clone(),
            }
            .into());
        }

        Ok(self.update(user_id, |session| session.select_topic(topic.clone())))
    }

    /// Unsets the user's topic.
    pub fn clear(&self, user_id: UserId) -> Session {
        self.update(user_id, Session::clear_topic)
    }

    /// Marks the session active, returning it.
    pub fn touch(&self, user_id: UserId) -> Session {
        self.update(user_id, Session::touch)
    }

    /// Removes sessions idle for longer than `max_idle`.
    ///
    /// Returns the number of removed sessions.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active_at >= cutoff);
        before - sessions.len()
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, user_id: UserId, apply: impl FnOnce(&mut Session)) -> Session {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .entry(user_id)
            .or_insert_with(|| Session::new(user_id));
        apply(session);
        session.clone()
    }
}

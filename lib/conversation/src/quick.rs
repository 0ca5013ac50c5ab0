//! Quick questions: a fixed catalog of common questions, keyed by short id.

use serde::{Deserialize, Serialize};

/// A predefined question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickQuestion {
    /// Short id carried in button payloads.
    pub id: String,
    /// The question text sent to the model.
    pub text: String,
}

impl QuickQuestion {
    /// Creates a quick question.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ordered catalog of quick questions.
#[derive(Debug, Clone, Default)]
pub struct QuickQuestionCatalog {
    questions: Vec<QuickQuestion>,
}

impl QuickQuestionCatalog {
    /// Creates a catalog. Later duplicates of an id are ignored.
    #[must_use]
    pub fn new(questions: Vec<QuickQuestion>) -> Self {
        let mut unique: Vec<QuickQuestion> = Vec::with_capacity(questions.len());
        for question in questions {
            if !unique.iter().any(|q| q.id == question.id) {
                unique.push(question);
            }
        }
        Self { questions: unique }
    }

    /// Returns the question text for an id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.text.as_str())
    }

    /// Returns questions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &QuickQuestion> {
        self.questions.iter()
    }

    /// Returns the number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

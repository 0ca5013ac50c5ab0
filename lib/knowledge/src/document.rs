//! Knowledge documents.
//!
//! A document is an insertion-ordered JSON object. Merging is explicit:
//! entries of the later document replace entries of the earlier one with
//! the same key, keeping the earlier key's position; new keys are appended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A string-keyed JSON mapping used to ground answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeDocument(Map<String, JsonValue>);

impl KnowledgeDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON value, returning the value back if it is not an object.
    pub fn from_value(value: JsonValue) -> Result<Self, JsonValue> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }

    /// Merges `other` into `self`; `other` wins on key collision.
    pub fn merge(&mut self, other: KnowledgeDocument) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Merges documents in order, later documents winning.
    #[must_use]
    pub fn merge_all(documents: impl IntoIterator<Item = KnowledgeDocument>) -> Self {
        documents
            .into_iter()
            .fold(Self::new(), |mut merged, document| {
                merged.merge(document);
                merged
            })
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Inserts an entry, returning the replaced value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.0.insert(key.into(), value)
    }

    /// Returns keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes to compact JSON, keeping non-ASCII text as is.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        JsonValue::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, JsonValue>> for KnowledgeDocument {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<KnowledgeDocument> for JsonValue {
    fn from(document: KnowledgeDocument) -> Self {
        JsonValue::Object(document.0)
    }
}

/// Names the JSON type of a value, for error messages.
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> KnowledgeDocument {
        KnowledgeDocument::from_value(value).expect("object")
    }

    #[test]
    fn later_document_wins_on_collision() {
        let merged = KnowledgeDocument::merge_all([doc(json!({"a": 1})), doc(json!({"a": 2, "b": 3}))]);
        assert_eq!(JsonValue::from(merged), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn overridden_key_keeps_its_position() {
        let merged = KnowledgeDocument::merge_all([
            doc(json!({"title": "AI", "cost": 100})),
            doc(json!({"extra": true, "title": "AI Product"})),
        ]);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "cost", "extra"]);
        assert_eq!(merged.get("title"), Some(&json!("AI Product")));
    }

    #[test]
    fn merge_replaces_nested_values_wholesale() {
        let mut base = doc(json!({"fees": {"budget": 0, "contract": 599000}}));
        base.merge(doc(json!({"fees": {"contract": 650000}})));
        assert_eq!(base.get("fees"), Some(&json!({"contract": 650000})));
    }

    #[test]
    fn merge_all_of_nothing_is_empty() {
        let merged = KnowledgeDocument::merge_all(Vec::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn from_value_rejects_non_objects() {
        let rejected = KnowledgeDocument::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(json_type_name(&rejected), "array");
    }

    #[test]
    fn serialization_keeps_cyrillic_verbatim() {
        let document = doc(json!({"вопрос": "Сколько стоит обучение?"}));
        assert_eq!(
            document.to_json_string(),
            r#"{"вопрос":"Сколько стоит обучение?"}"#
        );
    }
}

//! Per-entity field cache.
//!
//! Parsing a field out of a document is memoized here until the owning page
//! is refreshed. Keys form a closed set; values are tagged so a reader never
//! has to guess the stored representation.

use std::collections::HashMap;

/// Identifier of a memoized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Xsrf,
    Detail,
    Description,
    Content,
    DataId,
    AnswerId,
    Bio,
    Location,
    Business,
    Gender,
    Upvote,
    AnswersNum,
    QuestionsNum,
    FollowersNum,
    FolloweesNum,
    FollowedColumnsNum,
    FollowedTopicsNum,
    CommentsNum,
    CollectedNum,
    VisitTimes,
    AgreeNum,
    ThanksNum,
    AsksNum,
    PostsNum,
    CollectionsNum,
    LogsNum,
}

/// A memoized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat field cache, write-once per key until cleared.
#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    values: HashMap<Field, FieldValue>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Cached integer, `None` if absent or stored as text.
    pub fn int(&self, field: Field) -> Option<i64> {
        match self.values.get(&field) {
            Some(FieldValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Cached text, `None` if absent or stored as an integer.
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Store a value unless the key already holds one.
    ///
    /// Returns `true` when the value was stored.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) -> bool {
        if self.values.contains_key(&field) {
            return false;
        }
        self.values.insert(field, value.into());
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//! Memory service trait — long-term, user-scoped facts.
//!
//! The memory service stores summaries of past interactions and answers
//! relevance searches over them. The engine only ever appends or queries;
//! it never edits a record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;
use crate::message::Message;

/// A single remembered fact about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Service-assigned ID
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,

    /// The user this memory belongs to
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,

    /// The remembered text
    pub memory: String,

    /// Relevance score (set by search operations)
    #[serde(default)]
    pub score: f32,

    /// When the service recorded it, if reported
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

// Services disagree on timestamp formats; an unreadable one is dropped.
fn lenient_timestamp<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .and_then(|v| v.as_str().map(str::to_owned))
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl MemoryRecord {
    pub fn new(user_id: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            memory: memory.into(),
            score: 0.0,
            created_at: None,
        }
    }
}

/// A relevance search scoped to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySearch {
    /// The search text; empty means "everything for this user"
    pub query: String,

    /// Only records owned by this user are returned
    pub user_id: String,

    /// Maximum number of results (service default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl MemorySearch {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The core MemoryService trait.
///
/// Implementations: hosted memory API, in-memory (testing), none (no-op).
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// The backend name (e.g., "mem0", "in_memory", "none").
    fn name(&self) -> &str;

    /// Search memories for one user.
    async fn search(&self, search: MemorySearch) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;

    /// Record an interaction (ordered role-tagged turns) for a user.
    ///
    /// Returns how many memory records the service derived from it.
    async fn add(&self, user_id: &str, interaction: &[Message]) -> std::result::Result<usize, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_builder() {
        let search = MemorySearch::new("", "samantha").with_limit(50);
        assert_eq!(search.user_id, "samantha");
        assert_eq!(search.limit, Some(50));
    }

    #[test]
    fn record_deserializes_from_sparse_json() {
        let record: MemoryRecord =
            serde_json::from_str(r#"{"memory":"Likes fighter jets"}"#).unwrap();
        assert_eq!(record.memory, "Likes fighter jets");
        assert!(record.user_id.is_empty());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn record_tolerates_nulls_and_odd_timestamps() {
        let record: MemoryRecord = serde_json::from_str(
            r#"{"id":null,"user_id":null,"memory":"Works in Hyderabad","created_at":"yesterday"}"#,
        )
        .unwrap();
        assert!(record.id.is_empty());
        assert!(record.created_at.is_none());

        let record: MemoryRecord = serde_json::from_str(
            r#"{"memory":"x","created_at":"2025-03-01T10:00:00-07:00"}"#,
        )
        .unwrap();
        assert!(record.created_at.is_some());
    }
}

//! The stream record as delivered by the host.
//!
//! Records are read-only inputs to the engine. Field names follow the wire
//! format (camelCase) of the hierarchy source.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Backlog,
    Active,
    Blocked,
    Done,
}

impl Default for StreamStatus {
    fn default() -> Self {
        StreamStatus::Backlog
    }
}

/// How the stream entered the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Task,
    Investigation,
    Meeting,
    Blocker,
    Discovery,
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Task
    }
}

/// A single work item in the hierarchy.
///
/// Children of a stream are all streams whose `parent_stream_id` equals its
/// id. Sibling order is `created_at` ascending, id as tiebreaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: StreamStatus,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub parent_stream_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Persisted absolute layout position, if the user dragged this node in
    /// an earlier session.
    #[serde(default)]
    pub position_x: Option<f32>,
    #[serde(default)]
    pub position_y: Option<f32>,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub created_at: i64,
}

impl Stream {
    /// Minimal record for tests and synthetic data.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: StreamStatus::default(),
            source_type: SourceType::default(),
            parent_stream_id: None,
            dependencies: Vec::new(),
            position_x: None,
            position_y: None,
            created_at: 0,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_stream_id = Some(parent.into());
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_status(mut self, status: StreamStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position_x = Some(x);
        self.position_y = Some(y);
        self
    }
}

//! Shared type definitions used across lookout crates.
//!
//! These are the value objects the engine produces and the query API serves:
//! the static [`Agent`] identity, the per-cycle [`AgentStatus`] snapshot and
//! the immutable [`ActivityEvent`] feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent.
pub type AgentId = String;

/// Static identity of an agent, loaded once from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub emoji: String,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            emoji: emoji.into(),
        }
    }
}

/// Derived liveness of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// A note file changed within the active threshold
    Active,
    /// No recent note changes, or no notes at all
    #[default]
    Idle,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

/// Kind of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Agent announced at startup
    Boot,
    /// A note file appeared
    Task,
    /// A known note file was saved again
    Updated,
    /// Agent went quiet after recorded activity
    Idle,
}

impl EventKind {
    /// Severity tag attached to events of this kind.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Boot | Self::Updated => Severity::Info,
            Self::Task => Severity::Task,
            Self::Idle => Severity::Idle,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boot => write!(f, "boot"),
            Self::Task => write!(f, "task"),
            Self::Updated => write!(f, "updated"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

/// Severity tag used by front ends to colour the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Task,
    Idle,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Task => write!(f, "task"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

/// One immutable entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Agent id
    #[serde(rename = "agent")]
    pub agent_id: AgentId,
    /// Agent display name
    pub name: String,
    pub emoji: String,
    /// File mtime for file events, wall clock for boot/idle events
    pub timestamp: DateTime<Utc>,
    /// Path relative to the workspace root, empty for boot/idle events
    pub file_changed: String,
    #[serde(rename = "event_type")]
    pub kind: EventKind,
    #[serde(rename = "event_detail")]
    pub detail: String,
    /// Tail of the changed file
    pub snippet: String,
    /// Byte-size change since the previous observation
    pub size_delta: i64,
    pub severity: Severity,
}

impl ActivityEvent {
    /// Create an event with no file, snippet or size delta attached.
    pub fn new(
        agent: &Agent,
        kind: EventKind,
        timestamp: DateTime<Utc>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent.id.clone(),
            name: agent.name.clone(),
            emoji: agent.emoji.clone(),
            timestamp,
            file_changed: String::new(),
            kind,
            detail: detail.into(),
            snippet: String::new(),
            size_delta: 0,
            severity: kind.severity(),
        }
    }

    /// Startup announcement for an agent.
    pub fn boot(agent: &Agent, workspace_found: bool, now: DateTime<Utc>) -> Self {
        let found = if workspace_found { "found" } else { "not found" };
        Self::new(
            agent,
            EventKind::Boot,
            now,
            format!("{} agent online · workspace {}", agent.name, found),
        )
    }

    /// One-shot notification that an agent has been quiet for `idle_minutes`.
    pub fn idle(agent: &Agent, idle_minutes: i64, now: DateTime<Utc>) -> Self {
        Self::new(
            agent,
            EventKind::Idle,
            now,
            format!("{} has been idle for {}+ min", agent.name, idle_minutes),
        )
    }

    pub fn with_file(mut self, relative_path: impl Into<String>) -> Self {
        self.file_changed = relative_path.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_size_delta(mut self, size_delta: i64) -> Self {
        self.size_delta = size_delta;
        self
    }
}

/// Status record for one agent, replaced wholesale every poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub emoji: String,
    pub status: AgentState,
    /// Modification time of the newest note file
    pub last_seen: Option<DateTime<Utc>>,
    /// First meaningful line of the newest memory notes
    pub last_task: Option<String>,
    pub workspace_bytes: u64,
    pub workspace_chars: u64,
    pub workspace_path: Option<String>,
    /// Number of note files in the memory directory
    pub event_count: usize,
    pub model: String,
    pub model_short: String,
    pub estimated_tokens: u64,
}

impl AgentStatus {
    /// Status of an agent with no workspace and no notes.
    pub fn empty(agent: &Agent, model: impl Into<String>, model_short: impl Into<String>) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            role: agent.role.clone(),
            emoji: agent.emoji.clone(),
            status: AgentState::Idle,
            last_seen: None,
            last_task: None,
            workspace_bytes: 0,
            workspace_chars: 0,
            workspace_path: None,
            event_count: 0,
            model: model.into(),
            model_short: model_short.into(),
            estimated_tokens: 0,
        }
    }
}

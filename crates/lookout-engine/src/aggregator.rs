//! Per-agent status derivation.
//!
//! Pure with respect to the engine state: reads the inventory (and the note
//! files it lists) and returns a fresh [`AgentStatus`].

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use lookout_config::{LookoutConfig, ModelTable, short_model_name};
use lookout_core::{Agent, AgentState, AgentStatus};

use crate::inventory::{FileInventory, FileRecord};
use crate::text;

/// How many of the newest memory notes are searched for a task line.
pub const LAST_TASK_SCAN_FILES: usize = 3;

/// A task line must be longer than this, in characters.
pub const LAST_TASK_MIN_CHARS: usize = 10;

/// Maximum task line length, in characters.
pub const LAST_TASK_MAX_CHARS: usize = 120;

/// Builds [`AgentStatus`] records from workspace inventories.
#[derive(Debug, Clone)]
pub struct StatusAggregator {
    active_threshold: Duration,
    memory_dir: String,
    models: ModelTable,
}

impl StatusAggregator {
    pub fn new(active_threshold: Duration, memory_dir: impl Into<String>, models: ModelTable) -> Self {
        Self {
            active_threshold,
            memory_dir: memory_dir.into(),
            models,
        }
    }

    pub fn from_config(config: &LookoutConfig, models: ModelTable) -> Self {
        Self::new(
            Duration::seconds(config.active_threshold_secs as i64),
            config.memory_dir.clone(),
            models,
        )
    }

    /// Status of one agent as of `now`.
    pub fn build(&self, agent: &Agent, inventory: &FileInventory, now: DateTime<Utc>) -> AgentStatus {
        let model = self.models.resolve(&agent.id);
        let mut status = AgentStatus::empty(agent, model, short_model_name(model));

        let Some(root) = inventory.root() else {
            return status;
        };
        status.workspace_path = Some(root.display().to_string());

        if let Some(latest) = inventory.latest() {
            let last_seen = latest.modified;
            if now - last_seen <= self.active_threshold {
                status.status = AgentState::Active;
            }
            status.last_seen = Some(last_seen);
        }

        let memory = self.memory_notes(root, inventory);
        status.event_count = memory.len();
        status.last_task = last_task(&memory);

        status.workspace_bytes = inventory.total_bytes();
        status.workspace_chars = inventory.total_chars();
        status.estimated_tokens = estimate_tokens(status.workspace_chars);
        status
    }

    /// Note files directly inside the memory directory, newest first.
    fn memory_notes<'a>(&self, root: &Path, inventory: &'a FileInventory) -> Vec<&'a FileRecord> {
        let memory_dir = root.join(&self.memory_dir);
        let mut notes: Vec<&FileRecord> = inventory
            .files()
            .iter()
            .filter(|f| f.path.parent() == Some(memory_dir.as_path()))
            .collect();
        // Stable sort keeps path order among equal mtimes
        notes.sort_by(|a, b| b.modified.cmp(&a.modified));
        notes
    }
}

/// First meaningful line among the newest memory notes.
fn last_task(notes: &[&FileRecord]) -> Option<String> {
    notes
        .iter()
        .take(LAST_TASK_SCAN_FILES)
        .filter_map(|note| text::read_lossy(&note.path))
        .find_map(|content| task_line(&content))
}

/// First line that is not blank, not a heading and longer than the minimum
/// once list markers are stripped.
fn task_line(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let mut line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        if line.starts_with(['-', '*']) {
            line = line.trim_start_matches(['-', '*', ' ']).trim();
        }
        (line.chars().count() > LAST_TASK_MIN_CHARS)
            .then(|| text::truncate_chars(line, LAST_TASK_MAX_CHARS).to_string())
    })
}

/// Rough token count: a quarter of the characters, rounded half to even.
pub fn estimate_tokens(chars: u64) -> u64 {
    (chars as f64 / 4.0).round_ties_even() as u64
}

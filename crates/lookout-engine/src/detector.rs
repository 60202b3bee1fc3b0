//! Change detection: diff a fresh inventory against the snapshot store and
//! turn the differences into activity events.
//!
//! A file is reported when it is new to the store or when its modification
//! time moved strictly forward. Every scanned file's snapshot is refreshed
//! afterwards, so scanning an unchanged tree twice yields nothing the second
//! time and a file whose clock moved backward is silently re-baselined.
//!
//! Idle detection is a one-shot per silence period: the agent's last-active
//! time is cleared as soon as the idle event fires and only set again by a
//! real change.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use lookout_core::{ACTIVITY_TARGET, ActivityEvent, Agent, AgentId, EventKind};
use tracing::{debug, info};

use crate::inventory::{FileInventory, FileRecord};
use crate::snapshot::{SnapshotEntry, SnapshotStore};
use crate::text::{self, SNIPPET_LINES, SNIPPET_MAX_CHARS};

/// Per-agent time of the last detected change.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    last_active: HashMap<AgentId, DateTime<Utc>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_active(&self, agent_id: &str) -> Option<DateTime<Utc>> {
        self.last_active.get(agent_id).copied()
    }

    pub fn mark_active(&mut self, agent_id: &str, at: DateTime<Utc>) {
        self.last_active.insert(agent_id.to_string(), at);
    }

    pub fn clear(&mut self, agent_id: &str) {
        self.last_active.remove(agent_id);
    }
}

/// Stateless diffing rules; all state lives in the store and tracker passed in.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    idle_threshold: Duration,
}

impl ChangeDetector {
    pub fn new(idle_threshold: Duration) -> Self {
        Self { idle_threshold }
    }

    /// Record every file of the inventory as already seen, without emitting events.
    ///
    /// Returns the number of files primed.
    pub fn prime(&self, inventory: &FileInventory, snapshots: &mut SnapshotStore) -> usize {
        for file in inventory.files() {
            let lines = text::read_lossy(&file.path)
                .map(|content| text::count_nonempty_lines(&content))
                .unwrap_or(0);
            snapshots.put(
                file.path.clone(),
                SnapshotEntry {
                    modified: file.modified,
                    size: file.size,
                    lines,
                },
            );
        }
        inventory.len()
    }

    /// Diff one agent's inventory against the store.
    ///
    /// Returns the new events in inventory order, followed by at most one idle
    /// event. An absent workspace produces no events at all.
    pub fn detect(
        &self,
        agent: &Agent,
        inventory: &FileInventory,
        snapshots: &mut SnapshotStore,
        tracker: &mut ActivityTracker,
        now: DateTime<Utc>,
    ) -> Vec<ActivityEvent> {
        if inventory.root().is_none() {
            return Vec::new();
        }

        let mut events = Vec::new();
        for file in inventory.files() {
            let previous = snapshots.get(&file.path).copied();
            let changed = previous.is_none_or(|prev| file.modified > prev.modified);

            if changed {
                let (event, lines) = self.describe_change(agent, inventory, file, previous);
                info!(
                    target: ACTIVITY_TARGET,
                    agent_id = %agent.id,
                    event_type = %event.kind,
                    severity = %event.severity,
                    path = %event.file_changed,
                    "{}",
                    event.detail
                );
                snapshots.put(
                    file.path.clone(),
                    SnapshotEntry {
                        modified: file.modified,
                        size: file.size,
                        lines,
                    },
                );
                tracker.mark_active(&agent.id, now);
                events.push(event);
            } else {
                snapshots.touch(&file.path, file.modified, file.size);
            }
        }

        if let Some(idle) = self.check_idle(agent, tracker, now) {
            events.push(idle);
        }

        events
    }

    /// Build the event for a new or changed file, and its fresh line count.
    fn describe_change(
        &self,
        agent: &Agent,
        inventory: &FileInventory,
        file: &FileRecord,
        previous: Option<SnapshotEntry>,
    ) -> (ActivityEvent, usize) {
        let content = text::read_lossy(&file.path).unwrap_or_default();
        let lines = text::count_nonempty_lines(&content);
        let snippet = text::tail_snippet(&content, SNIPPET_LINES, SNIPPET_MAX_CHARS);
        let rel = inventory.relative_path(&file.path);

        let (kind, detail, size_delta) = match previous {
            None => (EventKind::Task, format!("Created {rel}"), file.size as i64),
            Some(prev) => {
                let line_delta = lines as i64 - prev.lines as i64;
                (
                    EventKind::Updated,
                    format!("Updated {rel} ({line_delta:+} lines)"),
                    file.size as i64 - prev.size as i64,
                )
            }
        };

        let event = ActivityEvent::new(agent, kind, file.modified, detail)
            .with_file(rel)
            .with_snippet(snippet)
            .with_size_delta(size_delta);
        (event, lines)
    }

    fn check_idle(
        &self,
        agent: &Agent,
        tracker: &mut ActivityTracker,
        now: DateTime<Utc>,
    ) -> Option<ActivityEvent> {
        let last_active = tracker.last_active(&agent.id)?;
        let silence = now - last_active;
        if silence < self.idle_threshold {
            debug!(agent_id = %agent.id, silence_secs = silence.num_seconds(), "Not idle yet");
            return None;
        }

        tracker.clear(&agent.id);
        let event = ActivityEvent::idle(agent, silence.num_minutes(), now);
        info!(
            target: ACTIVITY_TARGET,
            agent_id = %agent.id,
            event_type = %event.kind,
            severity = %event.severity,
            "{}",
            event.detail
        );
        Some(event)
    }
}

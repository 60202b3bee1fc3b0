//! Shared dashboard state: written by the scheduler, read by the query API.
//!
//! The scheduler's working state (snapshots and last-active times) sits behind
//! its own mutex and is held for the whole scan. Readers only ever touch the
//! published half, which the scheduler write-locks briefly once per agent to
//! append that agent's events and swap in its new status together.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use lookout_core::{ActivityEvent, Agent, AgentId, AgentStatus};
use serde::Serialize;

use crate::activity_log::ActivityLog;
use crate::detector::ActivityTracker;
use crate::snapshot::SnapshotStore;

/// Scheduler-private change tracking.
#[derive(Debug, Default)]
pub struct Tracking {
    pub snapshots: SnapshotStore,
    pub activity: ActivityTracker,
}

#[derive(Debug)]
struct Published {
    statuses: HashMap<AgentId, AgentStatus>,
    log: ActivityLog,
}

/// Liveness summary served by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
    /// Agents with a published status
    pub agents: usize,
    /// Whole seconds since startup
    pub uptime: u64,
    /// Current activity feed length
    pub activity_events: usize,
}

/// Engine state shared between the scheduler and readers.
#[derive(Debug)]
pub struct DashboardState {
    roster: Vec<Agent>,
    started: Instant,
    tracking: Mutex<Tracking>,
    published: RwLock<Published>,
}

impl DashboardState {
    pub fn new(roster: Vec<Agent>, log_capacity: usize) -> Self {
        Self {
            roster,
            started: Instant::now(),
            tracking: Mutex::new(Tracking::default()),
            published: RwLock::new(Published {
                statuses: HashMap::new(),
                log: ActivityLog::new(log_capacity),
            }),
        }
    }

    /// Agents in roster order.
    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    /// Lock the scheduler's tracking state.
    ///
    /// A poisoned lock is recovered: a cycle that panicked mid-scan leaves the
    /// store at worst partially refreshed, which the next scan corrects.
    pub fn tracking(&self) -> MutexGuard<'_, Tracking> {
        self.tracking
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an agent's events, then replace its status, as one step.
    pub fn publish(&self, agent_id: &str, events: Vec<ActivityEvent>, status: AgentStatus) {
        let mut published = self.write();
        published.log.extend(events);
        published.statuses.insert(agent_id.to_string(), status);
    }

    /// Append events without touching any status.
    pub fn record(&self, events: impl IntoIterator<Item = ActivityEvent>) {
        self.write().log.extend(events);
    }

    /// Published statuses in roster order. Agents never published are left out.
    pub fn statuses(&self) -> Vec<AgentStatus> {
        let published = self.read();
        self.roster
            .iter()
            .filter_map(|agent| published.statuses.get(&agent.id).cloned())
            .collect()
    }

    pub fn status(&self, agent_id: &str) -> Option<AgentStatus> {
        self.read().statuses.get(agent_id).cloned()
    }

    /// Activity feed, newest first.
    pub fn activity(&self) -> Vec<ActivityEvent> {
        self.read().log.to_vec()
    }

    pub fn health(&self) -> Health {
        let published = self.read();
        Health {
            status: "ok",
            agents: published.statuses.len(),
            uptime: self.started.elapsed().as_secs(),
            activity_events: published.log.len(),
        }
    }

    /// Number of files the scheduler is tracking.
    pub fn snapshot_count(&self) -> usize {
        self.tracking().snapshots.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Published> {
        self.published
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Published> {
        self.published
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lookout_core::EventKind;

    fn roster() -> Vec<Agent> {
        vec![
            Agent::new("main", "K2S0", "Coordinator", "🤖"),
            Agent::new("pm", "Dennis", "PM", "📋"),
            Agent::new("qa", "Mac", "QA", "🔍"),
        ]
    }

    fn status(agent: &Agent) -> AgentStatus {
        AgentStatus::empty(agent, "anthropic/claude-sonnet-4-6", "claude-sonnet-4-6")
    }

    #[test]
    fn test_statuses_follow_roster_order() {
        let roster = roster();
        let state = DashboardState::new(roster.clone(), 10);
        state.publish("qa", Vec::new(), status(&roster[2]));
        state.publish("main", Vec::new(), status(&roster[0]));

        let ids: Vec<String> = state.statuses().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["main", "qa"]);
        assert!(state.status("pm").is_none());
    }

    #[test]
    fn test_publish_appends_events_before_status() {
        let roster = roster();
        let state = DashboardState::new(roster.clone(), 10);
        let event = ActivityEvent::new(&roster[1], EventKind::Task, Utc::now(), "Created a.md");

        state.publish("pm", vec![event.clone()], status(&roster[1]));

        assert_eq!(state.activity(), vec![event]);
        assert!(state.status("pm").is_some());
    }

    #[test]
    fn test_health() {
        let roster = roster();
        let state = DashboardState::new(roster.clone(), 2);
        state.record((0..3).map(|_| ActivityEvent::boot(&roster[0], true, Utc::now())));
        state.publish("main", Vec::new(), status(&roster[0]));

        let health = state.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.agents, 1);
        assert_eq!(health.activity_events, 2);
    }

    #[test]
    fn test_tracking_survives_poisoning() {
        let state = std::sync::Arc::new(DashboardState::new(roster(), 10));
        let poisoner = std::sync::Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.tracking();
            panic!("scan blew up");
        })
        .join();

        assert_eq!(state.snapshot_count(), 0);
    }
}

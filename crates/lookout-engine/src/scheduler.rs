//! Polling scheduler.
//!
//! Runs one priming pass and a boot announcement, then polls every agent on
//! a fixed interval for the life of the process:
//!
//! ```text
//! prime ──► announce ──► [tick ──► for each agent: locate ─► scan ─► detect ─► aggregate ─► publish]
//! ```
//!
//! Filesystem work runs on the blocking pool. A failing or panicking agent
//! is logged and skipped while the rest of the cycle proceeds.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lookout_config::{LookoutConfig, ModelTable};
use lookout_core::{ACTIVITY_TARGET, ActivityEvent, Agent, Result};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::aggregator::StatusAggregator;
use crate::detector::ChangeDetector;
use crate::inventory::FileInventory;
use crate::locator::WorkspaceLocator;
use crate::state::{DashboardState, Tracking};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Agents processed successfully
    pub agents: usize,
    /// Events published
    pub events: usize,
    /// Agents whose poll failed
    pub failures: usize,
}

/// Drives change detection and status aggregation for every agent.
#[derive(Debug, Clone)]
pub struct Scheduler {
    state: Arc<DashboardState>,
    locator: WorkspaceLocator,
    detector: ChangeDetector,
    aggregator: StatusAggregator,
    extension: String,
    interval: Duration,
}

impl Scheduler {
    /// Build a scheduler for the agents in `state`'s roster.
    pub fn new(config: &LookoutConfig, models: ModelTable, state: Arc<DashboardState>) -> Self {
        Self {
            state,
            locator: WorkspaceLocator::from_config(config),
            detector: ChangeDetector::new(chrono::Duration::seconds(
                config.idle_threshold_secs as i64,
            )),
            aggregator: StatusAggregator::from_config(config, models),
            extension: config.extension().to_string(),
            interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    fn agents(&self) -> &[Agent] {
        self.state.roster()
    }

    fn scan(&self, agent: &Agent) -> Result<(Option<PathBuf>, FileInventory)> {
        let workspace = self.locator.locate(&agent.id);
        let inventory = FileInventory::scan(workspace.as_deref(), &self.extension)?;
        Ok((workspace, inventory))
    }

    /// Seed the snapshot store with every existing note file. Emits no events.
    ///
    /// Returns the number of files primed.
    pub fn prime(&self) -> usize {
        let mut primed = 0;
        for agent in self.agents() {
            let inventory = match self.scan(agent) {
                Ok((_, inventory)) => inventory,
                Err(e) => {
                    warn!(agent_id = %agent.id, error = %e, "Skipping agent while priming");
                    continue;
                }
            };
            let mut tracking = self.state.tracking();
            primed += self.detector.prime(&inventory, &mut tracking.snapshots);
        }
        info!(files = primed, "Primed snapshot store");
        primed
    }

    /// Publish an initial status and a boot event for every agent.
    pub fn announce(&self, now: DateTime<Utc>) {
        for agent in self.agents() {
            let (workspace, inventory) = match self.scan(agent) {
                Ok(scanned) => scanned,
                Err(e) => {
                    warn!(agent_id = %agent.id, error = %e, "Workspace unreadable at boot");
                    (None, FileInventory::empty())
                }
            };

            match &workspace {
                Some(path) => info!(agent_id = %agent.id, workspace = %path.display(), "{} {}", agent.emoji, agent.name),
                None => info!(agent_id = %agent.id, workspace = "(not found)", "{} {}", agent.emoji, agent.name),
            }

            let status = self.aggregator.build(agent, &inventory, now);
            let boot = ActivityEvent::boot(agent, workspace.is_some(), now);
            info!(
                target: ACTIVITY_TARGET,
                agent_id = %agent.id,
                event_type = %boot.kind,
                severity = %boot.severity,
                "{}",
                boot.detail
            );
            self.state.publish(&agent.id, vec![boot], status);
        }
        info!(agents = self.agents().len(), "Loaded agents");
    }

    /// Poll one agent: detect changes, rebuild its status and publish both.
    ///
    /// Returns the number of events published.
    pub fn poll_agent(&self, agent: &Agent, now: DateTime<Utc>) -> Result<usize> {
        let (_, inventory) = self.scan(agent)?;

        let events = {
            let mut tracking = self.state.tracking();
            let Tracking {
                snapshots,
                activity,
            } = &mut *tracking;
            self.detector
                .detect(agent, &inventory, snapshots, activity, now)
        };

        let status = self.aggregator.build(agent, &inventory, now);
        let count = events.len();
        self.state.publish(&agent.id, events, status);
        Ok(count)
    }

    /// Poll every agent once. A failing agent does not stop the others.
    pub fn poll_once(&self, now: DateTime<Utc>) -> CycleReport {
        self.poll_each(|agent| self.poll_agent(agent, now))
    }

    /// Run `poll` for every agent in roster order, tallying the outcomes.
    ///
    /// An agent whose poll errors or panics keeps its last published status.
    fn poll_each(&self, mut poll: impl FnMut(&Agent) -> Result<usize>) -> CycleReport {
        let mut report = CycleReport::default();
        for agent in self.agents() {
            match panic::catch_unwind(AssertUnwindSafe(|| poll(agent))) {
                Ok(Ok(events)) => {
                    report.agents += 1;
                    report.events += events;
                }
                Ok(Err(e)) => {
                    warn!(agent_id = %agent.id, error = %e, "Agent poll failed");
                    report.failures += 1;
                }
                Err(_) => {
                    error!(agent_id = %agent.id, "Agent poll panicked");
                    report.failures += 1;
                }
            }
        }
        report
    }

    /// Prime and announce on the blocking pool, then poll in the background
    /// until the returned handle is aborted.
    pub async fn start(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            agents = self.agents().len(),
            "Starting scheduler"
        );

        let scheduler = Arc::new(self);
        let boot = Arc::clone(&scheduler);
        let booted = tokio::task::spawn_blocking(move || {
            boot.prime();
            boot.announce(Utc::now());
        })
        .await;
        if let Err(e) = booted {
            error!(error = %e, "Boot pass panicked");
        }

        tokio::spawn(async move {
            scheduler.run_loop().await;
        })
    }

    async fn run_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let scheduler = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || scheduler.poll_once(Utc::now())).await {
                Ok(report) => debug!(
                    agents = report.agents,
                    events = report.events,
                    failures = report.failures,
                    "Poll cycle complete"
                ),
                Err(e) => error!(error = %e, "Poll cycle panicked"),
            }
        }
    }
}

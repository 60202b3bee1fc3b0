//! # lookout-engine
//!
//! Poll-based change detection and status derivation for agent workspaces.
//!
//! - [`WorkspaceLocator`] resolves an agent to its workspace directory
//! - [`FileInventory`] lists the note files of one workspace
//! - [`SnapshotStore`] remembers what each file looked like last time
//! - [`ChangeDetector`] diffs an inventory against the store into events
//! - [`ActivityLog`] keeps the bounded, newest-first event feed
//! - [`StatusAggregator`] derives an [`AgentStatus`](lookout_core::AgentStatus)
//! - [`DashboardState`] is the state shared with readers
//! - [`Scheduler`] ties it together on a fixed interval
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lookout_config::{LookoutConfig, ModelTable};
//! use lookout_engine::{DashboardState, Scheduler};
//!
//! # async fn run() -> lookout_core::Result<()> {
//! let config = LookoutConfig::load(None)?;
//! let models = ModelTable::load(&config.models_file, &config.default_model);
//! let state = Arc::new(DashboardState::new(config.roster(), config.activity_log_capacity));
//!
//! let handle = Scheduler::new(&config, models, Arc::clone(&state)).start().await;
//! println!("{} agents", state.statuses().len());
//! handle.abort();
//! # Ok(())
//! # }
//! ```

pub mod activity_log;
pub mod aggregator;
pub mod detector;
pub mod inventory;
pub mod locator;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod text;

pub use activity_log::ActivityLog;
pub use aggregator::StatusAggregator;
pub use detector::{ActivityTracker, ChangeDetector};
pub use inventory::{FileInventory, FileRecord};
pub use locator::WorkspaceLocator;
pub use scheduler::{CycleReport, Scheduler};
pub use snapshot::{SnapshotEntry, SnapshotStore};
pub use state::{DashboardState, Health, Tracking};

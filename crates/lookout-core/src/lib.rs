//! # lookout-core
//!
//! Core types, errors, and utilities for the lookout workspace monitor.
//!
//! This crate provides:
//! - [`LookoutError`] - Error types for all lookout operations
//! - [`logging`] - Tracing setup and log management utilities
//! - [`types`] - Agent identity, status and activity event types
//!
//! ## Example
//!
//! ```no_run
//! use lookout_core::{LookoutError, Result, logging};
//!
//! fn main() -> lookout_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let roster_is_empty = true;
//!     if roster_is_empty {
//!         return Err(LookoutError::config_validation("agent roster is empty"));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use error::{LookoutError, Result};
pub use logging::{ACTIVITY_TARGET, LogGuard, init_logging};
pub use types::{ActivityEvent, Agent, AgentId, AgentState, AgentStatus, EventKind, Severity};

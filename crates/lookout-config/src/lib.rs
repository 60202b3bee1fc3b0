//! # lookout-config
//!
//! Configuration for the lookout workspace monitor: the service settings and
//! agent roster ([`LookoutConfig`]) and the externally owned per-agent model
//! table ([`ModelTable`]).

pub mod config;
pub mod models;

pub use config::{AgentConfig, LookoutConfig, default_config_path, expand_tilde};
pub use models::{ModelTable, short_model_name};

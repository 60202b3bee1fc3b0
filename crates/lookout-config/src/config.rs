//! Service configuration loaded from `~/.lookout/config.yaml`.
//!
//! Every field is optional in the file; anything left out takes the built-in
//! default, including the agent roster. A missing file is not an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lookout_core::{Agent, LookoutError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default active threshold (5 minutes).
pub const DEFAULT_ACTIVE_THRESHOLD_SECS: u64 = 300;

/// Default idle notification threshold (10 minutes).
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 600;

/// Default scheduler interval.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default number of events retained in the activity feed.
pub const DEFAULT_ACTIVITY_LOG_CAPACITY: usize = 50;

/// Default query API port.
pub const DEFAULT_PORT: u16 = 7800;

/// Model used when the external model table has nothing better.
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4-6";

/// Config file path (typically ~/.lookout/config.yaml).
pub fn default_config_path() -> PathBuf {
    home_dir().join(".lookout").join("config.yaml")
}

/// One roster entry: agent identity plus the directory names its workspace may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    /// Candidate directory names under `base_dir`, tried in order
    #[serde(default)]
    pub workspace_patterns: Vec<String>,
}

impl AgentConfig {
    fn new(id: &str, name: &str, role: &str, emoji: &str, patterns: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            emoji: emoji.to_string(),
            workspace_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The static identity part of this entry.
    pub fn agent(&self) -> Agent {
        Agent::new(&self.id, &self.name, &self.role, &self.emoji)
    }
}

/// Top-level lookout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookoutConfig {
    /// Directory containing the agent workspaces.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Listen address of the query API.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listen port of the query API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum note staleness for an agent to count as active.
    #[serde(default = "default_active_threshold")]
    pub active_threshold_secs: u64,

    /// Silence required after a change before an idle event fires.
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold_secs: u64,

    /// Number of events kept in the activity feed.
    #[serde(default = "default_log_capacity")]
    pub activity_log_capacity: usize,

    /// Extension of note files, without the dot.
    #[serde(default = "default_note_extension")]
    pub note_extension: String,

    /// Name of the memory subdirectory inside a workspace.
    #[serde(default = "default_memory_dir")]
    pub memory_dir: String,

    /// External JSON file with per-agent model names.
    #[serde(default = "default_models_file")]
    pub models_file: PathBuf,

    /// Model reported when the model table cannot be used.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Agent roster, in display order.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentConfig>,
}

impl Default for LookoutConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            bind_address: default_bind_address(),
            port: default_port(),
            poll_interval_secs: default_poll_interval(),
            active_threshold_secs: default_active_threshold(),
            idle_threshold_secs: default_idle_threshold(),
            activity_log_capacity: default_log_capacity(),
            note_extension: default_note_extension(),
            memory_dir: default_memory_dir(),
            models_file: default_models_file(),
            default_model: default_model(),
            agents: default_agents(),
        }
    }
}

impl LookoutConfig {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file yields [`LookoutConfig::default`]. Unreadable, malformed or
    /// invalid files are errors.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            debug!("Config file does not exist: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| LookoutError::io("reading config file", &path, e))?;
        let config = Self::parse(&content, &path)?;
        config.validate()?;

        debug!(path = %path.display(), agents = config.agents.len(), "Loaded config");
        Ok(config)
    }

    /// Parse configuration from a YAML string. `path` is only used for errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Self = serde_yaml::from_str(content)
            .map_err(|e| LookoutError::config_invalid(path, e.to_string()))?;
        config.base_dir = expand_tilde(&config.base_dir);
        config.models_file = expand_tilde(&config.models_file);
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(LookoutError::config_validation("agent roster is empty"));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.id.trim().is_empty() {
                return Err(LookoutError::config_validation("agent id must not be empty"));
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(LookoutError::config_validation(format!(
                    "duplicate agent id '{}'",
                    agent.id
                )));
            }
            if agent.workspace_patterns.is_empty() {
                return Err(LookoutError::config_validation(format!(
                    "agent '{}' has no workspace patterns",
                    agent.id
                )));
            }
        }

        if self.poll_interval_secs == 0 {
            return Err(LookoutError::config_validation(
                "poll_interval_secs must be >= 1",
            ));
        }

        if self.activity_log_capacity == 0 {
            return Err(LookoutError::config_validation(
                "activity_log_capacity must be >= 1",
            ));
        }

        if self.note_extension.trim_start_matches('.').is_empty() {
            return Err(LookoutError::config_validation(
                "note_extension must not be empty",
            ));
        }

        Ok(())
    }

    /// Agent identities in roster order.
    pub fn roster(&self) -> Vec<Agent> {
        self.agents.iter().map(AgentConfig::agent).collect()
    }

    /// Note extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.note_extension.trim_start_matches('.')
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_base_dir() -> PathBuf {
    home_dir().join(".openclaw")
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_active_threshold() -> u64 {
    DEFAULT_ACTIVE_THRESHOLD_SECS
}

fn default_idle_threshold() -> u64 {
    DEFAULT_IDLE_THRESHOLD_SECS
}

fn default_log_capacity() -> usize {
    DEFAULT_ACTIVITY_LOG_CAPACITY
}

fn default_note_extension() -> String {
    "md".to_string()
}

fn default_memory_dir() -> String {
    "memory".to_string()
}

fn default_models_file() -> PathBuf {
    home_dir().join(".openclaw").join("openclaw.json")
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_emoji() -> String {
    "🤖".to_string()
}

fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig::new(
            "main",
            "K2S0",
            "Coordinator",
            "🤖",
            &["workspace", "workspace-main", "workspace-coordinator"],
        ),
        AgentConfig::new(
            "developer",
            "Charlie",
            "Developer",
            "👨‍💻",
            &["workspace-developer", "workspace-dev", "workspace-charlie"],
        ),
        AgentConfig::new("pm", "Dennis", "PM", "📋", &["workspace-pm", "workspace-dennis"]),
        AgentConfig::new("qa", "Mac", "QA", "🔍", &["workspace-qa", "workspace-mac"]),
        AgentConfig::new(
            "devops",
            "Frank",
            "DevOps",
            "🔧",
            &["workspace-devops", "workspace-frank"],
        ),
        AgentConfig::new(
            "research",
            "Sweet Dee",
            "Research",
            "🔬",
            &["workspace-research", "workspace-sweetdee", "workspace-sweet-dee"],
        ),
        AgentConfig::new(
            "designer",
            "Cricket",
            "Designer",
            "🎨",
            &["workspace-designer", "workspace-cricket"],
        ),
    ]
}

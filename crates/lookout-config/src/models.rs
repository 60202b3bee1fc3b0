//! Per-agent model names read from the external agent runtime config.
//!
//! The file is owned by another tool, so it is read once, leniently, and any
//! problem with it degrades to the default model instead of failing startup.
//!
//! Expected shape (everything optional):
//!
//! ```json
//! {
//!   "agents": {
//!     "defaults": { "model": { "primary": "anthropic/claude-sonnet-4-6" } },
//!     "list": [ { "id": "developer", "model": "openai/gpt-5" } ]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use lookout_core::{LookoutError, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Resolved model names, with a global fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTable {
    default: String,
    per_agent: HashMap<String, String>,
}

impl ModelTable {
    /// A table that resolves every agent to `default`.
    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            per_agent: HashMap::new(),
        }
    }

    /// Load the table from `path`, falling back to `fallback` for everything on any error.
    pub fn load(path: &Path, fallback: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model table unavailable, using default model");
                return Self::with_default(fallback);
            }
        };

        match Self::parse(&content, fallback) {
            Ok(table) => {
                debug!(
                    path = %path.display(),
                    agents = table.per_agent.len(),
                    default = %table.default,
                    "Loaded model table"
                );
                table
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model table malformed, using default model");
                Self::with_default(fallback)
            }
        }
    }

    /// Parse the JSON document. Only a document that is not JSON at all is an error.
    pub fn parse(content: &str, fallback: &str) -> Result<Self> {
        let root: Value =
            serde_json::from_str(content).map_err(|e| LookoutError::json_parse("model table", e))?;
        let agents = &root["agents"];

        let default = agents["defaults"]["model"]["primary"]
            .as_str()
            .unwrap_or(fallback)
            .to_string();

        let mut per_agent = HashMap::new();
        if let Some(list) = agents["list"].as_array() {
            for entry in list {
                let Some(id) = entry["id"].as_str().filter(|id| !id.is_empty()) else {
                    continue;
                };
                let model = entry["model"].as_str().unwrap_or(&default);
                per_agent.insert(id.to_string(), model.to_string());
            }
        }

        Ok(Self { default, per_agent })
    }

    /// Full model name for an agent.
    pub fn resolve(&self, agent_id: &str) -> &str {
        self.per_agent
            .get(agent_id)
            .map(String::as_str)
            .unwrap_or(&self.default)
    }
}

/// Model name without its `provider/` prefix.
pub fn short_model_name(model: &str) -> &str {
    match model.split_once('/') {
        Some((_, rest)) => rest,
        None => model,
    }
}

//! Resolve an agent id to its workspace directory.

use std::collections::HashMap;
use std::path::PathBuf;

use lookout_config::LookoutConfig;
use tracing::trace;

/// Maps agent ids to workspace directories by trying candidate names in order.
///
/// Workspaces are re-resolved on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct WorkspaceLocator {
    base_dir: PathBuf,
    patterns: HashMap<String, Vec<String>>,
}

impl WorkspaceLocator {
    /// Create a locator with no patterns registered.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            patterns: HashMap::new(),
        }
    }

    /// Build a locator from the configured roster.
    pub fn from_config(config: &LookoutConfig) -> Self {
        config
            .agents
            .iter()
            .fold(Self::new(&config.base_dir), |locator, agent| {
                locator.with_patterns(&agent.id, agent.workspace_patterns.clone())
            })
    }

    /// Register the candidate directory names for an agent.
    pub fn with_patterns(mut self, agent_id: impl Into<String>, patterns: Vec<String>) -> Self {
        self.patterns.insert(agent_id.into(), patterns);
        self
    }

    /// First candidate directory under the base directory that exists.
    ///
    /// `None` is a normal outcome: the agent simply has no workspace yet.
    pub fn locate(&self, agent_id: &str) -> Option<PathBuf> {
        let patterns = self.patterns.get(agent_id)?;
        let found = patterns
            .iter()
            .map(|pattern| self.base_dir.join(pattern))
            .find(|candidate| candidate.is_dir());
        trace!(agent_id, workspace = ?found, "Resolved workspace");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn locator(base: &Path) -> WorkspaceLocator {
        WorkspaceLocator::new(base).with_patterns(
            "developer",
            vec![
                "workspace-developer".to_string(),
                "workspace-dev".to_string(),
                "workspace-charlie".to_string(),
            ],
        )
    }

    #[test]
    fn test_locate_first_existing_pattern() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("workspace-dev")).unwrap();
        fs::create_dir(temp_dir.path().join("workspace-charlie")).unwrap();

        let found = locator(temp_dir.path()).locate("developer");
        assert_eq!(found, Some(temp_dir.path().join("workspace-dev")));
    }

    #[test]
    fn test_locate_prefers_declared_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("workspace-charlie")).unwrap();
        fs::create_dir(temp_dir.path().join("workspace-developer")).unwrap();

        let found = locator(temp_dir.path()).locate("developer");
        assert_eq!(found, Some(temp_dir.path().join("workspace-developer")));
    }

    #[test]
    fn test_locate_ignores_plain_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("workspace-developer"), "not a dir").unwrap();

        assert_eq!(locator(temp_dir.path()).locate("developer"), None);
    }

    #[test]
    fn test_locate_unknown_agent() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(locator(temp_dir.path()).locate("nobody"), None);
    }

    #[test]
    fn test_from_config_uses_roster_patterns() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("workspace-mac")).unwrap();
        let config = LookoutConfig {
            base_dir: temp_dir.path().to_path_buf(),
            ..LookoutConfig::default()
        };

        let locator = WorkspaceLocator::from_config(&config);
        assert_eq!(locator.locate("qa"), Some(temp_dir.path().join("workspace-mac")));
        assert_eq!(locator.locate("main"), None);
    }
}

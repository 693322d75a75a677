use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Deploy command used when no config file overrides it
pub const DEFAULT_DEPLOY: &str = "npx convex deploy";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

/// Resolved settings for a deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Shell command line for the deploy step
    pub deploy: String,
    pub remote: String,
    pub branch: String,
    /// Working directory for every step; `None` inherits the process cwd
    pub cwd: Option<PathBuf>,
    /// Extra variables layered over the inherited environment
    pub env: HashMap<String, String>,
    /// Per-step time limit
    pub timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            deploy: DEFAULT_DEPLOY.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            cwd: None,
            env: HashMap::new(),
            timeout: None,
        }
    }
}

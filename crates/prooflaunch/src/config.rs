//! Launch configuration.
//!
//! Built once at startup from flags and environment, validated, then consumed
//! to construct the server invocation. Never mutated after validation.

use crate::error::LaunchError;
use crate::venv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the project root when `--project-path` is not
/// given.
pub const PROJECT_ENV_VAR: &str = "PROOFLAUNCH_PROJECT";

/// Default project directory under the user's home.
pub const DEFAULT_PROJECT_DIR_NAME: &str = "mcp-logic";

/// Default name of the server executable.
pub const DEFAULT_SERVER_BIN: &str = "mcp-logic";

const VENV_DIR_NAME: &str = ".venv";

/// Resolved paths for one launch.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Base project directory holding the server checkout.
    pub project_dir: PathBuf,
    /// Prerequisite virtual environment: `<project>/.venv`.
    pub venv_dir: PathBuf,
    /// Prover9/Mace4 binaries handed to the server: `<project>/ladr/bin`.
    pub prover_dir: PathBuf,
    /// Server executable name, resolved by the spawn strategy.
    pub server_bin: String,
}

impl LaunchConfig {
    /// Layered project path resolution: flag > environment variable >
    /// built-in default.
    pub fn resolve(
        flag: Option<PathBuf>,
        env_value: Option<OsString>,
        server_bin: String,
    ) -> Self {
        let project_dir = flag
            .or_else(|| env_value.map(PathBuf::from))
            .unwrap_or_else(default_project_dir);
        Self::from_project_dir(project_dir, server_bin)
    }

    /// Derive all paths from a project directory.
    pub fn from_project_dir(project_dir: PathBuf, server_bin: String) -> Self {
        let venv_dir = project_dir.join(VENV_DIR_NAME);
        let prover_dir = project_dir.join("ladr").join("bin");
        Self {
            project_dir,
            venv_dir,
            prover_dir,
            server_bin,
        }
    }

    /// Fatal precondition check: the virtual environment must be ready.
    pub fn validate(&self) -> Result<(), LaunchError> {
        venv::ensure_ready(&self.venv_dir, &self.project_dir)
    }
}

fn default_project_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DEFAULT_PROJECT_DIR_NAME),
        None => PathBuf::from(DEFAULT_PROJECT_DIR_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env() {
        let config = LaunchConfig::resolve(
            Some(PathBuf::from("/from/flag")),
            Some(OsString::from("/from/env")),
            DEFAULT_SERVER_BIN.to_string(),
        );
        assert_eq!(config.project_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn env_beats_default() {
        let config = LaunchConfig::resolve(
            None,
            Some(OsString::from("/from/env")),
            DEFAULT_SERVER_BIN.to_string(),
        );
        assert_eq!(config.project_dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn default_when_nothing_given() {
        let config = LaunchConfig::resolve(None, None, DEFAULT_SERVER_BIN.to_string());
        assert!(config.project_dir.ends_with(DEFAULT_PROJECT_DIR_NAME));
    }

    #[test]
    fn derived_paths_hang_off_project_dir() {
        let config = LaunchConfig::from_project_dir(
            PathBuf::from("/opt/logic"),
            DEFAULT_SERVER_BIN.to_string(),
        );
        assert_eq!(config.venv_dir, PathBuf::from("/opt/logic/.venv"));
        assert_eq!(config.prover_dir, PathBuf::from("/opt/logic/ladr/bin"));
    }

    #[test]
    fn prover_dir_ignores_trailing_slash() {
        let plain = LaunchConfig::from_project_dir(
            PathBuf::from("/opt/logic"),
            DEFAULT_SERVER_BIN.to_string(),
        );
        let trailing = LaunchConfig::from_project_dir(
            PathBuf::from("/opt/logic/"),
            DEFAULT_SERVER_BIN.to_string(),
        );
        assert_eq!(plain.prover_dir, trailing.prover_dir);
    }
}

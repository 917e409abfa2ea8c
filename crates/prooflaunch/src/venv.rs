//! Virtual environment resolution.
//!
//! A venv counts as ready when its interpreter exists, not merely the
//! directory. Activation is replaced by direct environment preparation on the
//! child command: VIRTUAL_ENV, PATH prepend, PYTHONHOME removal.

use crate::error::LaunchError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Interpreter location inside a venv.
pub fn interpreter_path(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

/// Script/binary directory inside a venv.
pub fn bin_dir(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts")
    } else {
        venv_dir.join("bin")
    }
}

/// Check whether the venv is usable (interpreter present).
pub fn is_ready(venv_dir: &Path) -> bool {
    interpreter_path(venv_dir).exists()
}

/// Fatal precondition check with operator remediation.
pub fn ensure_ready(venv_dir: &Path, project_dir: &Path) -> Result<(), LaunchError> {
    let remediation = format!(
        "Set up the environment first:\n    cd {} && uv venv && uv sync",
        project_dir.display()
    );

    if !venv_dir.is_dir() {
        return Err(LaunchError::PreconditionMissing {
            reason: format!("virtual environment not found at {}", venv_dir.display()),
            remediation,
        });
    }
    if !is_ready(venv_dir) {
        return Err(LaunchError::PreconditionMissing {
            reason: format!(
                "virtual environment at {} has no interpreter",
                venv_dir.display()
            ),
            remediation,
        });
    }
    Ok(())
}

/// Prepare a command to run inside the venv without shell activation.
pub fn apply_env(cmd: &mut Command, venv_dir: &Path) {
    cmd.env("VIRTUAL_ENV", venv_dir);
    cmd.env_remove("PYTHONHOME");

    let mut entries = vec![bin_dir(venv_dir)];
    if let Some(path) = std::env::var_os("PATH") {
        entries.extend(std::env::split_paths(&path));
    }
    if let Ok(joined) = std::env::join_paths(entries) {
        cmd.env("PATH", joined);
    }
}

/// Locate `uv`: PATH first, then well-known install locations.
pub fn find_uv() -> Option<PathBuf> {
    if let Ok(path) = which::which("uv") {
        return Some(path);
    }

    let home = dirs::home_dir()?;
    let candidates = [
        home.join(".cargo/bin/uv"),
        home.join(".local/bin/uv"),
        PathBuf::from("/usr/local/bin/uv"),
    ];
    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::{OsStr, OsString};

    #[test]
    fn interpreter_lives_under_venv() {
        let path = interpreter_path(Path::new("/opt/logic/.venv"));
        assert!(path.starts_with("/opt/logic/.venv"));
        assert!(path.to_string_lossy().contains("python"));
    }

    #[test]
    fn missing_venv_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_ready(&dir.path().join(".venv")));
    }

    #[test]
    fn ensure_ready_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let venv = dir.path().join(".venv");
        let err = ensure_ready(&venv, dir.path()).unwrap_err();
        assert!(matches!(err, LaunchError::PreconditionMissing { .. }));
        assert!(err.to_string().contains("not found"));
        assert!(err.remediation().unwrap().contains("uv venv"));
    }

    #[test]
    fn ensure_ready_reports_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let venv = dir.path().join(".venv");
        std::fs::create_dir_all(&venv).unwrap();
        let err = ensure_ready(&venv, dir.path()).unwrap_err();
        assert!(err.to_string().contains("no interpreter"));
    }

    #[test]
    fn ensure_ready_accepts_populated_venv() {
        let dir = tempfile::tempdir().unwrap();
        let venv = dir.path().join(".venv");
        std::fs::create_dir_all(bin_dir(&venv)).unwrap();
        std::fs::write(interpreter_path(&venv), "").unwrap();
        assert!(ensure_ready(&venv, dir.path()).is_ok());
    }

    #[test]
    fn apply_env_prepares_child_environment() {
        let venv = PathBuf::from("/opt/logic/.venv");
        let mut cmd = Command::new("true");
        apply_env(&mut cmd, &venv);

        let envs: HashMap<OsString, Option<OsString>> = cmd
            .get_envs()
            .map(|(k, v)| (k.to_os_string(), v.map(|v| v.to_os_string())))
            .collect();

        assert_eq!(
            envs.get(OsStr::new("VIRTUAL_ENV")),
            Some(&Some(venv.clone().into_os_string()))
        );
        // env_remove shows up as a None value
        assert_eq!(envs.get(OsStr::new("PYTHONHOME")), Some(&None));

        let path_value = envs
            .get(OsStr::new("PATH"))
            .cloned()
            .flatten()
            .expect("PATH should be set");
        let first = std::env::split_paths(&path_value).next().unwrap();
        assert_eq!(first, bin_dir(&venv));
    }
}

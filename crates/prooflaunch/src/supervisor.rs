//! Server process supervision.
//!
//! Sequential, blocking model: validate, spawn, wait. The only suspension
//! point is waiting on child termination, interruptible through a
//! [`ShutdownFlag`] raised by signal handlers. The child handle is owned
//! exclusively here and is reaped on every exit path.

use crate::config::LaunchConfig;
use crate::error::LaunchError;
use crate::preflight;
use crate::shutdown::ShutdownFlag;
use crate::venv;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Poll interval for child exit and shutdown checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the server gets to exit after a forwarded SIGTERM.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Exit status when shutdown is requested before the server was spawned.
const EXIT_INTERRUPTED: i32 = 130;

/// Supervision lifecycle. There is nothing beyond these four states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    NotStarted,
    Validating,
    Running,
    Exited(i32),
}

/// Owns one launch from validation to child exit.
pub struct Supervisor {
    config: LaunchConfig,
    shutdown: ShutdownFlag,
    state: LaunchState,
}

impl Supervisor {
    pub fn new(config: LaunchConfig, shutdown: ShutdownFlag) -> Self {
        Self {
            config,
            shutdown,
            state: LaunchState::NotStarted,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Validate, spawn, and wait. Returns the exit code to relay.
    pub fn run(&mut self) -> Result<i32, LaunchError> {
        self.state = LaunchState::Validating;
        self.config.validate()?;
        preflight::warn_missing_prover(&self.config.prover_dir);

        if self.shutdown.is_requested() {
            info!("shutdown requested before spawn, not starting server");
            self.state = LaunchState::Exited(EXIT_INTERRUPTED);
            return Ok(EXIT_INTERRUPTED);
        }

        let uv = venv::find_uv();
        if uv.is_none() {
            warn!("uv not found; starting the server directly from the venv");
        }
        let mut command = build_command(&self.config, uv.as_deref());
        let mut child = spawn_server(&mut command)?;
        self.state = LaunchState::Running;
        info!(
            pid = child.id(),
            "server started, prover path {}",
            self.config.prover_dir.display()
        );

        let code = supervise(&mut child, &self.shutdown);
        self.state = LaunchState::Exited(code);
        Ok(code)
    }
}

/// Build the server invocation.
///
/// With `uv` the runner carries the venv setup. Without it, the venv is
/// applied to the child environment directly and the executable is resolved
/// via the search path.
pub fn build_command(config: &LaunchConfig, uv: Option<&Path>) -> Command {
    let mut cmd = match uv {
        Some(uv_path) => {
            let mut cmd = Command::new(uv_path);
            cmd.arg("run").arg(&config.server_bin);
            cmd
        }
        None => {
            let mut cmd = Command::new(&config.server_bin);
            venv::apply_env(&mut cmd, &config.venv_dir);
            cmd
        }
    };

    cmd.arg("--prover-path").arg(&config.prover_dir);
    cmd.current_dir(&config.project_dir);

    // The server speaks MCP over stdio; pass the streams through untouched.
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    cmd
}

/// Spawn the server, mapping launch failures to the taxonomy.
pub fn spawn_server(command: &mut Command) -> Result<Child, LaunchError> {
    command.spawn().map_err(|source| LaunchError::SpawnFailure {
        program: command.get_program().to_string_lossy().into_owned(),
        source,
    })
}

/// Block until the child exits, honoring shutdown requests.
///
/// On a shutdown request the child receives SIGTERM, then SIGKILL after
/// [`SHUTDOWN_GRACE`]. The child is reaped before this returns.
pub fn supervise(child: &mut Child, shutdown: &ShutdownFlag) -> i32 {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return exit_code(status),
            Ok(None) => {}
            Err(err) => {
                error!("failed to poll server process: {err}");
                return kill_and_reap(child);
            }
        }

        if shutdown.is_requested() {
            return shutdown_child(child);
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn shutdown_child(child: &mut Child) -> i32 {
    info!(pid = child.id(), "forwarding termination to server");
    terminate(child);

    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while Instant::now() < deadline {
        match child.try_wait() {
            Ok(Some(status)) => return exit_code(status),
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(err) => {
                error!("failed to poll server process during shutdown: {err}");
                break;
            }
        }
    }

    warn!(
        "server did not exit within {}s, killing",
        SHUTDOWN_GRACE.as_secs()
    );
    kill_and_reap(child)
}

/// Ask the child to terminate. SIGTERM on Unix so the server can run its own
/// cleanup; hard kill elsewhere.
#[cfg(unix)]
fn terminate(child: &mut Child) {
    let pid = child.id() as libc::pid_t;
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        debug!(pid, "SIGTERM delivery failed, falling back to kill");
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

/// Last-resort cleanup: kill and reap, never leave an orphan behind.
fn kill_and_reap(child: &mut Child) -> i32 {
    let _ = child.kill();
    match child.wait() {
        Ok(status) => exit_code(status),
        Err(err) => {
            error!("failed to reap server process: {err}");
            1
        }
    }
}

/// Map an exit status to the code the launcher relays. A child killed by
/// signal N maps to 128 + N on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchConfig;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn test_config(project: &str) -> LaunchConfig {
        LaunchConfig::from_project_dir(PathBuf::from(project), "mcp-logic".to_string())
    }

    #[test]
    fn direct_command_resolves_server_by_name() {
        let cmd = build_command(&test_config("/opt/logic"), None);
        assert_eq!(cmd.get_program(), "mcp-logic");
    }

    #[test]
    fn uv_command_wraps_server_in_runner() {
        let cmd = build_command(&test_config("/opt/logic"), Some(Path::new("/usr/bin/uv")));
        assert_eq!(cmd.get_program(), "/usr/bin/uv");
        let args: Vec<OsString> = cmd.get_args().map(|a| a.to_os_string()).collect();
        assert_eq!(args[0], "run");
        assert_eq!(args[1], "mcp-logic");
    }

    #[test]
    fn command_always_carries_prover_path() {
        for uv in [None, Some(Path::new("/usr/bin/uv"))] {
            let cmd = build_command(&test_config("/opt/logic"), uv);
            let args: Vec<OsString> = cmd.get_args().map(|a| a.to_os_string()).collect();
            let flag_pos = args
                .iter()
                .position(|a| a == "--prover-path")
                .expect("--prover-path flag present");
            assert_eq!(
                args[flag_pos + 1],
                PathBuf::from("/opt/logic/ladr/bin").into_os_string()
            );
        }
    }

    #[test]
    fn prover_path_argument_ignores_trailing_slash() {
        let cmd = build_command(&test_config("/opt/logic/"), None);
        let args: Vec<OsString> = cmd.get_args().map(|a| a.to_os_string()).collect();
        assert!(args.contains(&PathBuf::from("/opt/logic/ladr/bin").into_os_string()));
    }

    #[test]
    fn supervisor_starts_not_started() {
        let supervisor = Supervisor::new(test_config("/opt/logic"), ShutdownFlag::new());
        assert_eq!(supervisor.state(), LaunchState::NotStarted);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_passes_through_normal_exit() {
        let status = Command::new("sh")
            .args(["-c", "exit 7"])
            .status()
            .expect("sh available");
        assert_eq!(exit_code(status), 7);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_maps_fatal_signal() {
        let status = Command::new("sh")
            .args(["-c", "kill -KILL $$"])
            .status()
            .expect("sh available");
        assert_eq!(exit_code(status), 128 + libc::SIGKILL);
    }
}

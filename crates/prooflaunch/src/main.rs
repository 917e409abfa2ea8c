//! prooflaunch: launcher for the mcp-logic theorem-proving server.
//!
//! Usage:
//!     prooflaunch --project-path ~/mcp-logic

use anyhow::Result;
use clap::Parser;
use prooflaunch::config::{LaunchConfig, DEFAULT_SERVER_BIN, PROJECT_ENV_VAR};
use prooflaunch::shutdown::ShutdownFlag;
use prooflaunch::supervisor::Supervisor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "prooflaunch", about = "Launcher for the mcp-logic MCP server")]
struct Args {
    /// Project directory holding the server checkout (.venv, ladr/bin).
    /// Falls back to $PROOFLAUNCH_PROJECT, then ~/mcp-logic.
    #[arg(long)]
    project_path: Option<PathBuf>,

    /// Server executable name
    #[arg(long, default_value = DEFAULT_SERVER_BIN)]
    server_bin: String,

    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = prooflaunch_logging::init_logging(prooflaunch_logging::LogConfig {
        app_name: "prooflaunch",
        verbose: args.verbose,
    }) {
        eprintln!("prooflaunch: failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let shutdown = ShutdownFlag::new();
    if let Err(err) = install_signal_handlers(&shutdown) {
        eprintln!("prooflaunch: failed to install signal handlers: {err:#}");
        return ExitCode::FAILURE;
    }

    let config = LaunchConfig::resolve(
        args.project_path,
        std::env::var_os(PROJECT_ENV_VAR),
        args.server_bin,
    );
    info!("Project: {}", config.project_dir.display());
    info!("Prover path: {}", config.prover_dir.display());

    let mut supervisor = Supervisor::new(config, shutdown);
    match supervisor.run() {
        Ok(code) => {
            info!("server exited with code {code}");
            to_exit_code(code)
        }
        Err(err) => {
            error!("{err}");
            eprintln!("prooflaunch: {err}");
            if let Some(source) = std::error::Error::source(&err) {
                eprintln!("  caused by: {source}");
            }
            if let Some(remediation) = err.remediation() {
                eprintln!("{remediation}");
            }
            to_exit_code(err.exit_code())
        }
    }
}

fn to_exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(unix)]
fn install_signal_handlers(shutdown: &ShutdownFlag) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let flag = shutdown.clone();
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received signal {sig}, shutting down server...");
            flag.request();
        }
    });
    Ok(())
}

#[cfg(windows)]
fn install_signal_handlers(shutdown: &ShutdownFlag) -> Result<()> {
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down server...");
        flag.request();
    })?;
    Ok(())
}

//! Launcher/supervisor for the `mcp-logic` theorem-proving server.
//!
//! Resolves the project directory, checks that its virtual environment is set
//! up, spawns the server with `--prover-path` pointing at the Prover9/Mace4
//! binaries, and supervises it until exit. The server speaks MCP over its
//! inherited standard streams; the launcher never touches that channel.

pub mod config;
pub mod error;
pub mod preflight;
pub mod shutdown;
pub mod supervisor;
pub mod venv;

pub use config::LaunchConfig;
pub use error::LaunchError;
pub use shutdown::ShutdownFlag;
pub use supervisor::{LaunchState, Supervisor};

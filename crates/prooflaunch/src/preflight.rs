//! Non-fatal prover toolchain probe.
//!
//! The server checks for `prover9` (then `prover9.exe`) under its
//! `--prover-path` at startup and aborts if neither exists. Surfacing the
//! missing toolchain here gives the operator the cause before the child's own
//! error; only the venv check is allowed to stop the launch.

use std::path::Path;
use tracing::{debug, warn};

const PROVER_CANDIDATES: &[&str] = &["prover9", "prover9.exe"];

/// Warn when the prover directory or its binaries are missing.
pub fn warn_missing_prover(prover_dir: &Path) {
    if !prover_dir.is_dir() {
        warn!(
            "prover directory {} does not exist; the server will fail to start",
            prover_dir.display()
        );
        return;
    }

    if PROVER_CANDIDATES
        .iter()
        .any(|name| prover_dir.join(name).exists())
    {
        debug!("found prover binaries under {}", prover_dir.display());
    } else {
        warn!(
            "no prover9 binary under {}; the server will fail to start",
            prover_dir.display()
        );
    }
}

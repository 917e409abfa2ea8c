//! Logging setup for the prooflaunch binary.
//!
//! Stdout belongs to the supervised server (it speaks MCP over its inherited
//! standard streams), so the launcher's own diagnostics go to stderr and a
//! size-capped log file only.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "prooflaunch=info";
const VERBOSE_LOG_FILTER: &str = "prooflaunch=debug";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration for the launcher.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a capped file writer and a stderr layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = CappedFileWriter::open(&log_dir, config.app_name)
        .context("Failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(stderr_filter),
        )
        .init();

    Ok(())
}

/// Tool home directory: ~/.prooflaunch (override with PROOFLAUNCH_HOME).
pub fn prooflaunch_home() -> PathBuf {
    if let Some(override_path) = std::env::var_os("PROOFLAUNCH_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".prooflaunch")
}

/// Log directory: ~/.prooflaunch/logs
pub fn logs_dir() -> PathBuf {
    prooflaunch_home().join("logs")
}

/// Ensure the log directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create log directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file that rolls to a single `.log.1` backup once the cap
/// is reached. Cloning shares the underlying file.
#[derive(Clone)]
struct CappedFileWriter {
    inner: Arc<Mutex<LogFile>>,
}

struct LogFile {
    file: File,
    path: PathBuf,
    size: u64,
}

impl CappedFileWriter {
    fn open(dir: &Path, app_name: &str) -> Result<Self> {
        let path = dir.join(format!("{app_name}.log"));
        let inner = LogFile::open(path.clone())
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }
}

impl LogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, path, size })
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("log.1")
    }

    /// Move the current file aside and start a fresh one.
    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backup = self.backup_path();
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        fs::rename(&self.path, &backup)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.size = 0;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.roll()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = CappedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

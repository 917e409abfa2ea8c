use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised by signal handlers and polled by the supervisor wait loop.
///
/// Uses an AtomicBool internally. Clone is cheap and shares state.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a new flag (not raised).
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Request shutdown.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

//! Cooperative cancellation shared by the display, fetch and scanner loops.
//!
//! The token wraps the same `Arc<AtomicBool>` shape the signal handler
//! writes to: `true` means stop has been requested. Loops poll it between
//! discrete steps (bytes, reads, LED moves); blocking socket calls are never
//! interrupted by it.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::{SIGINT, SIGTERM};

/// Keep-running flag, cleared asynchronously to request an early stop.
#[derive(Debug, Clone, Default)]
pub struct KeepRunning {
    stop: Arc<AtomicBool>,
}

impl KeepRunning {
    /// Creates a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that is cleared on SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if a signal handler cannot be registered.
    pub fn with_signals() -> io::Result<Self> {
        let token = Self::new();
        signal_hook::flag::register(SIGINT, Arc::clone(&token.stop))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&token.stop))?;
        Ok(token)
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }

    /// Clears the flag. Every clone observes it at its next poll.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        assert!(KeepRunning::new().is_running());
    }

    #[test]
    fn stop_is_seen_by_clones() {
        let token = KeepRunning::new();
        let other = token.clone();
        other.stop();
        assert!(!token.is_running());
        assert!(!other.is_running());
    }

    #[test]
    fn stop_crosses_threads() {
        let token = KeepRunning::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.stop())
            .join()
            .expect("join");
        assert!(!token.is_running());
    }
}

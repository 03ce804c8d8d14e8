//! Cooperative cancellation for rule evaluation and long-running analysis.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A caller-supplied cancellation signal. Cloning shares the same underlying flag; [`cancel`]
/// trips it for every clone. Rule closures and analysis routines poll [`is_cancelled`] and return
/// promptly once it flips.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

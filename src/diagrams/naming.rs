//! Collision-free names for rendered diagram files.
//!
//! Names follow `diagram-<unix-millis>-<n>.<format>`. `n` comes from a counter
//! owned by the [`DiagramNamer`] value, so every name issued by one namer is
//! distinct even when the clock does not move between calls. Separate runs
//! (or tests) each construct their own namer and never share state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issues output file names for one preprocessing run.
#[derive(Debug)]
pub struct DiagramNamer {
    next: AtomicU64,
    format: String,
}

impl DiagramNamer {
    /// A namer starting at 0, producing files with the given extension.
    pub fn new(format: impl Into<String>) -> Self {
        Self::starting_at(0, format)
    }

    pub fn starting_at(first: u64, format: impl Into<String>) -> Self {
        Self {
            next: AtomicU64::new(first),
            format: format.into(),
        }
    }

    /// Next unique file name. Safe to call from several threads.
    pub fn next_name(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("diagram-{}-{}.{}", unix_millis(), n, self.format)
    }

    /// How many names have been handed out (relative to the starting value).
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

//! Shared call journal for the in-memory platform and tracker

use std::sync::{Arc, Mutex};

/// Ordered log of calls made against in-memory collaborators.
///
/// Cloning shares the underlying log, so one journal handed to both the
/// platform and the tracker records their calls interleaved.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.into());
        }
    }

    /// Snapshot of all entries in call order
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

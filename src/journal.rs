use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::attendance::CheckIn;
use crate::config::JournalConfig;

/// Check-in Journal - recent check-ins in arrival order
///
/// "Who confirmed for last night's raid, and when?"
/// Bounded: once `max_entries` is reached the oldest entries are dropped.
pub struct Journal {
    config: JournalConfig,
    entries: RwLock<Vec<CheckIn>>,
    total_recorded: AtomicU64,
}

impl Journal {
    pub fn new(config: &JournalConfig) -> Self {
        Self {
            config: config.clone(),
            entries: RwLock::new(Vec::new()),
            total_recorded: AtomicU64::new(0),
        }
    }

    pub fn record(&self, check_in: &CheckIn) {
        if !self.config.enabled {
            return;
        }

        let mut entries = self.entries.write();
        entries.push(check_in.clone());
        self.total_recorded.fetch_add(1, Ordering::Relaxed);

        // Rotation: keep within max_entries
        if entries.len() > self.config.max_entries {
            let drain_count = entries.len() - self.config.max_entries;
            entries.drain(..drain_count);
        }
    }

    /// Search by session and/or player, most recent first
    pub fn search(&self, session_id: Option<&str>, user_id: Option<&str>, limit: usize) -> Vec<CheckIn> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|e| session_id.map_or(true, |s| e.session_id == s))
            .filter(|e| user_id.map_or(true, |u| e.user_id == u))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn recent(&self, count: usize) -> Vec<CheckIn> {
        self.search(None, None, count)
    }

    pub fn get_stats(&self) -> serde_json::Value {
        let entries = self.entries.read();
        serde_json::json!({
            "enabled": self.config.enabled,
            "current_entries": entries.len(),
            "max_entries": self.config.max_entries,
            "total_recorded": self.total_recorded.load(Ordering::Relaxed),
        })
    }
}

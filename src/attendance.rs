use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AttendanceConfig;
use crate::reliability::ReliabilityScore;

/// Attendance Ledger
///
/// Tracks check-ins per (session, player) and derives each player's
/// reliability score as `round((present + late * late_weight) / total * 100)`.
/// Checking in twice for the same session replaces the first answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn name(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(AttendanceError::UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("unknown attendance status '{0}' (expected present, late or absent)")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    pub session_id: String,
    pub user_id: String,
    pub status: AttendanceStatus,
    pub recorded_at: String,
}

/// Raw per-player tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    present: u64,
    late: u64,
    absent: u64,
}

impl Tally {
    fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    fn remove(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present = self.present.saturating_sub(1),
            AttendanceStatus::Late => self.late = self.late.saturating_sub(1),
            AttendanceStatus::Absent => self.absent = self.absent.saturating_sub(1),
        }
    }

    fn total(&self) -> u64 {
        self.present + self.late + self.absent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub user_id: String,
    pub total_sessions: u64,
    /// Sessions the player showed up to, on time or late
    pub attended_sessions: u64,
    pub late_sessions: u64,
    pub absent_sessions: u64,
    pub reliability_score: ReliabilityScore,
}

impl AttendanceStats {
    /// Percentage of sessions the player showed up to, late arrivals counted in full.
    /// 100 with no history.
    pub fn attendance_rate(&self) -> u8 {
        percent(self.attended_sessions, self.total_sessions).unwrap_or(100)
    }

    /// Absences are the no-shows
    pub fn no_show_count(&self) -> u64 {
        self.absent_sessions
    }

    /// Percentage of sessions missed. 0 with no history.
    pub fn no_show_rate(&self) -> u8 {
        percent(self.absent_sessions, self.total_sessions).unwrap_or(0)
    }
}

fn percent(part: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    Some((part.min(total) as f64 / total as f64 * 100.0).round() as u8)
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub check_in: CheckIn,
    /// Status of the check-in this one replaced, if any
    pub replaced: Option<AttendanceStatus>,
    pub stats: AttendanceStats,
}

pub struct AttendanceLedger {
    config: AttendanceConfig,
    default_score: ReliabilityScore,
    check_ins: DashMap<(String, String), CheckIn>,
    tallies: DashMap<String, Tally>,
}

impl AttendanceLedger {
    pub fn new(config: &AttendanceConfig, default_score: ReliabilityScore) -> Self {
        Self {
            config: config.clone(),
            default_score,
            check_ins: DashMap::new(),
            tallies: DashMap::new(),
        }
    }

    /// Record a check-in and return the player's updated stats
    pub fn record(
        &self,
        session_id: &str,
        user_id: &str,
        status: AttendanceStatus,
    ) -> Result<CheckInOutcome, AttendanceError> {
        let session_id = session_id.trim();
        let user_id = user_id.trim();
        if session_id.is_empty() {
            return Err(AttendanceError::EmptySessionId);
        }
        if user_id.is_empty() {
            return Err(AttendanceError::EmptyUserId);
        }

        let check_in = CheckIn {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            status,
            recorded_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        };

        // Tally lock is held across the check-in swap so both stay in step.
        let mut tally = self.tallies.entry(user_id.to_string()).or_default();
        let replaced = self
            .check_ins
            .insert((session_id.to_string(), user_id.to_string()), check_in.clone())
            .map(|previous| previous.status);
        if let Some(previous) = replaced {
            tally.remove(previous);
        }
        tally.add(status);
        let stats = self.stats_from(user_id, &tally);
        drop(tally);

        debug!(
            "Check-in {} for {} in session {} (score now {})",
            status, user_id, session_id, stats.reliability_score
        );

        Ok(CheckInOutcome {
            check_in,
            replaced,
            stats,
        })
    }

    pub fn stats(&self, user_id: &str) -> Option<AttendanceStats> {
        self.tallies
            .get(user_id)
            .map(|tally| self.stats_from(user_id, &tally))
    }

    /// Current score, falling back to the configured default for unknown players
    pub fn score(&self, user_id: &str) -> ReliabilityScore {
        self.stats(user_id)
            .map(|s| s.reliability_score)
            .unwrap_or(self.default_score)
    }

    pub fn session_check_ins(&self, session_id: &str) -> Vec<CheckIn> {
        let mut out: Vec<CheckIn> = self
            .check_ins
            .iter()
            .filter(|e| e.key().0 == session_id)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        out
    }

    pub fn all_stats(&self) -> Vec<AttendanceStats> {
        self.tallies
            .iter()
            .map(|e| self.stats_from(e.key(), e.value()))
            .collect()
    }

    pub fn get_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "players": self.tallies.len(),
            "check_ins": self.check_ins.len(),
            "late_weight": self.config.late_weight,
            "default_score": self.default_score.value(),
        })
    }

    fn stats_from(&self, user_id: &str, tally: &Tally) -> AttendanceStats {
        let total = tally.total();
        let weighted = tally.present as f64 + tally.late as f64 * self.config.late_weight;
        AttendanceStats {
            user_id: user_id.to_string(),
            total_sessions: total,
            attended_sessions: tally.present + tally.late,
            late_sessions: tally.late,
            absent_sessions: tally.absent,
            reliability_score: ReliabilityScore::from_attendance(weighted, total)
                .unwrap_or(self.default_score),
        }
    }
}

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attendance::{AttendanceError, AttendanceLedger, AttendanceStats, AttendanceStatus, CheckInOutcome};
use crate::config::Config;
use crate::journal::Journal;
use crate::leaderboard::{self, LeaderboardRow};
use crate::metrics::MetricsCounters;
use crate::noshow::{self, Rsvp, SessionForecast};
use crate::reliability::{
    achievements, classify_score, Achievement, InvalidScoreError, ReliabilityScore, ReliabilityTier,
};

/// Core reliability service - owns the ledger, journal and counters
pub struct ReliabilityService {
    pub config: Arc<Config>,
    pub ledger: Arc<AttendanceLedger>,
    pub journal: Arc<Journal>,
    pub metrics: Arc<MetricsCounters>,
}

/// Everything a profile page shows about a player's reliability
#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    #[serde(flatten)]
    pub stats: AttendanceStats,
    pub attendance_rate: u8,
    pub no_show_count: u64,
    pub no_show_rate: u8,
    pub tier: ReliabilityTier,
    pub achievements: Vec<Achievement>,
}

impl ReliabilityService {
    pub fn new(config: Config) -> Self {
        let default_score = config.default_score();
        let ledger = Arc::new(AttendanceLedger::new(&config.attendance, default_score));
        let journal = Arc::new(Journal::new(&config.journal));
        let metrics = Arc::new(MetricsCounters::new());

        info!(
            "Attendance ledger ready (late weight: {}, default score: {})",
            config.attendance.late_weight, default_score
        );

        Self {
            config: Arc::new(config),
            ledger,
            journal,
            metrics,
        }
    }

    pub fn classify(&self, score: i64) -> Result<ReliabilityTier, InvalidScoreError> {
        self.count(ReliabilityScore::new(score))
    }

    /// Classify a score as received on the wire (path segment, CLI arg)
    pub fn classify_str(&self, raw: &str) -> Result<ReliabilityTier, InvalidScoreError> {
        self.count(raw.parse::<ReliabilityScore>())
    }

    fn count(&self, score: Result<ReliabilityScore, InvalidScoreError>) -> Result<ReliabilityTier, InvalidScoreError> {
        match score {
            Ok(score) => {
                let tier = classify_score(score);
                self.metrics.inc_classification(tier.tier);
                Ok(tier)
            }
            Err(e) => {
                self.metrics.invalid_scores.fetch_add(1, Ordering::Relaxed);
                warn!("Rejected reliability score: {}", e);
                Err(e)
            }
        }
    }

    pub fn record_check_in(
        &self,
        session_id: &str,
        user_id: &str,
        status: AttendanceStatus,
    ) -> Result<CheckInOutcome, AttendanceError> {
        let outcome = self.ledger.record(session_id, user_id, status)?;
        self.journal.record(&outcome.check_in);
        self.metrics.inc_check_in(status);
        if let Some(previous) = outcome.replaced {
            debug!(
                "{} changed check-in for {} from {} to {}",
                user_id, session_id, previous, status
            );
        }
        Ok(outcome)
    }

    pub fn player_report(&self, user_id: &str) -> Option<PlayerReport> {
        let stats = self.ledger.stats(user_id)?;
        let tier = classify_score(stats.reliability_score);
        let attendance_rate = stats.attendance_rate();
        let no_show_rate = stats.no_show_rate();
        let achievements = achievements(
            stats.reliability_score,
            stats.total_sessions,
            attendance_rate,
            no_show_rate,
        );
        Some(PlayerReport {
            no_show_count: stats.no_show_count(),
            stats,
            attendance_rate,
            no_show_rate,
            tier,
            achievements,
        })
    }

    pub fn forecast(&self, rsvps: &[Rsvp]) -> SessionForecast {
        self.metrics.forecasts.fetch_add(1, Ordering::Relaxed);
        noshow::forecast(rsvps, |user| self.ledger.score(user))
    }

    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardRow> {
        let limit = limit.unwrap_or(self.config.leaderboard.default_limit);
        leaderboard::leaderboard(
            self.ledger
                .all_stats()
                .into_iter()
                .map(|s| (s.user_id, s.reliability_score)),
            limit,
        )
    }

    pub fn get_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": self.metrics.start_time.elapsed().as_secs(),
            "ledger": self.ledger.get_stats(),
            "journal": self.journal.get_stats(),
            "invalid_scores": self.metrics.invalid_scores.load(Ordering::Relaxed),
            "forecasts": self.metrics.forecasts.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noshow::RsvpResponse;
    use crate::reliability::Tier;

    fn service() -> ReliabilityService {
        ReliabilityService::new(Config::default())
    }

    #[test]
    fn test_classify_counts() {
        let s = service();
        assert_eq!(s.classify(88).unwrap().tier, Tier::Elite);
        assert!(s.classify(-1).is_err());
        assert!(s.classify_str("50.5").is_err());
        assert_eq!(s.classify_str("50").unwrap().tier, Tier::Unreliable);
        assert_eq!(s.metrics.classified(Tier::Elite), 1);
        assert_eq!(s.metrics.invalid_scores.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_check_in_flows_to_report_and_journal() {
        let s = service();
        for i in 0..10 {
            s.record_check_in(&format!("s{}", i), "alice", AttendanceStatus::Present)
                .unwrap();
        }
        let report = s.player_report("alice").unwrap();
        assert_eq!(report.stats.reliability_score.value(), 100);
        assert_eq!(report.tier.tier, Tier::Legendary);
        assert_eq!(report.attendance_rate, 100);
        assert_eq!(report.no_show_rate, 0);
        let ids: Vec<&str> = report.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["reliable", "consistent", "perfect"]);
        assert_eq!(s.journal.search(None, Some("alice"), 100).len(), 10);
        assert!(s.player_report("bob").is_none());
    }

    #[test]
    fn test_report_serializes_flat() {
        let s = service();
        s.record_check_in("s1", "alice", AttendanceStatus::Absent).unwrap();
        let json = serde_json::to_value(s.player_report("alice").unwrap()).unwrap();
        assert_eq!(json["user_id"], "alice");
        assert_eq!(json["reliability_score"], 0);
        assert_eq!(json["tier"]["tier"], "ghost");
        assert_eq!(json["attendance_rate"], 0);
        assert_eq!(json["no_show_count"], 1);
        assert_eq!(json["no_show_rate"], 100);
    }

    #[test]
    fn test_report_badges_follow_rates() {
        let s = service();
        // 9 on time, 1 late: score (9 + 0.8) / 10 = 98, attendance 100%
        for i in 0..9 {
            s.record_check_in(&format!("s{}", i), "bea", AttendanceStatus::Present).unwrap();
        }
        s.record_check_in("s9", "bea", AttendanceStatus::Late).unwrap();
        let report = s.player_report("bea").unwrap();
        assert_eq!(report.stats.reliability_score.value(), 98);
        let ids: Vec<&str> = report.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["reliable", "consistent", "perfect"]);

        // one absence breaks the perfect record
        s.record_check_in("s10", "bea", AttendanceStatus::Absent).unwrap();
        let report = s.player_report("bea").unwrap();
        assert_eq!(report.no_show_count, 1);
        assert_eq!(report.no_show_rate, 9);
        assert_eq!(report.attendance_rate, 91);
        let ids: Vec<&str> = report.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["consistent"]);
    }

    #[test]
    fn test_forecast_uses_ledger_scores() {
        let s = service();
        s.record_check_in("s1", "flaky", AttendanceStatus::Absent).unwrap();
        s.record_check_in("s2", "flaky", AttendanceStatus::Present).unwrap();
        let f = s.forecast(&[
            Rsvp { user_id: "flaky".into(), response: RsvpResponse::Yes },
            Rsvp { user_id: "newcomer".into(), response: RsvpResponse::Yes },
        ]);
        assert_eq!(f.predictions[0].user_id, "flaky");
        // 40 + 50 * 0.3 = 55
        assert_eq!(f.predictions[0].no_show_probability, 55);
        assert_eq!(f.predictions[1].no_show_probability, 0);
    }

    #[test]
    fn test_leaderboard_default_limit() {
        let s = ReliabilityService::new(
            Config::from_toml("[leaderboard]\ndefault_limit = 1\n").unwrap(),
        );
        s.record_check_in("s1", "a", AttendanceStatus::Present).unwrap();
        s.record_check_in("s1", "b", AttendanceStatus::Absent).unwrap();
        assert_eq!(s.leaderboard(None).len(), 1);
        assert_eq!(s.leaderboard(Some(10)).len(), 2);
        assert_eq!(s.leaderboard(None)[0].user_id, "a");
    }
}

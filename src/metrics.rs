//! Prometheus-compatible metrics exporter for squad-reliability
//!
//! Endpoint: GET /metrics (on the web API port, default 8095)

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::attendance::AttendanceStatus;
use crate::reliability::Tier;
use crate::service::ReliabilityService;

/// Counters updated from request handling
pub struct MetricsCounters {
    /// Successful classifications, indexed by tier rank
    pub classifications: [AtomicU64; 5],
    /// Scores rejected as invalid
    pub invalid_scores: AtomicU64,
    pub check_ins_present: AtomicU64,
    pub check_ins_late: AtomicU64,
    pub check_ins_absent: AtomicU64,
    /// Session forecasts computed
    pub forecasts: AtomicU64,
    pub start_time: Instant,
}

impl MetricsCounters {
    pub fn new() -> Self {
        Self {
            classifications: Default::default(),
            invalid_scores: AtomicU64::new(0),
            check_ins_present: AtomicU64::new(0),
            check_ins_late: AtomicU64::new(0),
            check_ins_absent: AtomicU64::new(0),
            forecasts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn inc_classification(&self, tier: Tier) {
        self.classifications[tier.rank() as usize].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_check_in(&self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.check_ins_present.fetch_add(1, Ordering::Relaxed),
            AttendanceStatus::Late => self.check_ins_late.fetch_add(1, Ordering::Relaxed),
            AttendanceStatus::Absent => self.check_ins_absent.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn classified(&self, tier: Tier) -> u64 {
        self.classifications[tier.rank() as usize].load(Ordering::Relaxed)
    }
}

impl Default for MetricsCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate Prometheus-format metrics text
pub fn render_metrics(service: &ReliabilityService) -> String {
    let mut out = String::with_capacity(2048);
    let c = &service.metrics;

    write_help_type(&mut out, "squad_reliability_up", "Whether the service is up.", "gauge");
    writeln!(out, "squad_reliability_up 1").ok();

    let uptime = c.start_time.elapsed().as_secs_f64();
    write_help_type(&mut out, "squad_reliability_uptime_seconds_total", "Uptime since start in seconds.", "counter");
    writeln!(out, "squad_reliability_uptime_seconds_total {:.3}", uptime).ok();

    write_help_type(&mut out, "squad_reliability_classifications_total", "Scores classified, by tier.", "counter");
    for tier in Tier::ALL {
        writeln!(
            out,
            "squad_reliability_classifications_total{{tier=\"{}\"}} {}",
            tier,
            c.classified(tier)
        )
        .ok();
    }

    write_help_type(&mut out, "squad_reliability_invalid_scores_total", "Scores rejected as outside 0..=100 or non-integral.", "counter");
    writeln!(out, "squad_reliability_invalid_scores_total {}", c.invalid_scores.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "squad_reliability_check_ins_total", "Check-ins recorded, by attendance status.", "counter");
    write_counter_if_nonzero(&mut out, "squad_reliability_check_ins_total", "status", "present", c.check_ins_present.load(Ordering::Relaxed));
    write_counter_if_nonzero(&mut out, "squad_reliability_check_ins_total", "status", "late", c.check_ins_late.load(Ordering::Relaxed));
    write_counter_if_nonzero(&mut out, "squad_reliability_check_ins_total", "status", "absent", c.check_ins_absent.load(Ordering::Relaxed));

    write_help_type(&mut out, "squad_reliability_forecasts_total", "No-show forecasts computed.", "counter");
    writeln!(out, "squad_reliability_forecasts_total {}", c.forecasts.load(Ordering::Relaxed)).ok();

    let ledger = service.ledger.get_stats();
    write_help_type(&mut out, "squad_reliability_players", "Players with at least one check-in.", "gauge");
    writeln!(out, "squad_reliability_players {}", ledger["players"].as_u64().unwrap_or(0)).ok();

    write_help_type(&mut out, "squad_reliability_build_info", "squad-reliability build information.", "gauge");
    writeln!(out, "squad_reliability_build_info{{version=\"{}\"}} 1", env!("CARGO_PKG_VERSION")).ok();

    out
}

// ── helpers ─────────────────────────────────────────

fn write_help_type(out: &mut String, name: &str, help: &str, metric_type: &str) {
    writeln!(out, "# HELP {} {}", name, help).ok();
    writeln!(out, "# TYPE {} {}", name, metric_type).ok();
}

fn write_counter_if_nonzero(out: &mut String, name: &str, label: &str, value: &str, count: u64) {
    if count > 0 {
        writeln!(out, "{}{{{}=\"{}\"}} {}", name, label, value, count).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_render_contains_counters() {
        let service = ReliabilityService::new(Config::default());
        service.classify(97).unwrap();
        service.classify(10).unwrap();
        service.classify(10).unwrap();
        let _ = service.classify(150);
        service
            .record_check_in("s1", "alice", AttendanceStatus::Late)
            .unwrap();

        let text = render_metrics(&service);
        assert!(text.contains("# TYPE squad_reliability_classifications_total counter"));
        assert!(text.contains("squad_reliability_classifications_total{tier=\"legendary\"} 1"));
        assert!(text.contains("squad_reliability_classifications_total{tier=\"ghost\"} 2"));
        assert!(text.contains("squad_reliability_invalid_scores_total 1"));
        assert!(text.contains("squad_reliability_check_ins_total{status=\"late\"} 1"));
        assert!(!text.contains("status=\"absent\""));
        assert!(text.contains("squad_reliability_players 1"));
    }
}

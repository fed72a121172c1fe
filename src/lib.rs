//! squad-reliability
//!
//! Attendance-based reliability scoring for gaming squads: badge tiers,
//! check-in ledger, achievements, no-show forecasts and leaderboards,
//! served over a small JSON API.

pub mod attendance;
pub mod config;
pub mod journal;
pub mod leaderboard;
pub mod metrics;
pub mod noshow;
pub mod reliability;
pub mod service;
pub mod web;

pub use reliability::{
    classify, classify_f64, classify_score, compare_tiers, InvalidScoreError, ReliabilityScore,
    ReliabilityTier, Tier,
};

//! Reliability scoring model
//!
//! A player's reliability score is the percentage of sessions they showed up
//! for. The score maps onto one of five badge tiers:
//!
//! | Score     | Tier       | Label           |
//! |-----------|------------|-----------------|
//! | 95 - 100  | legendary  | Leader Fiable   |
//! | 85 - 94   | elite      | Pilier de Squad |
//! | 70 - 84   | reliable   | Joueur Fiable   |
//! | 50 - 69   | unreliable | Incertain       |
//! | 0 - 49    | ghost      | Fantôme         |
//!
//! Classification is pure. Scores outside `0..=100` or non-integral values
//! are rejected with [`InvalidScoreError`].

pub mod achievements;
pub mod score;
pub mod tier;

pub use achievements::{achievements, Achievement, Rarity};
pub use score::{InvalidScoreError, ReliabilityScore};
pub use tier::{classify, classify_f64, classify_score, compare_tiers, ReliabilityTier, Tier};

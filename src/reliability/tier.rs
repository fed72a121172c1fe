use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::score::{InvalidScoreError, ReliabilityScore, MAX_SCORE};

/// Reliability badge tier, ordered from least to most reliable.
///
/// `Ord` follows the rank, so `Tier::Ghost < Tier::Legendary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ghost,
    Unreliable,
    Reliable,
    Elite,
    Legendary,
}

/// Threshold bands, highest first. Lower bound inclusive; each band ends
/// where the previous one starts, the top band ends at 100 inclusive.
const BANDS: [(u8, Tier); 5] = [
    (95, Tier::Legendary),
    (85, Tier::Elite),
    (70, Tier::Reliable),
    (50, Tier::Unreliable),
    (0, Tier::Ghost),
];

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Ghost,
        Tier::Unreliable,
        Tier::Reliable,
        Tier::Elite,
        Tier::Legendary,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Tier::Ghost => 0,
            Tier::Unreliable => 1,
            Tier::Reliable => 2,
            Tier::Elite => 3,
            Tier::Legendary => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Ghost => "ghost",
            Tier::Unreliable => "unreliable",
            Tier::Reliable => "reliable",
            Tier::Elite => "elite",
            Tier::Legendary => "legendary",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Legendary => "Leader Fiable",
            Tier::Elite => "Pilier de Squad",
            Tier::Reliable => "Joueur Fiable",
            Tier::Unreliable => "Incertain",
            Tier::Ghost => "Fantôme",
        }
    }

    /// Inclusive score range covered by this tier
    pub fn score_range(self) -> (u8, u8) {
        let min = self.min_score();
        let max = match self {
            Tier::Legendary => MAX_SCORE,
            _ => Tier::ALL[self.rank() as usize + 1].min_score() - 1,
        };
        (min, max)
    }

    fn min_score(self) -> u8 {
        BANDS
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(min, _)| *min)
            .unwrap_or(0)
    }

    // Presentation hints. The renderer may ignore these and key off `name()`.

    pub fn icon(self) -> &'static str {
        match self {
            Tier::Legendary => "trophy",
            Tier::Elite => "award",
            Tier::Reliable => "zap",
            Tier::Unreliable | Tier::Ghost => "ghost",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Legendary => "👑",
            Tier::Elite => "⭐",
            Tier::Reliable => "✅",
            Tier::Unreliable => "⚠️",
            Tier::Ghost => "👻",
        }
    }

    pub fn color_token(self) -> &'static str {
        match self {
            Tier::Legendary => "primary",
            Tier::Elite => "secondary",
            Tier::Reliable => "success",
            Tier::Unreliable => "warning",
            Tier::Ghost => "danger",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification result handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReliabilityTier {
    pub tier: Tier,
    pub label: &'static str,
    pub rank: u8,
}

impl From<Tier> for ReliabilityTier {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            label: tier.label(),
            rank: tier.rank(),
        }
    }
}

/// Classify an already validated score. Total over `0..=100`.
pub fn classify_score(score: ReliabilityScore) -> ReliabilityTier {
    let value = score.value();
    let tier = BANDS
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Ghost);
    tier.into()
}

/// Classify a raw integer score, rejecting anything outside `0..=100`.
pub fn classify(score: i64) -> Result<ReliabilityTier, InvalidScoreError> {
    ReliabilityScore::new(score).map(classify_score)
}

/// Classify a float score. Only exact integers in range are accepted.
pub fn classify_f64(score: f64) -> Result<ReliabilityTier, InvalidScoreError> {
    ReliabilityScore::from_f64(score).map(classify_score)
}

/// Total order over tiers by rank
pub fn compare_tiers(a: &ReliabilityTier, b: &ReliabilityTier) -> Ordering {
    a.rank.cmp(&b.rank)
}

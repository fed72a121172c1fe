use serde::Serialize;

use super::score::ReliabilityScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Rare,
    Epic,
    Legendary,
}

/// Secondary badge shown on a player's profile next to the tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
}

const RELIABLE: Achievement = Achievement {
    id: "reliable",
    name: "Fiable",
    description: "Score de fiabilité ≥ 95%",
    icon: "🏆",
    rarity: Rarity::Legendary,
};

const CONSISTENT: Achievement = Achievement {
    id: "consistent",
    name: "Régulier",
    description: "10+ sessions avec 90%+ de présence",
    icon: "⭐",
    rarity: Rarity::Rare,
};

const PERFECT: Achievement = Achievement {
    id: "perfect",
    name: "Présence Parfaite",
    description: "Aucun no-show sur 5+ sessions",
    icon: "💎",
    rarity: Rarity::Legendary,
};

const ACTIVE: Achievement = Achievement {
    id: "active",
    name: "Joueur Actif",
    description: "20+ sessions complétées",
    icon: "🎮",
    rarity: Rarity::Epic,
};

const LEADER: Achievement = Achievement {
    id: "leader",
    name: "Leader de Squad",
    description: "Score parfait sur 30+ sessions",
    icon: "👑",
    rarity: Rarity::Legendary,
};

const TOP_SCORE: u8 = 95;

/// Compute achievement badges from a player's attendance history.
///
/// Badges are independent and stack. Rates are whole percentages.
pub fn achievements(
    score: ReliabilityScore,
    total_sessions: u64,
    attendance_rate: u8,
    no_show_rate: u8,
) -> Vec<Achievement> {
    let top = score.value() >= TOP_SCORE;

    [
        (top, RELIABLE),
        (total_sessions >= 10 && attendance_rate >= 90, CONSISTENT),
        (total_sessions >= 5 && no_show_rate == 0, PERFECT),
        (total_sessions >= 20, ACTIVE),
        (top && total_sessions >= 30, LEADER),
    ]
    .into_iter()
    .filter_map(|(earned, badge)| earned.then_some(badge))
    .collect()
}

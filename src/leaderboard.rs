use serde::Serialize;

use crate::reliability::{classify_score, compare_tiers, ReliabilityScore, ReliabilityTier};

/// Anything that can be ranked by reliability tier
pub trait Tiered {
    fn reliability_tier(&self) -> ReliabilityTier;
}

impl Tiered for ReliabilityTier {
    fn reliability_tier(&self) -> ReliabilityTier {
        *self
    }
}

impl Tiered for ReliabilityScore {
    fn reliability_tier(&self) -> ReliabilityTier {
        classify_score(*self)
    }
}

/// Stable ascending sort by tier (ghost first). Items in the same tier keep
/// their relative order.
pub fn sort_by_tier<T: Tiered>(items: &mut [T]) {
    items.sort_by(|a, b| compare_tiers(&a.reliability_tier(), &b.reliability_tier()));
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub position: usize,
    pub user_id: String,
    pub reliability_score: ReliabilityScore,
    pub tier: ReliabilityTier,
}

/// Rank players best first: by tier, then raw score, then user id.
pub fn leaderboard<I>(entries: I, limit: usize) -> Vec<LeaderboardRow>
where
    I: IntoIterator<Item = (String, ReliabilityScore)>,
{
    let mut rows: Vec<(String, ReliabilityScore, ReliabilityTier)> = entries
        .into_iter()
        .map(|(user, score)| {
            let tier = classify_score(score);
            (user, score, tier)
        })
        .collect();

    rows.sort_by(|a, b| {
        compare_tiers(&b.2, &a.2)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (user_id, reliability_score, tier))| LeaderboardRow {
            position: i + 1,
            user_id,
            reliability_score,
            tier,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reliability::Tier;

    fn score(v: i64) -> ReliabilityScore {
        ReliabilityScore::new(v).unwrap()
    }

    #[test]
    fn test_five_users_sort_ascending() {
        let mut users = vec![score(99), score(12), score(72), score(55), score(88)];
        sort_by_tier(&mut users);
        let tiers: Vec<Tier> = users.iter().map(|s| s.reliability_tier().tier).collect();
        assert_eq!(
            tiers,
            vec![Tier::Ghost, Tier::Unreliable, Tier::Reliable, Tier::Elite, Tier::Legendary]
        );
    }

    #[test]
    fn test_sort_by_tier_is_stable_within_tier() {
        let mut users = vec![score(65), score(90), score(60)];
        sort_by_tier(&mut users);
        assert_eq!(users, vec![score(65), score(60), score(90)]);
    }

    #[test]
    fn test_leaderboard_order() {
        let rows = leaderboard(
            vec![
                ("dan".to_string(), score(72)),
                ("ana".to_string(), score(96)),
                ("bea".to_string(), score(99)),
                ("cid".to_string(), score(96)),
                ("eve".to_string(), score(12)),
            ],
            10,
        );
        let users: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["bea", "ana", "cid", "dan", "eve"]);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[4].tier.tier, Tier::Ghost);
    }

    #[test]
    fn test_leaderboard_limit() {
        let rows = leaderboard((0..10).map(|i| (format!("u{}", i), score(i * 10))), 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].user_id, "u9");
    }
}

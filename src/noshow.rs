use serde::{Deserialize, Serialize};

use crate::reliability::{classify_score, ReliabilityScore, Tier};

/// No-show predictor
///
/// Estimates how likely each player who answered "yes" or "maybe" is to not
/// turn up, from their reliability score and how firm the answer was.
///
///   risk  = 40 if score < 70, 20 if score < 85, else 0
///         + 35 if the answer was "maybe"
///         + (100 - score) * 0.3
///   proba = clamp(round(risk), 0, 95)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpResponse {
    Yes,
    Maybe,
    No,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rsvp {
    pub user_id: String,
    pub response: RsvpResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub user_id: String,
    pub reliability_score: ReliabilityScore,
    pub tier: Tier,
    pub no_show_probability: u8,
    pub risk_level: RiskLevel,
    pub factors: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionForecast {
    /// Sorted by no-show probability, highest first
    pub predictions: Vec<Prediction>,
    /// Rounded mean probability across predictions
    pub overall_risk: u8,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

const MAX_PROBABILITY: f64 = 95.0;
const PENALTY_PER_POINT: f64 = 0.3;

/// Predict the no-show risk of a single answer. `No` answers are not predicted.
pub fn predict_one(user_id: &str, score: ReliabilityScore, response: RsvpResponse) -> Option<Prediction> {
    if response == RsvpResponse::No {
        return None;
    }

    let value = score.value();
    let mut factors = Vec::new();
    let mut risk: f64 = 0.0;

    if value < 70 {
        risk += 40.0;
        factors.push("Fiabilité faible");
    } else if value < 85 {
        risk += 20.0;
        factors.push("Fiabilité moyenne");
    }

    if response == RsvpResponse::Maybe {
        risk += 35.0;
        factors.push("Réponse incertaine");
    }

    risk += (100.0 - value as f64) * PENALTY_PER_POINT;

    let probability = risk.round().clamp(0.0, MAX_PROBABILITY) as u8;
    let risk_level = match probability {
        p if p >= 50 => RiskLevel::High,
        p if p >= 25 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };

    if factors.is_empty() && probability < 10 {
        factors.push("Historique fiable");
    }

    Some(Prediction {
        user_id: user_id.to_string(),
        reliability_score: score,
        tier: classify_score(score).tier,
        no_show_probability: probability,
        risk_level,
        factors,
    })
}

/// Forecast a whole session. `score_of` supplies each player's current score.
pub fn forecast<F>(rsvps: &[Rsvp], score_of: F) -> SessionForecast
where
    F: Fn(&str) -> ReliabilityScore,
{
    let mut predictions: Vec<Prediction> = rsvps
        .iter()
        .filter_map(|r| predict_one(&r.user_id, score_of(&r.user_id), r.response))
        .collect();
    predictions.sort_by(|a, b| b.no_show_probability.cmp(&a.no_show_probability));

    let overall_risk = if predictions.is_empty() {
        0
    } else {
        let total: u64 = predictions.iter().map(|p| p.no_show_probability as u64).sum();
        (total as f64 / predictions.len() as f64).round() as u8
    };

    let count = |level: RiskLevel| predictions.iter().filter(|p| p.risk_level == level).count();
    let (high, medium, low) = (count(RiskLevel::High), count(RiskLevel::Medium), count(RiskLevel::Low));

    SessionForecast {
        predictions,
        overall_risk,
        high,
        medium,
        low,
    }
}

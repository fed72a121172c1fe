use serde::Deserialize;

use crate::reliability::ReliabilityScore;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_web_address")]
    pub address: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AttendanceConfig {
    /// Share of a session credited for a late arrival (0.0..=1.0)
    #[serde(default = "default_late_weight")]
    pub late_weight: f64,
    /// Score reported for players with no session history yet
    #[serde(default = "default_score")]
    pub default_score: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Max check-ins kept before the oldest are dropped
    #[serde(default = "default_journal_max")]
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_limit")]
    pub default_limit: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: default_web_address(),
            port: default_web_port(),
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            late_weight: default_late_weight(),
            default_score: default_score(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_journal_max(),
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: default_leaderboard_limit(),
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_web_address() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 8095 }
fn default_late_weight() -> f64 { 0.8 }
fn default_score() -> i64 { 100 }
fn default_journal_max() -> usize { 10_000 }
fn default_leaderboard_limit() -> usize { 50 }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load config '{}': {}", path, e))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ReliabilityScore::new(self.attendance.default_score)
            .map_err(|e| anyhow::anyhow!("attendance.default_score: {}", e))?;
        let weight = self.attendance.late_weight;
        if !(0.0..=1.0).contains(&weight) {
            anyhow::bail!("attendance.late_weight must be between 0.0 and 1.0, got {}", weight);
        }
        if self.journal.max_entries == 0 {
            anyhow::bail!("journal.max_entries must be at least 1");
        }
        Ok(())
    }

    /// Validated default score for players without history
    pub fn default_score(&self) -> ReliabilityScore {
        ReliabilityScore::new(self.attendance.default_score)
            .unwrap_or(ReliabilityScore::MAX)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest score considered a strong growth signal.
pub const HIGH_SCORE_THRESHOLD: i32 = 80;
pub const MEDIUM_SCORE_THRESHOLD: i32 = 60;

/// A startup record before the scorer has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDraft {
    pub name: String,
    pub description: String,
    pub growth_reason: String,
    pub source_link: String,
    pub sector: String,
    pub funding_stage: String,
    pub signal_type: String,
}

impl SignalDraft {
    pub fn into_scored(self, fetched_at: DateTime<Utc>) -> StartupSignal {
        let score = crate::scoring::growth_score(&self);
        StartupSignal {
            name: self.name,
            description: self.description,
            growth_reason: self.growth_reason,
            source_link: self.source_link,
            sector: self.sector,
            funding_stage: self.funding_stage,
            signal_type: self.signal_type,
            score,
            fetched_at,
        }
    }
}

/// A scored startup record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupSignal {
    pub name: String,
    pub description: String,
    pub growth_reason: String,
    pub source_link: String,
    pub sector: String,
    pub funding_stage: String,
    pub signal_type: String,
    pub score: i32,
    pub fetched_at: DateTime<Utc>,
}

impl StartupSignal {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub fn from_score(score: i32) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

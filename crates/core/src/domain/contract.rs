use crate::domain::signal::SignalDraft;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Unknown Startup";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_GROWTH_REASON: &str = "Growth signals detected";
pub const DEFAULT_SOURCE_LINK: &str = "https://example.com";
pub const DEFAULT_SECTOR: &str = "Technology";
pub const DEFAULT_FUNDING_STAGE: &str = "Early Stage";
pub const DEFAULT_SIGNAL_TYPE: &str = "News";

/// One startup object as the model emits it. Every key is optional; any
/// `score` the model adds is ignored because scoring happens locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmStartupSignal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub growth_reason: Option<String>,
    #[serde(default)]
    pub source_link: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub funding_stage: Option<String>,
    #[serde(default)]
    pub signal_type: Option<String>,
}

impl LlmStartupSignal {
    pub fn into_draft(self) -> SignalDraft {
        SignalDraft {
            name: or_default(self.name, DEFAULT_NAME),
            description: or_default(self.description, DEFAULT_DESCRIPTION),
            growth_reason: or_default(self.growth_reason, DEFAULT_GROWTH_REASON),
            source_link: or_default(self.source_link, DEFAULT_SOURCE_LINK),
            sector: or_default(self.sector, DEFAULT_SECTOR),
            funding_stage: or_default(self.funding_stage, DEFAULT_FUNDING_STAGE),
            signal_type: or_default(self.signal_type, DEFAULT_SIGNAL_TYPE),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

const RAW_PREVIEW_CHARS: usize = 300;

/// Where a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStage {
    /// Non-2xx status from the API.
    Http,
    /// 2xx body that did not carry a completion.
    Decode,
}

impl LlmStage {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmStage::Http => "http",
            LlmStage::Decode => "decode",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: LlmStage,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    /// First few hundred chars of the raw body, for log lines.
    pub fn raw_preview(&self) -> Option<String> {
        let raw = self.raw_output.as_deref()?;
        let mut preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        if raw.chars().count() > RAW_PREVIEW_CHARS {
            preview.push_str("...");
        }
        Some(preview)
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call failed at {}: {}",
            self.provider.as_str(),
            self.stage.as_str(),
            self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

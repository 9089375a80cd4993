//! One fetch cycle: ask the model, parse, score, rank. Any failure is absorbed
//! and replaced by the fallback list.

use crate::config::Settings;
use crate::domain::signal::StartupSignal;
use crate::fallback::fallback_signals;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::perplexity::PerplexityClient;
use crate::llm::{json, LlmClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const STARTUP_QUERY: &str = "\
Give me 10 early-stage SaaS startups that are likely to experience significant growth based on recent public signals.

For each startup, provide the following information in JSON format:
- name: Company name
- description: Brief description of what they do
- growth_reason: Specific reason why they show growth potential (funding, partnerships, market trends, etc.)
- source_link: URL or source of the signal
- sector: Industry sector
- funding_stage: Current funding stage
- signal_type: Type of signal (funding, partnership, acquisition, market demand, etc.)

Focus on startups that have shown recent activity like:
- Recent funding rounds
- Strategic partnerships
- Product launches
- Market expansion
- Regulatory changes affecting their sector
- Industry trends favoring their solution

Return the data as a JSON array with these exact field names.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    MissingCredential,
    Request,
    MalformedResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum SignalSource {
    Live,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub signals: Vec<StartupSignal>,
    pub source: SignalSource,
    pub fetched_at: DateTime<Utc>,
}

impl FetchOutcome {
    fn fallback(reason: FallbackReason, fetched_at: DateTime<Utc>) -> Self {
        Self {
            signals: fallback_signals(fetched_at),
            source: SignalSource::Fallback(reason),
            fetched_at,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SignalSource::Fallback(_))
    }

    /// Non-fatal message for the dashboard, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self.source {
            SignalSource::Live => None,
            SignalSource::Fallback(FallbackReason::MissingCredential) => {
                Some("No API key configured. Showing sample data.")
            }
            SignalSource::Fallback(FallbackReason::Request) => {
                Some("The signal API could not be reached. Showing sample data.")
            }
            SignalSource::Fallback(FallbackReason::MalformedResponse) => {
                Some("The signal API returned an unreadable answer. Showing sample data.")
            }
        }
    }
}

#[derive(Clone)]
pub struct SignalFetcher {
    client: Option<Arc<dyn LlmClient>>,
}

impl SignalFetcher {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self { client }
    }

    /// Builds the live client when a credential is configured. A client that
    /// fails to build is treated like a missing credential.
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.perplexity_api_key.is_none() {
            tracing::warn!("PERPLEXITY_API_KEY not set; fetcher runs in fallback-data mode");
            return Self::new(None);
        }

        match PerplexityClient::from_settings(settings) {
            Ok(client) => {
                tracing::info!(model = client.model(), "Perplexity client initialized");
                let client: Arc<dyn LlmClient> = Arc::new(client);
                Self::new(Some(client))
            }
            Err(err) => {
                tracing::error!(error = %err, "Perplexity client init failed; using fallback data");
                Self::new(None)
            }
        }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub async fn fetch(&self) -> FetchOutcome {
        let fetched_at = Utc::now();

        let Some(client) = &self.client else {
            return FetchOutcome::fallback(FallbackReason::MissingCredential, fetched_at);
        };

        tracing::info!(provider = client.provider().as_str(), "scanning for startup signals");
        let text = match client.complete(SYSTEM_PROMPT, STARTUP_QUERY).await {
            Ok(text) => text,
            Err(err) => {
                log_llm_error(&err);
                return FetchOutcome::fallback(FallbackReason::Request, fetched_at);
            }
        };
        tracing::debug!(len = text.len(), "received completion");

        let drafts = match json::parse_drafts(&text) {
            Ok(drafts) => drafts,
            Err(err) => {
                tracing::warn!(error = %err, "LLM output unusable; falling back to sample data");
                return FetchOutcome::fallback(FallbackReason::MalformedResponse, fetched_at);
            }
        };

        let mut signals: Vec<StartupSignal> = drafts
            .into_iter()
            .map(|d| d.into_scored(fetched_at))
            .collect();
        crate::scoring::rank(&mut signals);

        tracing::info!(count = signals.len(), "parsed startup signals");
        FetchOutcome {
            signals,
            source: SignalSource::Live,
            fetched_at,
        }
    }
}

fn log_llm_error(err: &anyhow::Error) {
    match err.downcast_ref::<LlmDiagnosticsError>() {
        Some(diag) => tracing::warn!(
            provider = diag.provider.as_str(),
            stage = diag.stage.as_str(),
            detail = %diag.detail,
            raw = diag.raw_preview().as_deref().unwrap_or(""),
            "LLM request failed; falling back to sample data"
        ),
        None => tracing::warn!(error = %err, "LLM request failed; falling back to sample data"),
    }
}

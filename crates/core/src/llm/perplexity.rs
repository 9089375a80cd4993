use crate::config::Settings;
use crate::llm::error::{LlmDiagnosticsError, LlmStage};
use crate::llm::{LlmClient, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct PerplexityClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl PerplexityClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_perplexity_api_key()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(settings.perplexity_timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url: settings.perplexity_base_url.clone(),
            model: settings.perplexity_model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request<'a>(&'a self, system_prompt: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        }
    }

    fn response_text(raw: &str) -> anyhow::Result<String> {
        let raw_json = serde_json::from_str::<serde_json::Value>(raw)
            .with_context(|| format!("failed to parse Perplexity response JSON: {raw}"))?;
        let parsed = serde_json::from_value::<ChatResponse>(raw_json.clone())
            .context("failed to decode Perplexity response into ChatResponse")?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(LlmDiagnosticsError {
                provider: Provider::Perplexity,
                stage: LlmStage::Decode,
                detail: "response has no choices".to_string(),
                raw_output: Some(raw.to_string()),
                raw_response_json: Some(raw_json),
            }
            .into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for PerplexityClient {
    fn provider(&self) -> Provider {
        Provider::Perplexity
    }

    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String> {
        let res = self
            .http
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&self.request(system_prompt, prompt))
            .send()
            .await
            .context("Perplexity request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Perplexity response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: Provider::Perplexity,
                stage: LlmStage::Http,
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let content = Self::response_text(&text)?;
        tracing::debug!(model = %self.model, len = content.len(), "Perplexity completion received");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

pub mod error;
pub mod json;
pub mod perplexity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Perplexity,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Perplexity => "perplexity",
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends one system + user prompt pair and returns the model's raw text.
    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String>;
}

pub mod cache;
pub mod domain;
pub mod fallback;
pub mod fetcher;
pub mod filter;
pub mod llm;
pub mod scoring;
pub mod storage;
pub mod summary;

pub mod config {
    use anyhow::Context;
    use std::str::FromStr;
    use std::time::Duration;

    pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
    pub const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
    pub const DEFAULT_PERPLEXITY_MODEL: &str = "llama-3-sonar-large-32k";
    pub const DEFAULT_PERPLEXITY_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub perplexity_api_key: Option<String>,
        pub perplexity_base_url: String,
        pub perplexity_model: String,
        pub perplexity_timeout: Duration,
        pub sentry_dsn: Option<String>,
        pub cache_ttl: Duration,
        pub port: u16,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_vars(|key| std::env::var(key).ok())
        }

        /// Builds settings from any key lookup. Blank values count as unset.
        pub fn from_vars<F>(get: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let var = |key: &str| {
                get(key)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            };

            Ok(Self {
                database_url: var("DATABASE_URL"),
                perplexity_api_key: var("PERPLEXITY_API_KEY"),
                perplexity_base_url: var("PERPLEXITY_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PERPLEXITY_BASE_URL.to_string()),
                perplexity_model: var("PERPLEXITY_MODEL")
                    .unwrap_or_else(|| DEFAULT_PERPLEXITY_MODEL.to_string()),
                perplexity_timeout: Duration::from_secs(parse_or(
                    "PERPLEXITY_TIMEOUT_SECS",
                    var("PERPLEXITY_TIMEOUT_SECS"),
                    DEFAULT_PERPLEXITY_TIMEOUT_SECS,
                )?),
                sentry_dsn: var("SENTRY_DSN"),
                cache_ttl: Duration::from_secs(parse_or(
                    "SIGNAL_CACHE_TTL_SECS",
                    var("SIGNAL_CACHE_TTL_SECS"),
                    DEFAULT_CACHE_TTL_SECS,
                )?),
                port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            })
        }

        pub fn require_perplexity_api_key(&self) -> anyhow::Result<&str> {
            self.perplexity_api_key
                .as_deref()
                .context("PERPLEXITY_API_KEY is required")
        }
    }

    fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match raw {
            Some(s) => s
                .parse::<T>()
                .with_context(|| format!("{key} must be a non-negative integer (got {s})")),
            None => Ok(default),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let vars: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_vars(|key| vars.get(key).cloned())
        }

        #[test]
        fn defaults_apply_when_unset() {
            let s = settings(&[]).unwrap();
            assert_eq!(s.database_url, None);
            assert_eq!(s.perplexity_api_key, None);
            assert_eq!(s.perplexity_base_url, DEFAULT_PERPLEXITY_BASE_URL);
            assert_eq!(s.perplexity_model, DEFAULT_PERPLEXITY_MODEL);
            assert_eq!(s.perplexity_timeout, Duration::from_secs(60));
            assert_eq!(s.cache_ttl, Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
            assert_eq!(s.port, DEFAULT_PORT);
            let err = s.require_perplexity_api_key().unwrap_err();
            assert!(err.to_string().contains("PERPLEXITY_API_KEY"));
        }

        #[test]
        fn blank_values_count_as_unset() {
            let s = settings(&[
                ("PERPLEXITY_API_KEY", "   "),
                ("PERPLEXITY_BASE_URL", ""),
                ("PERPLEXITY_MODEL", " "),
                ("PERPLEXITY_TIMEOUT_SECS", ""),
                ("PORT", " "),
            ])
            .unwrap();
            assert_eq!(s.perplexity_api_key, None);
            assert_eq!(s.perplexity_base_url, DEFAULT_PERPLEXITY_BASE_URL);
            assert_eq!(s.perplexity_model, DEFAULT_PERPLEXITY_MODEL);
            assert_eq!(s.perplexity_timeout, Duration::from_secs(60));
            assert_eq!(s.port, DEFAULT_PORT);
        }

        #[test]
        fn explicit_values_are_trimmed_and_parsed() {
            let s = settings(&[
                ("PERPLEXITY_API_KEY", " pplx-1 "),
                ("PERPLEXITY_BASE_URL", "http://localhost:9000"),
                ("PERPLEXITY_TIMEOUT_SECS", "15"),
                ("SIGNAL_CACHE_TTL_SECS", "0"),
                ("PORT", "8080"),
            ])
            .unwrap();
            assert_eq!(s.require_perplexity_api_key().unwrap(), "pplx-1");
            assert_eq!(s.perplexity_base_url, "http://localhost:9000");
            assert_eq!(s.perplexity_timeout, Duration::from_secs(15));
            assert_eq!(s.cache_ttl, Duration::ZERO);
            assert_eq!(s.port, 8080);
        }

        #[test]
        fn invalid_numbers_are_errors() {
            for key in ["PERPLEXITY_TIMEOUT_SECS", "SIGNAL_CACHE_TTL_SECS", "PORT"] {
                let err = settings(&[(key, "soon")]).unwrap_err();
                assert!(err.to_string().contains(key), "{key}: {err}");
            }
            assert!(settings(&[("PORT", "70000")]).is_err());
        }
    }
}

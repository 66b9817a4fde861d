//! Environment-driven configuration shared by every probe binary.

use anyhow::Result;
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_BUCKET: &str = "chat";
const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub app_id: Option<String>,
    pub bucket: String,
    pub chat_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// Supports both FASTGPT_API_KEY and FASTGPT_AUTH_TOKEN,
    /// and both FASTGPT_API_URL and FASTGPT_BASE_URL.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars()
    }

    /// Read configuration from the process environment only.
    fn from_vars() -> Result<Self> {
        let api_key = env::var("FASTGPT_API_KEY")
            .or_else(|_| env::var("FASTGPT_AUTH_TOKEN"))
            .map_err(|_| {
                anyhow::anyhow!("Missing API key: set FASTGPT_API_KEY or FASTGPT_AUTH_TOKEN")
            })?;

        let base_url = env::var("FASTGPT_API_URL")
            .or_else(|_| env::var("FASTGPT_BASE_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let app_id = env::var("FASTGPT_APP_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let bucket = env::var("FASTGPT_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let chat_timeout = timeout_from_env("FASTGPT_CHAT_TIMEOUT_SECS", DEFAULT_CHAT_TIMEOUT_SECS);
        let upload_timeout =
            timeout_from_env("FASTGPT_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS);

        Ok(Self::new(base_url, api_key)
            .with_app_id(app_id)
            .with_bucket(bucket)
            .with_timeouts(chat_timeout, upload_timeout))
    }

    /// Config with default bucket and timeouts, mostly for tests.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            app_id: None,
            bucket: DEFAULT_BUCKET.to_string(),
            chat_timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }

    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_timeouts(mut self, chat: Duration, upload: Duration) -> Self {
        self.chat_timeout = chat;
        self.upload_timeout = upload;
        self
    }

    /// First 20 characters of the key, safe to print.
    pub fn masked_key(&self) -> String {
        let visible: String = self.api_key.chars().take(20).collect();
        format!("{}...", visible)
    }
}

fn timeout_from_env(var: &str, default_secs: u64) -> Duration {
    let secs = env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default_secs)
        .clamp(1, 600);
    Duration::from_secs(secs)
}

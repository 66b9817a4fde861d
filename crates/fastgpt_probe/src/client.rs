//! Thin client for the FastGPT upload and chat-completion endpoints.
//!
//! Every call is a single request: no retries, no session state. The `send_*`
//! methods hand back the raw status and body so diagnostics can inspect
//! failures; `chat` and `upload_file` turn non-2xx answers into errors.

use crate::config::Config;
use crate::text::truncate_chars;
use crate::types::{ChatMessage, ChatOptions, ChatRequest, ChatResponse, UploadResponse, UploadedFile};
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use tracing::info;

pub const CHAT_PATH: &str = "/api/v1/chat/completions";
pub const UPLOAD_PATH: &str = "/api/common/file/upload";

const ERROR_BODY_PREVIEW: usize = 500;

/// Status and body of a response, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).with_context(|| {
            format!(
                "Unexpected response body: {}",
                truncate_chars(&self.body, ERROR_BODY_PREVIEW)
            )
        })
    }

    /// Body cut to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> &str {
        truncate_chars(&self.body, max_chars)
    }

    /// Turn a non-2xx response into an error naming `what` failed.
    pub fn error_for_status(self, what: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        anyhow::bail!(
            "{} failed (HTTP {}): {}",
            what,
            self.status,
            self.preview(ERROR_BODY_PREVIEW)
        )
    }

    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok(Self { status, body })
    }
}

pub struct FastGptClient {
    http: reqwest::Client,
    config: Config,
}

impl FastGptClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// POST a chat request and return the response regardless of status.
    pub async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<RawResponse> {
        let url = self.endpoint(CHAT_PATH);
        info!(%url, messages = request.messages.len(), detail = ?request.detail, "sending chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.chat_timeout)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Chat request to {} failed", url))?;

        RawResponse::read(response).await
    }

    /// Send a conversation and decode the completion.
    pub async fn chat(&self, messages: &[ChatMessage], options: ChatOptions) -> Result<ChatResponse> {
        let request = ChatRequest::new(messages, options);
        self.send_chat(&request)
            .await?
            .error_for_status("Chat request")?
            .json()
    }

    /// POST the upload form. `file = None` probes the endpoint without a file.
    pub async fn send_upload(&self, file: Option<&Path>, app_id: Option<&str>) -> Result<RawResponse> {
        let url = self.endpoint(UPLOAD_PATH);
        let metadata = upload_metadata(app_id);
        info!(%url, bucket = %self.config.bucket, data = %metadata, file = ?file, "sending upload request");

        let mut form = Form::new()
            .text("bucketName", self.config.bucket.clone())
            .text("data", metadata);

        if let Some(path) = file {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            form = form.part("file", Part::bytes(bytes).file_name(file_name_of(path)));
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Upload request to {} failed", url))?;

        RawResponse::read(response).await
    }

    /// Upload a local file and resolve its fileId from the returned preview URL.
    ///
    /// `app_id` is only needed with account-level API keys.
    pub async fn upload_file(&self, path: &Path, app_id: Option<&str>) -> Result<UploadedFile> {
        anyhow::ensure!(path.is_file(), "File not found: {}", path.display());

        let response = self
            .send_upload(Some(path), app_id)
            .await?
            .error_for_status("Upload")?;
        let upload: UploadResponse = response.json()?;
        Ok(upload.into_file(file_name_of(path)))
    }
}

/// JSON sent in the `data` form field.
fn upload_metadata(app_id: Option<&str>) -> String {
    match app_id {
        Some(id) => json!({ "appId": id }),
        None => json!({}),
    }
    .to_string()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

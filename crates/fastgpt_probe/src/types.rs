//! Request and response shapes for the chat and upload endpoints.

use crate::token::extract_file_id;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One part of a multi-part user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    FileUrl { name: String, url: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn file(file: &UploadedFile) -> Self {
        ContentPart::FileUrl {
            name: file.file_name.clone(),
            url: file.preview_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// A user prompt followed by one `file_url` part per file.
    pub fn user_with_files<'a>(
        prompt: impl Into<String>,
        files: impl IntoIterator<Item = &'a UploadedFile>,
    ) -> Self {
        let mut parts = vec![ContentPart::text(prompt)];
        parts.extend(files.into_iter().map(ContentPart::file));
        Self::user_parts(parts)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatOptions {
    pub stream: bool,
    pub detail: bool,
}

impl ChatOptions {
    pub fn detailed() -> Self {
        Self {
            detail: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<bool>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(messages: &'a [ChatMessage], options: ChatOptions) -> Self {
        Self {
            messages,
            stream: options.stream,
            detail: options.detail.then_some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn reply(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub preview_url: String,
}

impl UploadResponse {
    /// Resolve the fileId from the preview URL. An unreadable token leaves it empty.
    pub fn into_file(self, file_name: impl Into<String>) -> UploadedFile {
        let file_id = extract_file_id(&self.preview_url);
        if file_id.is_empty() {
            warn!(preview_url = %self.preview_url, "could not extract fileId from preview URL");
        }

        UploadedFile {
            file_id,
            file_name: file_name.into(),
            preview_url: self.preview_url,
        }
    }
}

/// A file accepted by the upload endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_id: String,
    pub file_name: String,
    pub preview_url: String,
}

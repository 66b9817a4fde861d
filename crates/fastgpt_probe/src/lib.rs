//! Library module for fastgpt_probe
//!
//! Diagnostics for a FastGPT deployment's file-upload and chat-completion
//! endpoints. The binaries in `src/bin` and `src/main.rs` are thin wrappers
//! around this crate:
//!
//! - [`token`] reads the fileId out of an upload's signed preview URL
//! - [`client`] talks to the two HTTP endpoints
//! - [`suite`] runs the end-to-end upload and chat probe

pub mod client;
pub mod config;
pub mod fixtures;
pub mod report;
pub mod suite;
pub mod text;
pub mod token;
pub mod types;

pub use client::{FastGptClient, RawResponse};
pub use config::Config;
pub use token::{
    extract_field, extract_file_id, is_token_expired, is_token_expired_at, is_valid_file_id,
    ExtractionFailed, TokenClaims,
};
pub use types::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, ContentPart, UploadResponse, UploadedFile,
};

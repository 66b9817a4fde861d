//! Helpers shared by the integration tests.

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fastgpt_probe::client::{CHAT_PATH, UPLOAD_PATH};
use fastgpt_probe::{Config, FastGptClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test API key (not a real key).
pub const TEST_API_KEY: &str = "fastgpt-test-key";

pub const TEST_FILE_ID: &str = "68f1c2a9b3e4d5f6a7b8c9d0";

/// Preview URL whose token payload is `payload`, shaped like the server's.
pub fn preview_url_with(payload: Value) -> String {
    format!(
        "http://fastgpt.local/api/common/file/read/test.txt?token=eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub fn preview_url(file_id: &str) -> String {
    preview_url_with(json!({
        "bucketName": "chat",
        "teamId": "65a0b1c2d3e4f5a6b7c8d9e0",
        "fileId": file_id,
        "exp": 4_102_444_800i64
    }))
}

pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

pub fn test_client(server: &MockServer) -> FastGptClient {
    let config = Config::new(server.uri(), TEST_API_KEY)
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5));
    FastGptClient::new(config).expect("should build client")
}

pub async fn mount_chat(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(content)))
        .mount(server)
        .await;
}

pub async fn mount_upload(server: &MockServer, file_id: &str) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "previewUrl": preview_url(file_id) })),
        )
        .mount(server)
        .await;
}

#!/usr/bin/env rust
//! Diagnostic tool to check API key permissions and endpoint health

use anyhow::Result;
use fastgpt_probe::fixtures::Fixtures;
use fastgpt_probe::report;
use fastgpt_probe::text::preview;
use fastgpt_probe::{ChatMessage, ChatOptions, ChatRequest, ChatResponse, Config, FastGptClient};
use reqwest::StatusCode;

const PROBE_FILE: (&str, &str) = ("test_diagnose.txt", "测试文件内容\nTest content");

#[tokio::main]
async fn main() -> Result<()> {
    report::init_tracing();

    let config = Config::from_env()?;

    report::banner("FastGPT API diagnostics");
    println!("\nAPI URL: {}", config.base_url);
    println!("API Key: {}\n", config.masked_key());

    let client = FastGptClient::new(config)?;

    // Each probe reports its own failure and the next one still runs
    if let Err(e) = probe_chat(&client).await {
        report::error("Request failed", &e);
    }
    if let Err(e) = probe_upload_without_file(&client).await {
        report::error("Request failed", &e);
    }
    if let Err(e) = probe_upload_with_file(&client).await {
        report::error("Request failed", &e);
    }

    print_checklist();
    Ok(())
}

async fn probe_chat(client: &FastGptClient) -> Result<()> {
    report::section("Test 1: Chat API");

    let messages = [ChatMessage::user("你好")];
    let response = client
        .send_chat(&ChatRequest::new(&messages, ChatOptions::default()))
        .await?;

    println!("Status: {}", response.status);
    if response.is_success() {
        report::ok("Chat API is available");
        if let Ok(chat) = response.json::<ChatResponse>() {
            if let Some(reply) = chat.reply() {
                println!("AI reply: {}", preview(reply, 100));
            }
        }
    } else {
        report::fail("Chat API failed");
        println!("Response: {}", response.preview(200));
    }
    Ok(())
}

async fn probe_upload_without_file(client: &FastGptClient) -> Result<()> {
    report::section("Test 2: File upload API (empty request)");

    let response = client.send_upload(None, None).await?;

    println!("Status: {}", response.status);
    println!("Body:");
    println!("{}", response.preview(500));

    match response.status {
        StatusCode::BAD_REQUEST => {
            println!("\n💡 400 is expected here (no file was sent)");
            report::ok("Upload endpoint exists and is reachable");
        }
        StatusCode::UNAUTHORIZED => {
            println!();
            report::fail("API key is invalid or lacks permission");
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            println!();
            report::fail("Internal server error");
            report::hint("Possible causes:");
            report::hint("  1. File upload is not enabled");
            report::hint("  2. Required environment variables are missing");
            report::hint("  3. Storage (GridFS/S3) is not configured correctly");
        }
        _ => {}
    }
    Ok(())
}

async fn probe_upload_with_file(client: &FastGptClient) -> Result<()> {
    report::section("Test 3: File upload API (real file)");

    let fixtures = Fixtures::create(&[PROBE_FILE])?;
    let path = fixtures.path(PROBE_FILE.0);

    let response = client.send_upload(Some(&path), None).await?;
    println!("Status: {}", response.status);

    if response.is_success() {
        report::ok("File upload succeeded!");
        match response.json::<serde_json::Value>() {
            Ok(json) => println!("Response: {}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("Response: {}", response.preview(1000)),
        }
    } else {
        report::fail("File upload failed");
        println!("Body:");
        println!("{}", response.preview(1000));
    }

    drop(fixtures);
    println!("\nRemoved test file: {}", PROBE_FILE.0);
    Ok(())
}

fn print_checklist() {
    report::section("Diagnosis summary");
    println!(
        r#"
If file upload fails, ask the FastGPT administrator to check:

1. File upload is enabled
   - "File selection" in the app settings

2. Storage is configured
   - GridFS (MongoDB): default setup
   - S3 compatible storage: needs environment variables

3. API key permissions
   - The key is allowed to upload files
   - Try an app-level API key (or set FASTGPT_APP_ID)

4. Server environment variables
   - MONGO_URI: MongoDB connection string
   - FILE_TOKEN_KEY: signing key for file tokens
"#
    );
}

#!/usr/bin/env rust
//! Upload a file with an explicit appId, then chat about it
//!
//! Account-level API keys can only upload when the request names an app.
//! Find the appId in the FastGPT console URL of the app (`/app/detail/<appId>`)
//! and put it in FASTGPT_APP_ID.

use anyhow::Result;
use colored::Colorize;
use fastgpt_probe::fixtures::Fixtures;
use fastgpt_probe::report;
use fastgpt_probe::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, Config, FastGptClient, UploadResponse,
};

const UPLOAD_FILE: &str = "test_upload.txt";
const UPLOAD_CONTENT: &str = "这是一个测试文件。

文件内容：
1. FastGPT 文件上传测试
2. 测试时间：2025-10-17
3. 功能：文件上传与对话

---结束---";

#[tokio::main]
async fn main() -> Result<()> {
    report::init_tracing();

    let config = Config::from_env()?;
    let Some(app_id) = config.app_id.clone() else {
        print_app_id_help();
        return Ok(());
    };

    report::banner("FastGPT file upload test");
    println!("\nAPI URL: {}", config.base_url);
    println!("API Key: {}", config.masked_key());
    println!("App ID:  {}\n", app_id);

    let client = FastGptClient::new(config)?;
    let fixtures = Fixtures::create(&[(UPLOAD_FILE, UPLOAD_CONTENT)])?;
    report::ok(&format!("Created test file: {}\n", UPLOAD_FILE));

    if let Err(e) = upload_then_chat(&client, &fixtures, &app_id).await {
        report::error("Test failed", &e);
    }

    drop(fixtures);
    println!("\n🧹 Removed test file: {}", UPLOAD_FILE);

    report::section("Done");
    Ok(())
}

async fn upload_then_chat(client: &FastGptClient, fixtures: &Fixtures, app_id: &str) -> Result<()> {
    report::section("Test 1: File upload");
    println!("📤 Uploading file...");

    let response = client
        .send_upload(Some(&fixtures.path(UPLOAD_FILE)), Some(app_id))
        .await?;

    if !response.is_success() {
        report::fail(&format!("Upload failed (HTTP {})", response.status));
        println!("\nBody:");
        println!("{}", response.preview(1000));
        return Ok(());
    }

    let body: serde_json::Value = response.json()?;
    report::ok("Upload succeeded!");
    println!("\nResponse:");
    println!("{}", serde_json::to_string_pretty(&body)?);

    let upload: UploadResponse = serde_json::from_value(body)?;
    let file = upload.into_file(UPLOAD_FILE);
    if !file.file_id.is_empty() {
        println!("\nExtracted fileId: {}", file.file_id);
    }

    report::section("Test 2: Chat with the file");
    println!("💬 Sending chat request...");

    let messages = [ChatMessage::user_with_files("请总结一下这个文件的内容", [&file])];
    let response = client
        .send_chat(&ChatRequest::new(&messages, ChatOptions::default()))
        .await?;

    if response.is_success() {
        let chat: ChatResponse = response.json()?;
        report::ok("Chat succeeded!");
        println!("\n📝 AI reply:");
        println!("{}\n", chat.reply().unwrap_or_default());
    } else {
        report::fail(&format!("Chat failed (HTTP {})", response.status));
        println!("{}", response.preview(500));
    }

    Ok(())
}

fn print_app_id_help() {
    eprintln!("{}", "❌ Error: set FASTGPT_APP_ID first".bright_red());
    println!("\nHow to find the appId:");
    println!("1. Log in to the FastGPT console");
    println!("2. Open the app detail page");
    println!("3. Copy it from the URL, e.g. /app/detail/64d8xxxx...");
    println!("4. Or ask your FastGPT administrator");
}

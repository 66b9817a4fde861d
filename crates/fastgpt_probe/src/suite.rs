//! End-to-end probe suite: upload files, then chat about them.
//!
//! Cases run in order and share uploads, so later cases reuse files uploaded
//! by earlier ones and upload lazily when run on their own. A failing case is
//! recorded and the run continues.

use crate::client::FastGptClient;
use crate::fixtures::Fixtures;
use crate::report;
use crate::text::preview;
use crate::token::is_valid_file_id;
use crate::types::{ChatMessage, ChatOptions, ChatResponse, UploadedFile};
use anyhow::{ensure, Context, Result};
use colored::Colorize;
use std::time::{Duration, Instant};

const PRIMARY_FILE: &str = "test.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteCase {
    PureTextChat,
    FileUpload,
    SingleFileChat,
    MultiFileUpload,
    MultiFileChat,
    MultiTurnChat,
    FileIdReference,
}

impl SuiteCase {
    pub const ALL: [SuiteCase; 7] = [
        SuiteCase::PureTextChat,
        SuiteCase::FileUpload,
        SuiteCase::SingleFileChat,
        SuiteCase::MultiFileUpload,
        SuiteCase::MultiFileChat,
        SuiteCase::MultiTurnChat,
        SuiteCase::FileIdReference,
    ];

    /// Command-line name of the case.
    pub fn slug(self) -> &'static str {
        match self {
            SuiteCase::PureTextChat => "text-chat",
            SuiteCase::FileUpload => "upload",
            SuiteCase::SingleFileChat => "file-chat",
            SuiteCase::MultiFileUpload => "multi-upload",
            SuiteCase::MultiFileChat => "multi-file-chat",
            SuiteCase::MultiTurnChat => "multi-turn",
            SuiteCase::FileIdReference => "file-id",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SuiteCase::PureTextChat => "Test 1: Pure text chat",
            SuiteCase::FileUpload => "Test 2: File upload",
            SuiteCase::SingleFileChat => "Test 3: Single-file chat",
            SuiteCase::MultiFileUpload => "Test 4: Multi-file upload",
            SuiteCase::MultiFileChat => "Test 5: Multi-file chat",
            SuiteCase::MultiTurnChat => "Test 6: Multi-turn chat with file history",
            SuiteCase::FileIdReference => "Test 7: fileId reference",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|case| case.slug() == slug)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseStatus {
    Passed { elapsed: Duration },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub case: SuiteCase,
    pub status: CaseStatus,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, CaseStatus::Passed { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteSummary {
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Percentage of passed cases; 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.passed() as f64 / self.total() as f64 * 100.0
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (SuiteCase, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            CaseStatus::Failed { error } => Some((o.case, error.as_str())),
            CaseStatus::Passed { .. } => None,
        })
    }

    pub fn print(&self) {
        report::section("Summary");
        println!("Total:        {}", self.total());
        println!("✅ Passed:    {}", self.passed());
        println!("❌ Failed:    {}", self.failed());
        println!("Success rate: {:.1}%\n", self.success_rate());

        if !self.all_passed() {
            println!("{}", "Failed cases:".bright_red());
            for (case, error) in self.failures() {
                println!("  ❌ {}", case.title());
                println!("     Error: {}", error);
            }
        }
    }
}

pub struct SuiteRunner<'a> {
    client: &'a FastGptClient,
    fixtures: &'a Fixtures,
    uploads: Vec<UploadedFile>,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(client: &'a FastGptClient, fixtures: &'a Fixtures) -> Self {
        Self {
            client,
            fixtures,
            uploads: Vec::new(),
        }
    }

    /// Files uploaded so far, in upload order.
    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    pub async fn run(&mut self, cases: &[SuiteCase]) -> SuiteSummary {
        let mut summary = SuiteSummary::default();

        for &case in cases {
            report::case_header(case.title());

            let started = Instant::now();
            let status = match self.run_case(case).await {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    println!(
                        "\n{} {} ({:.2}s)",
                        "✅".bright_green(),
                        case.title(),
                        elapsed.as_secs_f64()
                    );
                    CaseStatus::Passed { elapsed }
                }
                Err(err) => {
                    println!("\n{} {}", "❌".bright_red(), case.title());
                    report::error("Error", &err);
                    CaseStatus::Failed {
                        error: format!("{:#}", err),
                    }
                }
            };

            summary.outcomes.push(CaseOutcome { case, status });
        }

        summary
    }

    pub async fn run_case(&mut self, case: SuiteCase) -> Result<()> {
        match case {
            SuiteCase::PureTextChat => self.pure_text_chat().await,
            SuiteCase::FileUpload => self.file_upload().await,
            SuiteCase::SingleFileChat => self.single_file_chat().await,
            SuiteCase::MultiFileUpload => self.multi_file_upload().await,
            SuiteCase::MultiFileChat => self.multi_file_chat().await,
            SuiteCase::MultiTurnChat => self.multi_turn_chat().await,
            SuiteCase::FileIdReference => self.file_id_reference().await,
        }
    }

    async fn pure_text_chat(&mut self) -> Result<()> {
        let messages = [ChatMessage::user("你好，请介绍一下你自己。")];
        let response = self.chat(&messages, ChatOptions::default()).await?;

        ensure!(!response.choices.is_empty(), "Response has no choices");
        let reply = reply_of(&response)?;
        print_reply("AI reply", &reply, 200);
        Ok(())
    }

    async fn file_upload(&mut self) -> Result<()> {
        let uploaded = self.upload(PRIMARY_FILE).await?;

        ensure!(!uploaded.file_id.is_empty(), "Upload response has no fileId");
        ensure!(
            uploaded.file_id.len() == 24,
            "fileId has wrong length: {}",
            uploaded.file_id.len()
        );
        if !is_valid_file_id(&uploaded.file_id) {
            report::hint("fileId is 24 characters but not hexadecimal");
        }

        println!("\n📋 Upload result:");
        println!("  File:   {}", uploaded.file_name);
        println!("  fileId: {}", uploaded.file_id);
        println!("  URL:    {}", preview(&uploaded.preview_url, 80));
        Ok(())
    }

    async fn single_file_chat(&mut self) -> Result<()> {
        let file = self.ensure_uploaded(PRIMARY_FILE).await?;
        let messages = [ChatMessage::user_with_files("请总结一下这个文件的内容", [&file])];

        let response = self.chat(&messages, ChatOptions::default()).await?;
        let reply = reply_of(&response)?;
        print_reply("AI reply", &reply, 300);
        Ok(())
    }

    async fn multi_file_upload(&mut self) -> Result<()> {
        let fixtures = self.fixtures;
        for name in fixtures.names() {
            if self.find_upload(name).is_none() {
                let uploaded = self.upload(name).await?;
                report::ok(&format!("{} -> fileId: {}", name, uploaded.file_id));
            }
        }

        ensure!(self.uploads.len() >= 2, "Not enough files uploaded");
        Ok(())
    }

    async fn multi_file_chat(&mut self) -> Result<()> {
        self.multi_file_upload().await?;

        let messages = [ChatMessage::user_with_files(
            "请分析和对比这两个文件的内容",
            &self.uploads,
        )];
        let response = self.chat(&messages, ChatOptions::default()).await?;
        let reply = reply_of(&response)?;
        print_reply("AI reply", &reply, 300);
        Ok(())
    }

    async fn multi_turn_chat(&mut self) -> Result<()> {
        let file = self.ensure_uploaded(PRIMARY_FILE).await?;

        let first_prompt = "这个文件有几行内容？";
        let mut messages = vec![ChatMessage::user_with_files(first_prompt, [&file])];
        let first = reply_of(&self.chat(&messages, ChatOptions::default()).await?)?;

        println!("\n💬 Turn 1:");
        println!("  User: {}", first_prompt);
        println!("  AI:   {}", preview(&first, 150));

        // The file is not re-sent; the service must resolve it from history
        let second_prompt = "第二行的内容是什么？";
        messages.push(ChatMessage::assistant(first));
        messages.push(ChatMessage::user(second_prompt));
        let second = reply_of(&self.chat(&messages, ChatOptions::default()).await?)
            .context("Second turn failed")?;

        println!("\n💬 Turn 2:");
        println!("  User: {}", second_prompt);
        println!("  AI:   {}", preview(&second, 150));
        Ok(())
    }

    async fn file_id_reference(&mut self) -> Result<()> {
        let file = self.ensure_uploaded(PRIMARY_FILE).await?;

        let url_len = file.preview_url.chars().count();
        let id_len = file.file_id.chars().count();
        println!("\n📊 fileId analysis:");
        println!("  Preview URL length: {} chars", url_len);
        println!("  fileId length:      {} chars", id_len);
        println!("  Saved:              {} chars", url_len.saturating_sub(id_len));
        if url_len > 0 {
            println!(
                "  Saved ratio:        {:.1}%",
                (1.0 - id_len as f64 / url_len as f64) * 100.0
            );
        }

        let messages = [ChatMessage::user_with_files("读取这个文件", [&file])];
        let response = self.chat(&messages, ChatOptions::detailed()).await?;
        reply_of(&response)?;

        report::ok("fileId reference works");
        Ok(())
    }

    async fn chat(&self, messages: &[ChatMessage], options: ChatOptions) -> Result<ChatResponse> {
        println!("💬 Sending chat request...");
        self.client.chat(messages, options).await
    }

    /// Upload a fixture, replacing any earlier upload of the same name.
    async fn upload(&mut self, name: &str) -> Result<UploadedFile> {
        let path = self.fixtures.path(name);
        let app_id = self.client.config().app_id.clone();
        println!("📤 Uploading {}", name.bold());

        let uploaded = self.client.upload_file(&path, app_id.as_deref()).await?;
        self.uploads.retain(|f| f.file_name != uploaded.file_name);
        self.uploads.push(uploaded.clone());
        Ok(uploaded)
    }

    async fn ensure_uploaded(&mut self, name: &str) -> Result<UploadedFile> {
        match self.find_upload(name) {
            Some(file) => Ok(file.clone()),
            None => self.upload(name).await,
        }
    }

    fn find_upload(&self, name: &str) -> Option<&UploadedFile> {
        self.uploads.iter().find(|f| f.file_name == name)
    }
}

fn reply_of(response: &ChatResponse) -> Result<String> {
    let reply = response.reply().context("Response has no choices")?;
    ensure!(!reply.is_empty(), "AI reply is empty");
    Ok(reply.to_string())
}

fn print_reply(label: &str, reply: &str, max_chars: usize) {
    println!("\n📝 {}:", label);
    println!("  {}", preview(reply, max_chars));
}

#!/usr/bin/env rust
//! fastgpt_probe - end-to-end file upload and chat test for a FastGPT server
//!
//! Runs seven cases against the configured deployment:
//!
//!     | Case            | What it checks                                   |
//!     |-----------------|--------------------------------------------------|
//!     | text-chat       | plain chat completion answers                    |
//!     | upload          | upload returns a preview URL with a 24-char id   |
//!     | file-chat       | a `file_url` part is read by the model           |
//!     | multi-upload    | every sample file uploads                        |
//!     | multi-file-chat | several `file_url` parts in one message          |
//!     | multi-turn      | a later turn still sees the file from history    |
//!     | file-id         | detail mode works with fileId-sized references   |
//!
//! Usage:
//!     # Run every case
//!     fastgpt_probe
//!
//!     # Run selected cases (later cases upload what they need)
//!     fastgpt_probe upload file-chat
//!
//!     # List case names
//!     fastgpt_probe --list

use anyhow::Result;
use colored::*;
use fastgpt_probe::fixtures::Fixtures;
use fastgpt_probe::report;
use fastgpt_probe::suite::{SuiteCase, SuiteRunner};
use fastgpt_probe::{Config, FastGptClient};
use std::env;
use std::process::ExitCode;

enum Command {
    Run(Vec<SuiteCase>),
    List,
    Help,
}

/// Parse command line arguments into the cases to run
fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Ok(Command::Run(SuiteCase::ALL.to_vec()));
    }

    match args[0].as_str() {
        "--list" | "list" => return Ok(Command::List),
        "--help" | "-h" | "help" => return Ok(Command::Help),
        _ => {}
    }

    let cases = args
        .iter()
        .map(|slug| {
            SuiteCase::from_slug(slug).ok_or_else(|| {
                anyhow::anyhow!("Unknown case '{}'. Run with --list to see case names", slug)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Command::Run(cases))
}

async fn run(cases: Vec<SuiteCase>) -> Result<bool> {
    let config = Config::from_env()?;

    report::banner("FastGPT file upload & chat test");
    println!("API URL: {}", config.base_url);
    println!("API Key: {}", config.masked_key());
    if let Some(app_id) = &config.app_id {
        println!("App ID:  {}", app_id);
    }

    let client = FastGptClient::new(config)?;

    println!("\n📁 Preparing test files...");
    let fixtures = Fixtures::suite()?;
    for name in fixtures.names() {
        report::ok(&format!("Created {}", name));
    }

    let mut runner = SuiteRunner::new(&client, &fixtures);
    let summary = runner.run(&cases).await;
    summary.print();

    println!("\n🧹 Cleaning up test files in {}", fixtures.dir().display());
    drop(fixtures);

    Ok(summary.all_passed())
}

#[tokio::main]
async fn main() -> ExitCode {
    report::init_tracing();

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}: {}", "Error".bright_red(), e);
            return ExitCode::from(2);
        }
    };

    match command {
        Command::List => {
            for case in SuiteCase::ALL {
                println!("{:<16} {}", case.slug().cyan(), case.title());
            }
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Run(cases) => match run(cases).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                report::error("Test run failed", &e);
                ExitCode::FAILURE
            }
        },
    }
}

/// Print help message
fn print_help() {
    println!("{}", "Usage:".bright_green());
    println!("  fastgpt_probe [CASE...]");
    println!("  fastgpt_probe --list");
    println!();
    println!("{}", "Environment:".bright_yellow());
    println!("  FASTGPT_API_URL              server base URL (default http://localhost:3000)");
    println!("  FASTGPT_API_KEY              API key (required)");
    println!("  FASTGPT_APP_ID               app id, needed for account-level keys");
    println!("  FASTGPT_BUCKET               upload bucket (default chat)");
    println!("  FASTGPT_CHAT_TIMEOUT_SECS    chat timeout (default 60)");
    println!("  FASTGPT_UPLOAD_TIMEOUT_SECS  upload timeout (default 30)");
    println!();
}

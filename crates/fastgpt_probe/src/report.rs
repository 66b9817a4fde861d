//! Console output shared by the probe binaries.

use colored::Colorize;
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 70;

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

pub fn banner(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("  {}", title.bright_blue().bold());
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn section(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{}", title.bright_green());
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn case_header(title: &str) {
    println!("\n{}", "─".repeat(RULE_WIDTH).bright_black());
    println!("🧪 {}", title.bold());
    println!("{}", "─".repeat(RULE_WIDTH).bright_black());
}

pub fn ok(message: &str) {
    println!("{} {}", "✓".bright_green(), message);
}

pub fn fail(message: &str) {
    println!("{} {}", "✗".bright_red(), message);
}

pub fn hint(message: &str) {
    println!("{}", message.bright_yellow());
}

/// Print an error with its cause chain, plus a hint for common failures.
pub fn error(label: &str, err: &anyhow::Error) {
    eprintln!("{}: {:#}", label.bright_red(), err);
    if let Some(text) = hint_for(err) {
        eprintln!("{}", text.bright_yellow());
    }
}

/// Map common transport and auth failures to an actionable hint.
pub fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(http) = err.chain().find_map(|e| e.downcast_ref::<reqwest::Error>()) {
        if http.is_timeout() {
            return Some("Hint: Request timed out. The FastGPT server may be slow or unreachable.");
        }
        if http.is_connect() {
            return Some("Hint: Could not connect. Check FASTGPT_API_URL and your network.");
        }
    }

    let message = format!("{:#}", err).to_lowercase();
    if message.contains("401") || message.contains("unauthorized") {
        Some("Hint: API key may be invalid or lack permission. Check FASTGPT_API_KEY.")
    } else if message.contains("500") {
        Some("Hint: Server error. File storage (GridFS/S3) or FILE_TOKEN_KEY may be misconfigured.")
    } else if message.contains("appid") {
        Some("Hint: Account-level API keys need FASTGPT_APP_ID for uploads.")
    } else {
        None
    }
}

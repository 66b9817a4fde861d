#!/usr/bin/env rust
//! Inspect preview URLs offline: fileId, whether it is well-formed, expiry

use anyhow::Result;
use colored::Colorize;
use fastgpt_probe::{is_token_expired, is_valid_file_id, report, TokenClaims};
use std::env;

fn main() -> Result<()> {
    report::init_tracing();

    let urls: Vec<String> = env::args().skip(1).collect();
    if urls.is_empty() {
        anyhow::bail!("Usage: extract_file_id <preview-url>...");
    }

    for url in &urls {
        println!("{}", url.bright_black());

        let claims = match TokenClaims::from_url(url) {
            Ok(claims) => claims,
            Err(e) => {
                report::fail(&format!("Could not read token: {}", e));
                println!();
                continue;
            }
        };

        match claims.file_id() {
            Some(id) if is_valid_file_id(id) => report::ok(&format!("fileId: {}", id)),
            Some(id) => report::fail(&format!("fileId: {} (not a 24-char hex id)", id)),
            None => report::fail("token payload has no fileId"),
        }

        match claims.expires_at() {
            Some(exp) if is_token_expired(url) => {
                report::fail(&format!("token expired (exp {})", exp))
            }
            Some(exp) => report::ok(&format!("token valid until exp {}", exp)),
            None => println!("  token has no exp claim"),
        }
        println!();
    }

    Ok(())
}

//! Signed-token field extraction for preview URLs.
//!
//! The upload endpoint answers with a `previewUrl` whose `token` query
//! parameter is a JWT-like `header.payload.signature` string. The payload
//! segment is base64 JSON carrying the `fileId` and usually an `exp` claim.
//!
//! Extraction is best-effort: [`extract_field`] never fails, it returns an
//! empty string whenever the token is missing or malformed. Use
//! [`TokenClaims::from_url`] when the failure reason matters.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::Utc;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Claim holding the uploaded file's identifier
pub const FILE_ID_FIELD: &str = "fileId";

const EXPIRY_FIELD: &str = "exp";

static TOKEN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]token=([^&]+)").expect("token pattern compiles"));

/// Why a token payload could not be read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionFailed {
    #[error("URL has no token query parameter")]
    MissingToken,
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload segment is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("payload is not a JSON object: {0}")]
    InvalidJson(String),
}

/// Decoded payload of a preview-URL token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// Locate the `token` parameter in `url` and decode its payload.
    pub fn from_url(url: &str) -> Result<Self, ExtractionFailed> {
        let token = token_param(url).ok_or(ExtractionFailed::MissingToken)?;
        Self::from_token(token)
    }

    /// Decode the payload (segment index 1) of a dot-separated token.
    pub fn from_token(token: &str) -> Result<Self, ExtractionFailed> {
        let segment = token
            .split('.')
            .nth(1)
            .ok_or(ExtractionFailed::MissingPayload)?;

        let bytes = decode_segment(segment)?;
        let claims = serde_json::from_slice::<Map<String, Value>>(&bytes)
            .map_err(|e| ExtractionFailed::InvalidJson(e.to_string()))?;

        Ok(Self { claims })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// String value of a claim. Non-string values are treated as absent.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    pub fn file_id(&self) -> Option<&str> {
        self.str_field(FILE_ID_FIELD)
    }

    /// Expiry in seconds since the Unix epoch, if the token carries one.
    ///
    /// Numeric strings are accepted. A zero or unparsable `exp` means the
    /// token does not expire.
    pub fn expires_at(&self) -> Option<i64> {
        let secs = match self.claims.get(EXPIRY_FIELD)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64)?,
            _ => return None,
        };
        (secs != 0).then_some(secs)
    }

    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at().is_some_and(|exp| now_secs > exp)
    }
}

/// Extract `field_name` from the token payload embedded in `url`.
///
/// Returns an empty string if the token is absent, the payload cannot be
/// decoded, or the field is missing or not a string.
pub fn extract_field(url: &str, field_name: &str) -> String {
    match TokenClaims::from_url(url) {
        Ok(claims) => claims.str_field(field_name).unwrap_or_default().to_string(),
        Err(err) => {
            debug!(field = field_name, error = %err, "token field extraction failed");
            String::new()
        }
    }
}

/// Shorthand for `extract_field(url, "fileId")`.
pub fn extract_file_id(url: &str) -> String {
    extract_field(url, FILE_ID_FIELD)
}

/// A fileId is a 24 character hex string (a MongoDB ObjectId).
pub fn is_valid_file_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether the token in `url` carries an `exp` claim that has passed.
///
/// Unreadable tokens and tokens without `exp` are reported as not expired.
pub fn is_token_expired(url: &str) -> bool {
    is_token_expired_at(url, Utc::now().timestamp())
}

pub fn is_token_expired_at(url: &str, now_secs: i64) -> bool {
    TokenClaims::from_url(url)
        .map(|claims| claims.is_expired_at(now_secs))
        .unwrap_or(false)
}

fn token_param(url: &str) -> Option<&str> {
    TOKEN_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, ExtractionFailed> {
    let padded = pad_segment(segment);
    URL_SAFE
        .decode(&padded)
        .or_else(|_| STANDARD.decode(&padded))
        .map_err(|e| ExtractionFailed::InvalidBase64(e.to_string()))
}

/// Re-pad a base64 segment to a multiple of four characters.
fn pad_segment(segment: &str) -> String {
    let trimmed = segment.trim_end_matches('=');
    let padding = (4 - trimmed.len() % 4) % 4;
    format!("{}{}", trimmed, "=".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn preview_url(payload: &str) -> String {
        format!(
            "http://localhost:3000/api/common/file/read/test.txt?token=eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_extract_field_well_formed() {
        let url = preview_url(r#"{"fileId":"abc123"}"#);
        assert_eq!(extract_field(&url, "fileId"), "abc123");
    }

    #[test]
    fn test_extract_field_without_token() {
        let url = "http://localhost:3000/api/common/file/read/test.txt?id=42";
        assert_eq!(extract_field(url, "fileId"), "");
    }

    #[test]
    fn test_extract_field_single_segment() {
        let url = "http://localhost:3000/read?token=onlyonesegment";
        assert_eq!(extract_field(url, "fileId"), "");
        assert_eq!(
            TokenClaims::from_url(url),
            Err(ExtractionFailed::MissingPayload)
        );
    }

    #[test]
    fn test_extract_field_bad_base64() {
        let url = "http://localhost:3000/read?token=header.!!not*base64!!.sig";
        assert_eq!(extract_field(url, "fileId"), "");
        assert!(matches!(
            TokenClaims::from_url(url),
            Err(ExtractionFailed::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_extract_field_not_json() {
        let url = preview_url("definitely not json");
        assert_eq!(extract_field(&url, "fileId"), "");
        assert!(matches!(
            TokenClaims::from_url(&url),
            Err(ExtractionFailed::InvalidJson(_))
        ));
    }

    #[test]
    fn test_extract_field_json_array_is_not_a_payload() {
        let url = preview_url(r#"["fileId","abc123"]"#);
        assert_eq!(extract_field(&url, "fileId"), "");
    }

    #[test]
    fn test_extract_field_missing_field() {
        let url = preview_url(r#"{"teamId":"t1"}"#);
        assert_eq!(extract_field(&url, "fileId"), "");
    }

    #[test]
    fn test_extract_field_non_string_value() {
        let url = preview_url(r#"{"fileId":12345}"#);
        assert_eq!(extract_field(&url, "fileId"), "");
    }

    #[test]
    fn test_extract_field_is_idempotent() {
        let url = preview_url(r#"{"fileId":"abc123","exp":1}"#);
        let first = extract_field(&url, "fileId");
        let second = extract_field(&url, "fileId");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_field_every_padding_length() {
        // Payloads of 19, 20 and 21 bytes need two, one and zero padding chars
        for value in ["abc123", "abc1234", "abc12345"] {
            let payload = format!(r#"{{"fileId":"{}"}}"#, value);
            let url = preview_url(&payload);
            assert_eq!(extract_field(&url, "fileId"), value, "payload {}", payload);
        }
    }

    #[test]
    fn test_extract_field_accepts_existing_padding() {
        let segment = STANDARD.encode(r#"{"fileId":"abc123"}"#);
        assert!(segment.ends_with("=="));
        let url = format!("http://h/read?token=h.{}.s", segment);
        assert_eq!(extract_field(&url, "fileId"), "abc123");
    }

    #[test]
    fn test_extract_field_url_safe_alphabet() {
        let payload = r#"{"fileId":"abc","note":"~~~???"}"#;
        let segment = URL_SAFE_NO_PAD.encode(payload);
        assert!(segment.contains('-') || segment.contains('_'));
        let url = format!("http://h/read?token=h.{}.s", segment);
        assert_eq!(extract_field(&url, "note"), "~~~???");
    }

    #[test]
    fn test_extract_field_standard_alphabet() {
        let payload = r#"{"fileId":"abc","note":"~~~???"}"#;
        let segment = STANDARD.encode(payload);
        assert!(segment.contains('+') || segment.contains('/'));
        let url = format!("http://h/read?token=h.{}.s", segment);
        assert_eq!(extract_field(&url, "note"), "~~~???");
    }

    #[test]
    fn test_extract_field_ampersand_token() {
        let segment = URL_SAFE_NO_PAD.encode(r#"{"fileId":"abc123"}"#);
        let url = format!("http://h/read?bucket=chat&token=h.{}.s&filename=a.txt", segment);
        assert_eq!(extract_field(&url, "fileId"), "abc123");
    }

    #[test]
    fn test_extract_field_ignores_lookalike_parameter() {
        let segment = URL_SAFE_NO_PAD.encode(r#"{"fileId":"abc123"}"#);
        let url = format!("http://h/read?mytoken=h.{}.s", segment);
        assert_eq!(extract_field(&url, "fileId"), "");
    }

    #[test]
    fn test_extract_file_id() {
        let url = preview_url(r#"{"fileId":"68f1c2a9b3e4d5f6a7b8c9d0"}"#);
        let file_id = extract_file_id(&url);
        assert_eq!(file_id, "68f1c2a9b3e4d5f6a7b8c9d0");
        assert!(is_valid_file_id(&file_id));
    }

    #[test]
    fn test_is_valid_file_id() {
        assert!(is_valid_file_id("68f1c2a9b3e4d5f6a7b8c9d0"));
        assert!(is_valid_file_id("68F1C2A9B3E4D5F6A7B8C9D0"));
        assert!(!is_valid_file_id(""));
        assert!(!is_valid_file_id("68f1c2a9b3e4d5f6a7b8c9d"));
        assert!(!is_valid_file_id("68f1c2a9b3e4d5f6a7b8c9d0a"));
        assert!(!is_valid_file_id("68f1c2a9b3e4d5f6a7b8c9zz"));
    }

    #[test]
    fn test_token_expiry() {
        let url = preview_url(r#"{"fileId":"abc123","exp":1700000000}"#);
        assert!(!is_token_expired_at(&url, 1_699_999_999));
        assert!(!is_token_expired_at(&url, 1_700_000_000));
        assert!(is_token_expired_at(&url, 1_700_000_001));
    }

    #[test]
    fn test_token_expiry_without_exp_or_token() {
        let url = preview_url(r#"{"fileId":"abc123"}"#);
        assert!(!is_token_expired_at(&url, i64::MAX));
        assert!(!is_token_expired("http://h/read?id=1"));
    }

    #[test]
    fn test_token_expiry_zero_means_no_expiry() {
        let url = preview_url(r#"{"fileId":"abc123","exp":0}"#);
        assert!(!is_token_expired_at(&url, 1_700_000_000));
    }

    #[test]
    fn test_token_expiry_numeric_string() {
        let url = preview_url(r#"{"fileId":"abc123","exp":"1700000000"}"#);
        assert!(!is_token_expired_at(&url, 1_700_000_000));
        assert!(is_token_expired_at(&url, 1_700_000_001));

        let junk = preview_url(r#"{"fileId":"abc123","exp":"soon"}"#);
        assert!(!is_token_expired_at(&junk, i64::MAX));
    }

    #[test]
    fn test_claims_accessors() {
        let claims = TokenClaims::from_token(&format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(r#"{"fileId":"abc123","exp":1700000000.5,"teamId":"t1"}"#)
        ))
        .unwrap();
        assert_eq!(claims.file_id(), Some("abc123"));
        assert_eq!(claims.expires_at(), Some(1_700_000_000));
        assert_eq!(claims.str_field("teamId"), Some("t1"));
        assert!(claims.get("missing").is_none());
    }

    #[test]
    fn test_pad_segment() {
        assert_eq!(pad_segment("abcd"), "abcd");
        assert_eq!(pad_segment("abc"), "abc=");
        assert_eq!(pad_segment("ab"), "ab==");
        assert_eq!(pad_segment("ab=="), "ab==");
        assert_eq!(pad_segment("a"), "a===");
    }
}

use crate::error::CoreError;
use std::collections::BTreeMap;

/// Status code used when a request does not specify one.
pub const DEFAULT_STATUS_CODE: u16 = 301;

/// Target path stored for status codes that do not redirect anywhere.
pub const PLACEHOLDER_TARGET: &str = "/";

const MIN_STATUS_CODE: u16 = 100;
const MAX_STATUS_CODE: u16 = 599;

/// Returns true if the status code sends the client to a target uri.
pub fn status_code_supports_target(status_code: u16) -> bool {
    (300..400).contains(&status_code)
}

/// Parses a status code from a form or CSV value.
pub fn parse_status_code(raw: &str) -> Result<u16, CoreError> {
    let code: u16 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidStatusCode(raw.to_string()))?;
    if !(MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code) {
        return Err(CoreError::InvalidStatusCode(raw.to_string()));
    }
    Ok(code)
}

/// Labels offered in the status code selector of the form.
pub fn default_status_code_labels() -> BTreeMap<String, String> {
    [
        (301, "301 Moved Permanently"),
        (302, "302 Found"),
        (303, "303 See Other"),
        (307, "307 Temporary Redirect"),
        (308, "308 Permanent Redirect"),
        (403, "403 Forbidden"),
        (404, "404 Not Found"),
        (410, "410 Gone"),
        (451, "451 Unavailable For Legal Reasons"),
    ]
    .into_iter()
    .map(|(code, label)| (code.to_string(), label.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirecting_codes_support_target() {
        assert!(status_code_supports_target(301));
        assert!(status_code_supports_target(308));
        assert!(!status_code_supports_target(410));
        assert!(!status_code_supports_target(200));
    }

    #[test]
    fn parse_accepts_http_range() {
        assert_eq!(parse_status_code(" 302 ").unwrap(), 302);
        assert!(parse_status_code("99").is_err());
        assert!(parse_status_code("600").is_err());
        assert!(parse_status_code("abc").is_err());
    }

    #[test]
    fn labels_are_keyed_by_code() {
        let labels = default_status_code_labels();
        assert_eq!(labels.get("410").map(String::as_str), Some("410 Gone"));
    }
}

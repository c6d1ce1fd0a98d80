//! Utility functions shared across the reconciler
//!
//! - Base URL sanitisation for the REST clients
//! - Secret presence reporting for configuration logging
//! - Case-insensitive token matching used by both rule sets

/// Sanitize a base URL by removing trailing slashes and ensuring proper format
pub fn sanitize_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().to_string();

    while url.ends_with('/') {
        url.pop();
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{}", url);
    }

    url
}

/// Describe a credential for logs without revealing it
pub fn describe_secret(value: &str) -> &'static str {
    if value.trim().is_empty() {
        ">>>>> MISSING <<<<<"
    } else {
        "present"
    }
}

/// Lowercase and drop blank tokens; an empty token would match every title
pub fn normalize_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether `haystack` contains any of the already-normalized `tokens`,
/// ignoring case
pub fn contains_any_ignore_case(haystack: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    tokens.iter().any(|token| haystack.contains(token.as_str()))
}

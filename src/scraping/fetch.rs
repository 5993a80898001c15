//! Plain HTTP document fetch with stealth headers and block-page detection.

use aho_corasick::{AhoCorasick, MatchKind};
use rand::seq::IndexedRandom;
use reqwest::StatusCode;
use std::sync::OnceLock;
use tracing::debug;

use crate::core::error::SourceError;

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox 133 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari 17 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

/// Browser-like headers sent with every document request.
pub fn stealth_headers() -> [(&'static str, &'static str); 6] {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("DNT", "1"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
    ]
}

// Matched case-insensitively, leftmost-longest.
const BLOCK_MARKERS: &[(&str, &str)] = &[
    ("our systems have detected unusual traffic", "unusual_traffic"),
    ("unusual traffic", "unusual_traffic"),
    (
        "sorry, but your computer or network may be sending automated queries",
        "captcha",
    ),
    ("verify you are human", "captcha"),
    ("recaptcha", "captcha"),
    ("hcaptcha", "captcha"),
    ("captcha", "captcha"),
    ("authwall", "auth_wall"),
    ("sign in to view", "auth_wall"),
    ("enable javascript", "js_required"),
    ("access denied", "access_denied"),
];

static BLOCK_MATCHER: OnceLock<AhoCorasick> = OnceLock::new();

fn block_matcher() -> &'static AhoCorasick {
    BLOCK_MATCHER.get_or_init(|| {
        AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(BLOCK_MARKERS.iter().map(|(needle, _)| *needle))
            .expect("valid block-page markers")
    })
}

/// Classify a response as a block page. Returns a short reason label.
pub fn detect_block_reason(status: StatusCode, body: &str) -> Option<String> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => return Some("http_429".to_string()),
        StatusCode::FORBIDDEN => return Some("http_403".to_string()),
        StatusCode::SERVICE_UNAVAILABLE => return Some("http_503".to_string()),
        _ => {}
    }

    // Only the head of the document; result pages quote these words in snippets.
    let head_len = body
        .char_indices()
        .nth(20_000)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    if let Some(m) = block_matcher().find(&body[..head_len]) {
        let label = BLOCK_MARKERS[m.pattern().as_usize()].1;
        // Long documents that merely mention "captcha" are usually real results.
        if label != "captcha" || body.len() < 60_000 {
            return Some(label.to_string());
        }
    }

    None
}

/// GET `url` as a browser would and return the body of a successful, unblocked response.
pub async fn fetch_html(client: &reqwest::Client, url: reqwest::Url) -> Result<String, SourceError> {
    let mut req = client.get(url.clone()).header("User-Agent", random_user_agent());
    for (k, v) in stealth_headers() {
        req = req.header(k, v);
    }

    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if let Some(reason) = detect_block_reason(status, &body) {
        debug!("fetch {} blocked: {}", url, reason);
        return Err(SourceError::Blocked { reason });
    }
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!("http {}", status.as_u16())));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_blocks() {
        assert_eq!(
            detect_block_reason(StatusCode::TOO_MANY_REQUESTS, "").as_deref(),
            Some("http_429")
        );
        assert_eq!(detect_block_reason(StatusCode::OK, "<html>fine</html>"), None);
    }

    #[test]
    fn body_markers_are_blocks() {
        let body = "<html><body>Our systems have detected unusual traffic</body></html>";
        assert_eq!(
            detect_block_reason(StatusCode::OK, body).as_deref(),
            Some("unusual_traffic")
        );
        let wall = "<html><body><div class=authwall>Sign in to view Jane's profile</div></body></html>";
        assert_eq!(
            detect_block_reason(StatusCode::OK, wall).as_deref(),
            Some("auth_wall")
        );
    }

    #[test]
    fn user_agent_is_from_pool() {
        assert!(DESKTOP_USER_AGENTS.contains(&random_user_agent()));
    }
}

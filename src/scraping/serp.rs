//! Search-engine result pages: endpoints, result-card selectors and redirect unwrapping.

use base64::Engine as _;

use crate::core::error::SourceError;
use crate::extract::{collect_candidates, Candidate, SelectorSet};
use crate::scraping::fetch::fetch_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerpEngine {
    DuckDuckGo,
    Bing,
    Google,
}

const DDG_SELECTORS: SelectorSet = SelectorSet {
    item: &["div.result", "div.results_links"],
    title: &["a.result__a", "h2"],
    snippet: &["a.result__snippet", "div.result__snippet"],
    image: &["img.result__icon__img"],
    link: &["a.result__a"],
    location: &[],
};

const BING_SELECTORS: SelectorSet = SelectorSet {
    item: &["li.b_algo"],
    title: &["h2 a", "h2"],
    snippet: &["div.b_caption p", "p.b_lineclamp2", "p.b_lineclamp3", "p"],
    image: &["img.rms_img"],
    link: &["h2 a"],
    location: &[],
};

// Google markup changes often; several historic containers are tried.
const GOOGLE_SELECTORS: SelectorSet = SelectorSet {
    item: &["div#search div.MjjYud", "div#search div.g", "div.g"],
    title: &["h3"],
    snippet: &["div.VwiC3b", "div.IsZvec", "span.aCOpRe", "div.MUxGbd"],
    image: &["img.XNo5Ab", "g-img img"],
    link: &["a[href]"],
    location: &[],
};

impl SerpEngine {
    pub fn label(self) -> &'static str {
        match self {
            SerpEngine::DuckDuckGo => "duckduckgo",
            SerpEngine::Bing => "bing",
            SerpEngine::Google => "google",
        }
    }

    pub fn selectors(self) -> &'static SelectorSet {
        match self {
            SerpEngine::DuckDuckGo => &DDG_SELECTORS,
            SerpEngine::Bing => &BING_SELECTORS,
            SerpEngine::Google => &GOOGLE_SELECTORS,
        }
    }

    pub fn search_url(self, query: &str) -> Result<url::Url, SourceError> {
        let base = match self {
            SerpEngine::DuckDuckGo => "https://html.duckduckgo.com/html/",
            SerpEngine::Bing => "https://www.bing.com/search",
            SerpEngine::Google => "https://www.google.com/search",
        };
        let mut url =
            url::Url::parse(base).map_err(|e| SourceError::Unavailable(e.to_string()))?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("q", query);
            if self == SerpEngine::Google {
                qp.append_pair("hl", "en");
            }
        }
        Ok(url)
    }

    /// Resolve a result `href` to its destination URL.
    pub fn normalize_href(self, href: &str) -> Option<String> {
        match self {
            SerpEngine::DuckDuckGo => normalize_ddg_href(href),
            SerpEngine::Bing => normalize_bing_href(href),
            SerpEngine::Google => normalize_google_href(href),
        }
    }

    /// Parse a result page already in hand.
    pub fn parse(self, html: &str) -> Vec<Candidate> {
        collect_candidates(html, self.selectors(), &|href| self.normalize_href(href))
    }

    /// Fetch and parse the result page for `query` over plain HTTP.
    pub async fn search(
        self,
        client: &reqwest::Client,
        query: &str,
    ) -> Result<Vec<Candidate>, SourceError> {
        let body = fetch_html(client, self.search_url(query)?).await?;
        Ok(self.parse(&body))
    }
}

fn normalize_ddg_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let candidate = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    // Redirect links carry the destination in `uddg`.
    if let Ok(url) = url::Url::parse(&candidate) {
        if matches!(url.host_str(), Some("duckduckgo.com") | Some("html.duckduckgo.com"))
            && url.path().starts_with("/l/")
        {
            return url
                .query_pairs()
                .find(|(k, v)| k == "uddg" && !v.trim().is_empty())
                .map(|(_, v)| v.to_string());
        }
    }

    (candidate.starts_with("http://") || candidate.starts_with("https://")).then_some(candidate)
}

fn normalize_bing_href(href: &str) -> Option<String> {
    let href = href.trim();
    if !(href.starts_with("http://") || href.starts_with("https://")) {
        return None;
    }

    let Ok(url) = url::Url::parse(href) else {
        return Some(href.to_string());
    };

    if matches!(url.host_str(), Some("www.bing.com") | Some("bing.com"))
        && url.path().starts_with("/ck/")
    {
        // Observed format: u=a1<base64url(url)>
        if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "u") {
            let raw = v.trim_start_matches("a1");
            let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(raw.trim_end_matches('='))
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            if let Some(dest) = decoded {
                let dest = dest.trim();
                if dest.starts_with("http://") || dest.starts_with("https://") {
                    return Some(dest.to_string());
                }
            }
        }
    }

    Some(href.to_string())
}

fn normalize_google_href(href: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let url = url::Url::parse(&format!("https://www.google.com{}", href)).ok()?;
        return url
            .query_pairs()
            .find(|(k, v)| k == "q" && !v.is_empty())
            .map(|(_, v)| v.to_string());
    }
    if href.contains("google.com") {
        return None;
    }
    (href.starts_with("http://") || href.starts_with("https://")).then(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddg_redirects_are_unwrapped() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.linkedin.com%2Fin%2Fjane-doe&rut=abc";
        assert_eq!(
            normalize_ddg_href(href).as_deref(),
            Some("https://www.linkedin.com/in/jane-doe")
        );
        assert_eq!(normalize_ddg_href("javascript:void(0)"), None);
    }

    #[test]
    fn bing_ck_links_are_decoded() {
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode("https://www.linkedin.com/in/jane-doe");
        let href = format!("https://www.bing.com/ck/a?!&&p=x&u=a1{}&ntb=1", encoded);
        assert_eq!(
            normalize_bing_href(&href).as_deref(),
            Some("https://www.linkedin.com/in/jane-doe")
        );
        assert_eq!(
            normalize_bing_href("https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
    }

    #[test]
    fn google_internal_links_are_dropped() {
        assert_eq!(
            normalize_google_href("/url?q=https://github.com/jdoe&sa=U").as_deref(),
            Some("https://github.com/jdoe")
        );
        assert_eq!(normalize_google_href("https://maps.google.com/x"), None);
    }

    #[test]
    fn ddg_result_page_parses() {
        let html = r#"<html><body>
            <div class="result results_links">
              <h2 class="result__title"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.linkedin.com%2Fin%2Fjane-doe">Jane Doe - Staff Engineer - Acme | LinkedIn</a></h2>
              <a class="result__snippet">Staff Engineer at Acme. Location: Seattle, WA</a>
            </div>
        </body></html>"#;
        let candidates = SerpEngine::DuckDuckGo.parse(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].link.as_deref(),
            Some("https://www.linkedin.com/in/jane-doe")
        );
        assert!(candidates[0].title.starts_with("Jane Doe"));
    }

    #[test]
    fn search_url_encodes_query() {
        let url = SerpEngine::Bing
            .search_url("\"Jane Doe\" site:linkedin.com/in/")
            .unwrap();
        assert!(url.as_str().starts_with("https://www.bing.com/search?q="));
        assert!(url.query().unwrap().contains("site%3Alinkedin.com%2Fin%2F"));
    }
}

//! Rendered web-search page: people carousel, knowledge panel, then
//! professional-network result cards.

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use crate::core::error::ParseSkip;
use crate::core::types::{ProfileSummary, StrategyOutcome};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::{shares_word, SearchStrategy};
use crate::extract::{collect_from_document, extract_profiles, summarize, Candidate, SelectorSet};
use crate::scraping::serp::SerpEngine;

const NAME: &str = "people_panel";

// "People also search for" style carousels.
const PEOPLE_CAROUSEL: SelectorSet = SelectorSet {
    item: &[
        "div[data-attrid*='people'] g-inner-card",
        "g-scrolling-carousel g-inner-card",
        "div[data-attrid*='people'] a[data-entityname]",
    ],
    title: &["div.fl", "div[role='heading']", "span.ellip", "a[data-entityname]"],
    snippet: &["div.ellip", "span.rhsg4", "div.wwUB2c"],
    image: &["img"],
    link: &["a[href]"],
    location: &[],
};

const KNOWLEDGE_PANEL: SelectorSet = SelectorSet {
    item: &["div.kp-wholepage", "div.knowledge-panel", "div#rhs div.kp-blk"],
    title: &["h2[data-attrid='title']", "div[data-attrid='title']", "h2"],
    snippet: &[
        "div[data-attrid='subtitle']",
        "div.kno-rdesc span",
        "div[data-attrid='description'] span",
    ],
    image: &["g-img img", "img"],
    link: &["a[href*='linkedin.com/in/']", "div.kno-rdesc a[href]"],
    location: &["div[data-attrid*='location'] span.LrzXr", "div[data-attrid*='born'] span.LrzXr"],
};

fn keep_profile_link(link: Option<String>) -> String {
    link.filter(|l| Platform::classify(l) != Platform::Generic)
        .unwrap_or_default()
}

fn build_panel_record(candidate: &Candidate, query: &str) -> Result<ProfileSummary, ParseSkip> {
    let mut profile = summarize(candidate, NAME)?;
    if !shares_word(&profile.name, query) {
        return Err(ParseSkip(format!("{:?} does not match the query", profile.name)));
    }
    profile.profile_url = keep_profile_link(candidate.link.clone());
    Ok(profile)
}

fn build_result_card(candidate: &Candidate) -> Result<ProfileSummary, ParseSkip> {
    match candidate.link.as_deref() {
        Some(link) if Platform::classify(link) == Platform::ProfessionalNetwork => {
            summarize(candidate, NAME)
        }
        _ => Err(ParseSkip("not a profile result".to_string())),
    }
}

/// Parse a rendered result page. Panels first, organic profile cards last.
pub fn parse_rendered(html: &str, query: &str, limit: usize) -> Vec<ProfileSummary> {
    let doc = Html::parse_document(html);
    let normalize = |href: &str| SerpEngine::Google.normalize_href(href);

    for (label, selectors) in [("carousel", &PEOPLE_CAROUSEL), ("panel", &KNOWLEDGE_PANEL)] {
        let candidates = collect_from_document(&doc, selectors, &normalize);
        let found = extract_profiles(&candidates, limit, |c| build_panel_record(c, query));
        if !found.is_empty() {
            debug!(section = label, count = found.len(), "people panel matched");
            return found;
        }
    }

    let candidates = collect_from_document(&doc, SerpEngine::Google.selectors(), &normalize);
    extract_profiles(&candidates, limit, build_result_card)
}

pub struct PeoplePanelSearch;

#[async_trait]
impl SearchStrategy for PeoplePanelSearch {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requires_browser(&self) -> bool {
        true
    }

    async fn search(
        &self,
        ctx: &mut DiscoveryContext,
        query: &str,
        limit: usize,
    ) -> StrategyOutcome {
        let url = match SerpEngine::Google.search_url(&format!("{} linkedin", query)) {
            Ok(url) => url,
            Err(e) => return StrategyOutcome::Failed(e),
        };
        match ctx.browser.navigate(url.as_str()).await {
            Ok(html) => parse_rendered(&html, query, limit).into(),
            Err(e) => StrategyOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_panel_wins_over_result_cards() {
        let html = r#"<html><body>
            <div class="kp-wholepage">
              <h2 data-attrid="title">Grace Hopper</h2>
              <div data-attrid="subtitle">Computer scientist</div>
              <div class="kno-rdesc"><span>Rear Admiral at US Navy.</span></div>
              <a href="https://www.linkedin.com/in/grace-hopper">LinkedIn</a>
              <div data-attrid="kc:/people/person:born"><span class="LrzXr">New York, NY</span></div>
            </div>
            <div id="search"><div class="g"><a href="https://www.linkedin.com/in/someone-else"><h3>Someone Else - Clerk - Initech | LinkedIn</h3></a></div></div>
        </body></html>"#;
        let out = parse_rendered(html, "grace hopper", 5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Grace Hopper");
        assert_eq!(out[0].profile_url, "https://www.linkedin.com/in/grace-hopper");
        assert_eq!(out[0].location, "New York, NY");
        assert_eq!(out[0].source, NAME);
    }

    #[test]
    fn unrelated_panel_falls_through_to_cards() {
        let html = r#"<html><body>
            <div class="kp-wholepage"><h2 data-attrid="title">Initech</h2></div>
            <div id="search">
              <div class="g"><a href="/url?q=https://www.linkedin.com/in/jane-doe&amp;sa=U"><h3>Jane Doe - Staff Engineer - Acme | LinkedIn</h3></a><div class="VwiC3b">Seattle, WA</div></div>
              <div class="g"><a href="https://news.example/jane"><h3>Jane Doe wins award</h3></a></div>
            </div>
        </body></html>"#;
        let out = parse_rendered(html, "Jane Doe", 5);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].profile_url, "https://www.linkedin.com/in/jane-doe");
        assert_eq!(out[0].company, "Acme");
        assert_eq!(out[0].location, "Seattle, WA");
    }
}

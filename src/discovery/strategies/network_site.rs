//! The professional network's own people search, rendered in the browser.
//!
//! Anonymous sessions usually hit the sign-in wall; the session reports that
//! as `Blocked` and the chain moves on.

use async_trait::async_trait;

use crate::core::error::{ParseSkip, SourceError};
use crate::core::types::{ProfileSummary, StrategyOutcome};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::SearchStrategy;
use crate::extract::{collect_candidates, extract_profiles, summarize, Candidate, SelectorSet};

const NAME: &str = "network_site";

const PEOPLE_RESULTS: SelectorSet = SelectorSet {
    item: &[
        "li.reusable-search__result-container",
        "div.entity-result",
        "li.search-result",
    ],
    title: &[
        "span.entity-result__title-text a span[aria-hidden='true']",
        "span.entity-result__title-text",
        "span.actor-name",
    ],
    snippet: &[
        "div.entity-result__primary-subtitle",
        "p.subline-level-1",
        "div.entity-result__summary",
    ],
    image: &["img.presence-entity__image", "img.EntityPhoto-circle-3", "img"],
    link: &["span.entity-result__title-text a", "a.app-aware-link", "a.search-result__result-link"],
    location: &["div.entity-result__secondary-subtitle", "p.subline-level-2"],
};

pub fn people_search_url(query: &str) -> Result<url::Url, SourceError> {
    let mut url = url::Url::parse("https://www.linkedin.com/search/results/people/")
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    url.query_pairs_mut().append_pair("keywords", query);
    Ok(url)
}

/// Strip tracking parameters from result links; anything but a profile is dropped.
fn normalize_profile_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with('/') {
        format!("https://www.linkedin.com{}", href)
    } else {
        href.to_string()
    };
    let mut url = url::Url::parse(&absolute).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    (Platform::classify(url.as_str()) == Platform::ProfessionalNetwork).then(|| url.to_string())
}

fn build_record(candidate: &Candidate) -> Result<ProfileSummary, ParseSkip> {
    if candidate.link.is_none() {
        return Err(ParseSkip("result without profile link".to_string()));
    }
    // Out-of-network results render as "LinkedIn Member".
    if candidate.title.eq_ignore_ascii_case("LinkedIn Member") {
        return Err(ParseSkip("anonymized member".to_string()));
    }
    summarize(candidate, NAME)
}

pub fn parse_results(html: &str, limit: usize) -> Vec<ProfileSummary> {
    let candidates = collect_candidates(html, &PEOPLE_RESULTS, &normalize_profile_link);
    extract_profiles(&candidates, limit, build_record)
}

pub struct NetworkSiteSearch;

#[async_trait]
impl SearchStrategy for NetworkSiteSearch {
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
        let url = match people_search_url(query) {
            Ok(url) => url,
            Err(e) => return StrategyOutcome::Failed(e),
        };
        match ctx.browser.navigate(url.as_str()).await {
            Ok(html) => parse_results(&html, limit).into(),
            Err(e) => StrategyOutcome::Failed(e),
        }
    }
}

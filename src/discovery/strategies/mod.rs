//! Interchangeable source adapters.
//!
//! Search strategies are tried in the fixed order of [`default_search_chain`];
//! detail strategies are picked by the platform of the requested URL.

pub mod code_hosting;
pub mod generic_page;
pub mod indexed_network;
pub mod microblog;
pub mod network_detail;
pub mod network_site;
pub mod people_panel;
pub mod web_search;

use async_trait::async_trait;
use tracing::debug;

use crate::core::config::EngineConfig;
use crate::core::error::{ParseSkip, SourceError};
use crate::core::types::{ProfileDetail, ProfileSummary, StrategyOutcome};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::extract::{avatar_url, extract_profiles, patterns, summarize, Candidate};
use crate::scraping::serp::SerpEngine;

pub use code_hosting::CodeHostingDetail;
pub use generic_page::GenericPageDetail;
pub use indexed_network::IndexedNetworkSearch;
pub use microblog::MicroblogDetail;
pub use network_detail::NetworkDetail;
pub use network_site::NetworkSiteSearch;
pub use people_panel::PeoplePanelSearch;
pub use web_search::WebSearch;

#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Stable label, also written to each record's `source`.
    fn name(&self) -> &'static str;

    /// Browser-backed strategies are skipped once the session is unavailable.
    fn requires_browser(&self) -> bool {
        false
    }

    async fn search(
        &self,
        ctx: &mut DiscoveryContext,
        query: &str,
        limit: usize,
    ) -> StrategyOutcome;
}

#[async_trait]
pub trait DetailStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn platform(&self) -> Platform;

    /// Best-effort lookup of `url`. `name` is the display name derived from it.
    async fn fetch_detail(
        &self,
        ctx: &mut DiscoveryContext,
        url: &str,
        name: &str,
    ) -> Result<ProfileDetail, SourceError>;
}

/// Search strategies in priority order. Browser-backed ones are left out
/// when the browser is disabled.
pub fn default_search_chain(config: &EngineConfig) -> Vec<Box<dyn SearchStrategy>> {
    let chain: Vec<Box<dyn SearchStrategy>> = vec![
        Box::new(PeoplePanelSearch),
        Box::new(IndexedNetworkSearch::default()),
        Box::new(NetworkSiteSearch),
        Box::new(WebSearch::default()),
    ];
    chain
        .into_iter()
        .filter(|s| config.browser_enabled || !s.requires_browser())
        .collect()
}

/// One detail strategy per platform.
pub fn default_detail_strategies() -> Vec<Box<dyn DetailStrategy>> {
    vec![
        Box::new(NetworkDetail::default()),
        Box::new(MicroblogDetail::default()),
        Box::new(CodeHostingDetail),
        Box::new(GenericPageDetail),
    ]
}

/// Whether `text` contains a word of `query` (case-insensitive, single letters ignored).
pub(crate) fn shares_word(text: &str, query: &str) -> bool {
    let words = text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 1)
        .any(|w| words.contains(&w))
}

/// Query `engines` in order; records come from the first engine whose page
/// yields any. `Ok(empty)` when some engine answered but nothing qualified,
/// the last error when none answered.
pub(crate) async fn first_serp_hit<F>(
    http: &reqwest::Client,
    engines: &[SerpEngine],
    query: &str,
    limit: usize,
    mut build: F,
) -> Result<Vec<ProfileSummary>, SourceError>
where
    F: FnMut(&Candidate) -> Result<ProfileSummary, ParseSkip> + Send,
{
    let mut last_err = None;
    let mut answered = false;
    for engine in engines {
        match engine.search(http, query).await {
            Ok(candidates) => {
                answered = true;
                let found = extract_profiles(&candidates, limit, &mut build);
                debug!(
                    engine = engine.label(),
                    candidates = candidates.len(),
                    kept = found.len(),
                    "serp page parsed"
                );
                if !found.is_empty() {
                    return Ok(found);
                }
            }
            Err(e) => {
                debug!(engine = engine.label(), error = %e, "serp request failed");
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) if !answered => Err(e),
        _ => Ok(Vec::new()),
    }
}

/// First SERP candidate accepted by `accept`, across `engines` in order.
pub(crate) async fn first_serp_match<F>(
    http: &reqwest::Client,
    engines: &[SerpEngine],
    query: &str,
    accept: F,
) -> Result<Candidate, SourceError>
where
    F: Fn(&Candidate) -> bool + Send + Sync,
{
    let mut last_err = None;
    for engine in engines {
        match engine.search(http, query).await {
            Ok(candidates) => {
                if let Some(hit) = candidates.into_iter().find(|c| accept(c)) {
                    return Ok(hit);
                }
            }
            Err(e) => {
                debug!(engine = engine.label(), error = %e, "serp request failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        SourceError::MissingMarkup(format!("no matching result for {:?}", query))
    }))
}

/// Turn a matched SERP candidate into a detail record for `url`.
pub(crate) fn detail_from_candidate(
    ctx: &mut DiscoveryContext,
    candidate: &Candidate,
    platform: Platform,
    source: &str,
    url: &str,
    name: &str,
) -> ProfileDetail {
    let summary = summarize(candidate, source).unwrap_or_else(|_| ProfileSummary {
        name: name.to_string(),
        profile_image: avatar_url(name),
        bio: candidate.snippet.clone(),
        source: source.to_string(),
        ..ProfileSummary::default()
    });

    let mut detail = ProfileDetail::from_summary(ProfileSummary {
        profile_url: url.to_string(),
        ..summary
    });
    if let Some(email) = patterns::find_email(&candidate.snippet) {
        detail.email = email;
    }
    detail.social_links.absorb(url);
    detail.reputation_score = ctx.reputation(platform);
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order_is_fixed() {
        let names: Vec<_> = default_search_chain(&EngineConfig::default())
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            vec!["people_panel", "indexed_network", "network_site", "web_search"]
        );
    }

    #[test]
    fn disabled_browser_drops_browser_strategies() {
        let chain = default_search_chain(&EngineConfig::offline());
        let names: Vec<_> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["indexed_network", "web_search"]);
        assert!(chain.iter().all(|s| !s.requires_browser()));
    }

    #[test]
    fn word_overlap_ignores_initials_and_case() {
        assert!(shares_word("Jane Doe", "jane"));
        assert!(shares_word("Doe, Jane (@jdoe)", "JANE DOE"));
        assert!(!shares_word("Jane Doe", "J Smith"));
        assert!(!shares_word("Janet Doering", "jane doe"));
    }

    #[test]
    fn every_platform_has_a_detail_strategy() {
        let strategies = default_detail_strategies();
        for platform in Platform::ALL {
            assert_eq!(
                strategies.iter().filter(|s| s.platform() == platform).count(),
                1,
                "{:?}",
                platform
            );
        }
    }
}

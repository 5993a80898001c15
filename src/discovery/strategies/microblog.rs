//! Microblog profile lookup through search engines, keyed by handle.

use async_trait::async_trait;

use crate::core::error::SourceError;
use crate::core::types::ProfileDetail;
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::{detail_from_candidate, first_serp_match, DetailStrategy};
use crate::extract::name::profile_slug;
use crate::extract::Candidate;
use crate::scraping::serp::SerpEngine;

const NAME: &str = "microblog";

pub struct MicroblogDetail {
    engines: Vec<SerpEngine>,
}

impl Default for MicroblogDetail {
    fn default() -> Self {
        Self {
            engines: vec![SerpEngine::DuckDuckGo, SerpEngine::Bing],
        }
    }
}

impl MicroblogDetail {
    pub fn with_engines(engines: Vec<SerpEngine>) -> Self {
        Self { engines }
    }
}

/// Result cards for `handle`'s own page, or cards whose title quotes `@handle`.
fn is_handle_card(candidate: &Candidate, handle: &str) -> bool {
    let by_link = candidate.link.as_deref().is_some_and(|link| {
        Platform::classify(link) == Platform::Microblog
            && profile_slug(link).eq_ignore_ascii_case(handle)
    });
    by_link
        || candidate
            .title
            .to_lowercase()
            .contains(&format!("(@{})", handle.to_lowercase()))
}

#[async_trait]
impl DetailStrategy for MicroblogDetail {
    fn name(&self) -> &'static str {
        NAME
    }

    fn platform(&self) -> Platform {
        Platform::Microblog
    }

    async fn fetch_detail(
        &self,
        ctx: &mut DiscoveryContext,
        url: &str,
        name: &str,
    ) -> Result<ProfileDetail, SourceError> {
        let handle = profile_slug(url);
        if handle.is_empty() {
            return Err(SourceError::MissingMarkup(format!("no handle in {}", url)));
        }
        let query = format!("\"@{}\" (site:x.com OR site:twitter.com)", handle);
        let hit = first_serp_match(&ctx.http, &self.engines, &query, |c| {
            is_handle_card(c, &handle)
        })
        .await?;
        Ok(detail_from_candidate(ctx, &hit, Platform::Microblog, NAME, url, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_cards_match_by_link_or_title() {
        let by_link = Candidate {
            title: "Jane".into(),
            link: Some("https://x.com/JaneDoe".into()),
            ..Default::default()
        };
        let by_title = Candidate {
            title: "Jane Doe (@janedoe) / X".into(),
            link: Some("https://nitter.example/janedoe".into()),
            ..Default::default()
        };
        let other = Candidate {
            title: "Jane Doe (@janedoe2) / X".into(),
            link: Some("https://x.com/janedoe2".into()),
            ..Default::default()
        };
        assert!(is_handle_card(&by_link, "janedoe"));
        assert!(is_handle_card(&by_title, "janedoe"));
        assert!(!is_handle_card(&other, "janedoe"));
    }
}

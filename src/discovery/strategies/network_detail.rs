//! Professional-network profile lookup.
//!
//! Profile pages sit behind a sign-in wall, so the profile is re-found through
//! search engines and the matching result card is read instead.

use async_trait::async_trait;

use crate::core::error::SourceError;
use crate::core::types::ProfileDetail;
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::{detail_from_candidate, first_serp_match, DetailStrategy};
use crate::extract::name::profile_slug;
use crate::extract::Candidate;
use crate::scraping::serp::SerpEngine;

const NAME: &str = "network_detail";

pub struct NetworkDetail {
    engines: Vec<SerpEngine>,
}

impl Default for NetworkDetail {
    fn default() -> Self {
        Self {
            engines: vec![SerpEngine::DuckDuckGo, SerpEngine::Bing],
        }
    }
}

impl NetworkDetail {
    pub fn with_engines(engines: Vec<SerpEngine>) -> Self {
        Self { engines }
    }
}

/// Whether `candidate` links to the profile with `slug`.
pub fn is_same_profile(candidate: &Candidate, slug: &str) -> bool {
    candidate.link.as_deref().is_some_and(|link| {
        Platform::classify(link) == Platform::ProfessionalNetwork
            && profile_slug(link).eq_ignore_ascii_case(slug)
    })
}

#[async_trait]
impl DetailStrategy for NetworkDetail {
    fn name(&self) -> &'static str {
        NAME
    }

    fn platform(&self) -> Platform {
        Platform::ProfessionalNetwork
    }

    async fn fetch_detail(
        &self,
        ctx: &mut DiscoveryContext,
        url: &str,
        name: &str,
    ) -> Result<ProfileDetail, SourceError> {
        let slug = profile_slug(url);
        if slug.is_empty() {
            return Err(SourceError::MissingMarkup(format!("no profile slug in {}", url)));
        }
        let query = format!("\"{}\" site:linkedin.com/in/{}", name, slug);
        let hit = first_serp_match(&ctx.http, &self.engines, &query, |c| {
            is_same_profile(c, &slug)
        })
        .await?;
        Ok(detail_from_candidate(
            ctx,
            &hit,
            Platform::ProfessionalNetwork,
            NAME,
            url,
            name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;

    #[test]
    fn slug_match_is_exact() {
        let card = |link: &str| Candidate {
            title: "Jane Doe - Staff Engineer - Acme | LinkedIn".into(),
            link: Some(link.into()),
            ..Default::default()
        };
        assert!(is_same_profile(&card("https://www.linkedin.com/in/Jane-Doe/"), "jane-doe"));
        assert!(!is_same_profile(&card("https://www.linkedin.com/in/jane-doe-2"), "jane-doe"));
        assert!(!is_same_profile(&card("https://janedoe.dev/in/jane-doe"), "jane-doe"));
    }

    #[test]
    fn matched_card_becomes_detail() {
        let mut ctx = DiscoveryContext::new(
            EngineConfig {
                rng_seed: Some(3),
                ..EngineConfig::offline()
            },
            reqwest::Client::new(),
        );
        let hit = Candidate {
            title: "Jane Doe - Staff Engineer - Acme | LinkedIn".into(),
            snippet: "Greater Seattle Area · jane@acme.example".into(),
            link: Some("https://www.linkedin.com/in/jane-doe".into()),
            ..Default::default()
        };
        let url = "https://linkedin.com/in/jane-doe";
        let d = detail_from_candidate(&mut ctx, &hit, Platform::ProfessionalNetwork, NAME, url, "Jane Doe");
        assert_eq!(d.name, "Jane Doe");
        assert_eq!(d.role, "Staff Engineer");
        assert_eq!(d.location, "Greater Seattle Area");
        assert_eq!(d.email, "jane@acme.example");
        assert_eq!(d.profile_url, url);
        assert_eq!(d.social_links.linkedin.as_deref(), Some(url));
        assert!((55..=85).contains(&d.reputation_score));
        assert!(!d.synthetic);
    }
}

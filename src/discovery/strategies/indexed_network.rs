//! Professional-network pages as indexed by HTML search engines.

use async_trait::async_trait;

use crate::core::error::ParseSkip;
use crate::core::types::{ProfileSummary, StrategyOutcome, UNKNOWN_PERSON};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::{first_serp_hit, SearchStrategy};
use crate::extract::name::extract_name;
use crate::extract::{summarize, Candidate};
use crate::scraping::serp::SerpEngine;

const NAME: &str = "indexed_network";

pub struct IndexedNetworkSearch {
    engines: Vec<SerpEngine>,
}

impl Default for IndexedNetworkSearch {
    fn default() -> Self {
        Self {
            engines: vec![SerpEngine::DuckDuckGo, SerpEngine::Bing],
        }
    }
}

impl IndexedNetworkSearch {
    pub fn with_engines(engines: Vec<SerpEngine>) -> Self {
        Self { engines }
    }

    pub fn site_query(query: &str) -> String {
        format!("{} linkedin profile site:linkedin.com/in/", query)
    }
}

/// Only profile pages count. A title without a usable name borrows it from the URL slug.
pub fn build_record(candidate: &Candidate) -> Result<ProfileSummary, ParseSkip> {
    let link = match candidate.link.as_deref() {
        Some(link) if Platform::classify(link) == Platform::ProfessionalNetwork => link,
        _ => return Err(ParseSkip("not a profile page".to_string())),
    };

    summarize(candidate, NAME).or_else(|_| {
        let name = extract_name(link);
        if name == UNKNOWN_PERSON {
            return Err(ParseSkip(format!("no name for {}", link)));
        }
        summarize(
            &Candidate {
                title: name,
                ..candidate.clone()
            },
            NAME,
        )
    })
}

#[async_trait]
impl SearchStrategy for IndexedNetworkSearch {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(
        &self,
        ctx: &mut DiscoveryContext,
        query: &str,
        limit: usize,
    ) -> StrategyOutcome {
        first_serp_hit(
            &ctx.http,
            &self.engines,
            &Self::site_query(query),
            limit,
            build_record,
        )
        .await
        .into()
    }
}

//! Last real source: unrestricted web search, any page about the person.

use async_trait::async_trait;

use crate::core::error::ParseSkip;
use crate::core::types::{ProfileSummary, StrategyOutcome};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::strategies::{first_serp_hit, shares_word, SearchStrategy};
use crate::extract::{summarize, Candidate};
use crate::scraping::serp::SerpEngine;

const NAME: &str = "web_search";

pub struct WebSearch {
    engines: Vec<SerpEngine>,
}

impl Default for WebSearch {
    fn default() -> Self {
        Self {
            engines: vec![SerpEngine::DuckDuckGo, SerpEngine::Bing],
        }
    }
}

impl WebSearch {
    pub fn with_engines(engines: Vec<SerpEngine>) -> Self {
        Self { engines }
    }
}

/// A hit counts when it links somewhere and its title names the person.
pub fn build_record(candidate: &Candidate, query: &str) -> Result<ProfileSummary, ParseSkip> {
    if candidate.link.is_none() {
        return Err(ParseSkip("result without link".to_string()));
    }
    if !shares_word(&candidate.title, query) {
        return Err(ParseSkip(format!("{:?} unrelated to query", candidate.title)));
    }
    summarize(candidate, NAME)
}

#[async_trait]
impl SearchStrategy for WebSearch {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(
        &self,
        ctx: &mut DiscoveryContext,
        query: &str,
        limit: usize,
    ) -> StrategyOutcome {
        let quoted = format!("\"{}\"", query);
        first_serp_hit(&ctx.http, &self.engines, &quoted, limit, |c| {
            build_record(c, query)
        })
        .await
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_titles_are_skipped() {
        let html = r#"<html><body><ol>
            <li class="b_algo"><h2><a href="https://janedoe.dev/about">About Jane Doe</a></h2><div class="b_caption"><p>Engineer at Initech. Austin, TX</p></div></li>
            <li class="b_algo"><h2><a href="https://ads.example/">Cheap flights to Austin</a></h2></li>
            <li class="b_algo"><h2>Jane Doe fan page</h2></li>
        </ol></body></html>"#;
        let candidates = SerpEngine::Bing.parse(html);
        assert_eq!(candidates.len(), 3);

        let out = crate::extract::extract_profiles(&candidates, 5, |c| build_record(c, "Jane Doe"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].profile_url, "https://janedoe.dev/about");
        assert_eq!(out[0].company, "Initech");
        assert_eq!(out[0].location, "Austin, TX");
        assert_eq!(out[0].source, NAME);
    }
}

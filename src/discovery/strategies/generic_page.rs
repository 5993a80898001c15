//! Any other URL: fetch the page itself and read its metadata and contact links.

use async_trait::async_trait;

use crate::core::error::SourceError;
use crate::core::types::{ProfileDetail, ProfileSummary};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::DetailStrategy;
use crate::extract::page::{read_page, PageMeta};
use crate::extract::{summarize, Candidate};
use crate::scraping::fetch::fetch_html;

const NAME: &str = "generic_page";

/// Build a detail record from page metadata. Fails only when the page names no one.
pub fn detail_from_page(meta: PageMeta, url: &str, fallback_name: &str) -> Result<ProfileDetail, SourceError> {
    let title = meta
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| (!fallback_name.is_empty()).then(|| fallback_name.to_string()))
        .ok_or_else(|| SourceError::MissingMarkup(format!("no title on {}", url)))?;

    let candidate = Candidate {
        title,
        snippet: meta.description.clone().unwrap_or_default(),
        image: meta.image.clone(),
        link: Some(url.to_string()),
        location: None,
    };
    let summary = summarize(&candidate, NAME)
        .map_err(|skip| SourceError::MissingMarkup(skip.to_string()))?;

    let mut detail = ProfileDetail::from_summary(ProfileSummary {
        profile_url: url.to_string(),
        ..summary
    });
    detail.website = url.to_string();
    detail.email = meta.email.unwrap_or_default();
    detail.phone = meta.phone.unwrap_or_default();
    for link in &meta.links {
        detail.social_links.absorb(link);
    }
    Ok(detail)
}

pub struct GenericPageDetail;

#[async_trait]
impl DetailStrategy for GenericPageDetail {
    fn name(&self) -> &'static str {
        NAME
    }

    fn platform(&self) -> Platform {
        Platform::Generic
    }

    async fn fetch_detail(
        &self,
        ctx: &mut DiscoveryContext,
        url: &str,
        name: &str,
    ) -> Result<ProfileDetail, SourceError> {
        let target = url::Url::parse(url)
            .map_err(|e| SourceError::Unavailable(format!("bad url {}: {}", url, e)))?;
        let html = fetch_html(&ctx.http, target.clone()).await?;
        let meta = read_page(&html, &target);
        let mut detail = detail_from_page(meta, url, name)?;
        detail.reputation_score = ctx.reputation(Platform::Generic);
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UNKNOWN;

    #[test]
    fn personal_site_becomes_detail() {
        let html = r#"<html><head>
            <meta property="og:title" content="Jane Doe - Staff Engineer - Acme">
            <meta name="description" content="I build distributed systems. Austin, TX">
        </head><body>
            <a href="mailto:hi@janedoe.dev">hi@janedoe.dev</a>
            <a href="https://twitter.com/janedoe">Twitter</a>
            <a href="https://www.linkedin.com/in/jane-doe">LinkedIn</a>
        </body></html>"#;
        let url = "https://janedoe.dev/";
        let meta = read_page(html, &url::Url::parse(url).unwrap());
        let d = detail_from_page(meta, url, "Janedoe").unwrap();
        assert_eq!(d.name, "Jane Doe");
        assert_eq!(d.role, "Staff Engineer");
        assert_eq!(d.company, "Acme");
        assert_eq!(d.location, "Austin, TX");
        assert_eq!(d.email, "hi@janedoe.dev");
        assert_eq!(d.website, url);
        assert_eq!(d.social_links.twitter.as_deref(), Some("https://twitter.com/janedoe"));
        assert_eq!(
            d.social_links.linkedin.as_deref(),
            Some("https://www.linkedin.com/in/jane-doe")
        );
        assert!(d.social_links.github.is_none());
    }

    #[test]
    fn untitled_page_uses_derived_name() {
        let url = "https://example.com/people/jdoe";
        let d = detail_from_page(PageMeta::default(), url, "People").unwrap();
        assert_eq!(d.name, "People");
        assert_eq!(d.company, UNKNOWN);

        assert!(matches!(
            detail_from_page(PageMeta::default(), url, ""),
            Err(SourceError::MissingMarkup(_))
        ));
    }
}

//! Code-hosting profiles are public: fetch the page and read its h-card.

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::core::error::SourceError;
use crate::core::types::{ProfileDetail, ProfileSummary, UNKNOWN, UNKNOWN_LOCATION};
use crate::discovery::context::DiscoveryContext;
use crate::discovery::platform::Platform;
use crate::discovery::strategies::DetailStrategy;
use crate::extract::name::profile_slug;
use crate::extract::page::read_document;
use crate::extract::{avatar_url, collapse_ws, patterns};
use crate::scraping::fetch::fetch_html;

const NAME: &str = "code_hosting";

const FULL_NAME: &[&str] = &["span.p-name", "[itemprop='name']", "h1.vcard-names span"];
const NICKNAME: &[&str] = &["span.p-nickname", "[itemprop='additionalName']"];
const BIO: &[&str] = &["div.p-note", "div.user-profile-bio", "[data-bio-text]"];
const ORG: &[&str] = &["span.p-org", "[itemprop='worksFor'] span", "[itemprop='worksFor']"];
const LOCATION: &[&str] = &["span.p-label", "[itemprop='homeLocation'] span", "[itemprop='homeLocation']"];
const WEBSITE: &[&str] = &["[itemprop='url'] a", "li[data-test-selector='profile-website-url'] a"];
const EMAIL: &[&str] = &["li[itemprop='email'] a", "a.u-email"];
const AVATAR: &[&str] = &["img.avatar-user", "img.avatar"];

fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = Selector::parse(css).ok()?;
        doc.select(&sel)
            .map(|el| collapse_ws(&el.text().collect::<Vec<_>>().join(" ")))
            .find(|t| !t.is_empty())
    })
}

fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = Selector::parse(css).ok()?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Parse a public code-hosting profile page. `MissingMarkup` when it has no h-card.
pub fn parse_profile(html: &str, url: &url::Url) -> Result<ProfileDetail, SourceError> {
    let doc = Html::parse_document(html);

    let nickname = first_text(&doc, NICKNAME);
    let name = first_text(&doc, FULL_NAME)
        .or_else(|| nickname.clone())
        .ok_or_else(|| SourceError::MissingMarkup(format!("no profile card on {}", url)))?;

    let bio = first_text(&doc, BIO).unwrap_or_default();
    let org = first_text(&doc, ORG).map(|o| o.trim_start_matches('@').to_string());
    let (role, company) = match (patterns::role_and_company(&bio), org) {
        (Some((role, company)), None) => (role, company),
        (Some((role, _)), Some(org)) => (role, org),
        (None, Some(org)) => (UNKNOWN.to_string(), org),
        (None, None) => (UNKNOWN.to_string(), UNKNOWN.to_string()),
    };

    let page = read_document(&doc, url);
    let mut detail = ProfileDetail::from_summary(ProfileSummary {
        profile_image: first_attr(&doc, AVATAR, "src")
            .filter(|s| s.starts_with("http"))
            .unwrap_or_else(|| avatar_url(&name)),
        location: first_text(&doc, LOCATION)
            .or_else(|| patterns::location(&bio))
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        name,
        company,
        role,
        profile_url: url.to_string(),
        bio,
        source: NAME.to_string(),
        synthetic: false,
    });

    detail.website = first_attr(&doc, WEBSITE, "href").unwrap_or_default();
    detail.email = first_text(&doc, EMAIL)
        .or(page.email)
        .unwrap_or_default();
    detail.social_links.github = Some(url.to_string());
    for link in &page.links {
        // The page links to the site's own org and repo pages too.
        if !link.contains("github.com") {
            detail.social_links.absorb(link);
        }
    }
    Ok(detail)
}

pub struct CodeHostingDetail;

#[async_trait]
impl DetailStrategy for CodeHostingDetail {
    fn name(&self) -> &'static str {
        NAME
    }

    fn platform(&self) -> Platform {
        Platform::CodeHosting
    }

    async fn fetch_detail(
        &self,
        ctx: &mut DiscoveryContext,
        url: &str,
        _name: &str,
    ) -> Result<ProfileDetail, SourceError> {
        let user = profile_slug(url);
        if user.is_empty() {
            return Err(SourceError::MissingMarkup(format!("no user in {}", url)));
        }
        let target = url::Url::parse(&format!("https://github.com/{}", user))
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        let html = fetch_html(&ctx.http, target.clone()).await?;
        let mut detail = parse_profile(&html, &target)?;
        detail.reputation_score = ctx.reputation(Platform::CodeHosting);
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"<html><body>
        <div class="vcard-names-container">
          <img class="avatar avatar-user" src="https://avatars.example/u/1?v=4">
          <h1 class="vcard-names">
            <span class="p-name vcard-fullname" itemprop="name">Jane Doe</span>
            <span class="p-nickname vcard-username" itemprop="additionalName">janedoe</span>
          </h1>
        </div>
        <div class="p-note user-profile-bio"><div>Staff Engineer at Acme. Compilers and coffee.</div></div>
        <ul class="vcard-details">
          <li itemprop="worksFor"><span class="p-org"><div>@initech</div></span></li>
          <li itemprop="homeLocation"><span class="p-label">Berlin, Germany</span></li>
          <li itemprop="url" data-test-selector="profile-website-url"><a href="https://janedoe.dev">janedoe.dev</a></li>
          <li itemprop="social"><a href="https://twitter.com/janedoe">@janedoe</a></li>
          <li itemprop="social"><a href="https://www.linkedin.com/in/jane-doe">in/jane-doe</a></li>
        </ul>
        <a href="https://github.com/janedoe?tab=repositories">Repositories</a>
    </body></html>"#;

    #[test]
    fn h_card_is_read() {
        let url = url::Url::parse("https://github.com/janedoe").unwrap();
        let d = parse_profile(PROFILE, &url).unwrap();
        assert_eq!(d.name, "Jane Doe");
        assert_eq!(d.role, "Staff Engineer");
        // The card's organisation beats the one mentioned in the bio.
        assert_eq!(d.company, "initech");
        assert_eq!(d.location, "Berlin, Germany");
        assert_eq!(d.profile_image, "https://avatars.example/u/1?v=4");
        assert_eq!(d.website, "https://janedoe.dev");
        assert_eq!(d.social_links.github.as_deref(), Some("https://github.com/janedoe"));
        assert_eq!(d.social_links.twitter.as_deref(), Some("https://twitter.com/janedoe"));
        assert!(d.social_links.linkedin.is_some());
        assert_eq!(d.source, NAME);
    }

    #[test]
    fn page_without_card_is_missing_markup() {
        let url = url::Url::parse("https://github.com/janedoe").unwrap();
        assert!(matches!(
            parse_profile("<html><body><h1>Not Found</h1></body></html>", &url),
            Err(SourceError::MissingMarkup(_))
        ));
    }
}

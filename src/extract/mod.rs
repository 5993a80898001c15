//! Heuristic extraction of profile records from fetched or rendered markup.
//!
//! Extraction happens in two steps. [`collect_candidates`] walks result
//! containers with structural selectors and pulls out raw title, snippet, image
//! and link. A builder such as [`summarize`] then turns each [`Candidate`] into a
//! [`ProfileSummary`] using the ordered patterns in [`patterns`]. A builder that
//! rejects a candidate only drops that candidate.
//!
//! Markup of every source is treated as unstable: each selector slot is a list
//! tried in order, and missing fields degrade to sentinels instead of failing.

pub mod name;
pub mod page;
pub mod patterns;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::core::error::ParseSkip;
use crate::core::types::{ProfileSummary, UNKNOWN, UNKNOWN_LOCATION};

const MAX_BIO_CHARS: usize = 400;

/// Structural selectors for one source. Each slot is tried in order.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet {
    /// Result containers; the first selector matching anything is used.
    pub item: &'static [&'static str],
    pub title: &'static [&'static str],
    pub snippet: &'static [&'static str],
    pub image: &'static [&'static str],
    pub link: &'static [&'static str],
    /// Dedicated location element, for sources that render one. May be empty.
    pub location: &'static [&'static str],
}

/// Raw fields pulled from one result container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub snippet: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub location: Option<String>,
}

fn parse_selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .filter_map(|css| match Selector::parse(css) {
            Ok(sel) => Some(sel),
            Err(e) => {
                debug!("ignoring invalid selector {:?}: {}", css, e);
                None
            }
        })
        .collect()
}

pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<Vec<_>>().join(" "))
}

fn first_text(container: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    for sel in selectors {
        for el in container.select(sel) {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
            // Panel cards often carry the label only as an attribute.
            for attr in ["aria-label", "data-entityname", "alt", "title"] {
                if let Some(v) = el.value().attr(attr) {
                    let v = collapse_ws(v);
                    if !v.is_empty() {
                        return Some(v);
                    }
                }
            }
        }
    }
    None
}

fn first_attr(
    container: &ElementRef<'_>,
    selectors: &[Selector],
    attrs: &[&str],
) -> Option<String> {
    selectors.iter().find_map(|sel| {
        container.select(sel).find_map(|el| {
            attrs
                .iter()
                .filter_map(|a| el.value().attr(a))
                .map(str::trim)
                .find(|v| !v.is_empty() && !v.starts_with("data:"))
                .map(str::to_string)
        })
    })
}

/// Walk `html` with `selectors` and return one candidate per result container.
///
/// `normalize_link` turns a raw `href` into an absolute destination URL
/// (unwrapping search-engine redirects); links it rejects are dropped.
pub fn collect_candidates(
    html: &str,
    selectors: &SelectorSet,
    normalize_link: &dyn Fn(&str) -> Option<String>,
) -> Vec<Candidate> {
    let doc = Html::parse_document(html);
    collect_from_document(&doc, selectors, normalize_link)
}

pub fn collect_from_document(
    doc: &Html,
    selectors: &SelectorSet,
    normalize_link: &dyn Fn(&str) -> Option<String>,
) -> Vec<Candidate> {
    let title_sels = parse_selectors(selectors.title);
    let snippet_sels = parse_selectors(selectors.snippet);
    let image_sels = parse_selectors(selectors.image);
    let link_sels = parse_selectors(selectors.link);
    let location_sels = parse_selectors(selectors.location);

    for item_sel in parse_selectors(selectors.item) {
        let items = doc.select(&item_sel).collect::<Vec<_>>();
        if items.is_empty() {
            continue;
        }

        return items
            .iter()
            .map(|item| Candidate {
                title: first_text(item, &title_sels).unwrap_or_default(),
                snippet: first_text(item, &snippet_sels).unwrap_or_default(),
                image: first_attr(item, &image_sels, &["src", "data-src", "data-delayed-url"]),
                link: first_attr(item, &link_sels, &["href"])
                    .and_then(|href| normalize_link(&href)),
                location: first_text(item, &location_sels),
            })
            .collect();
    }

    Vec::new()
}

/// Build up to `limit` records, skipping every candidate `build` rejects.
pub fn extract_profiles<F>(candidates: &[Candidate], limit: usize, mut build: F) -> Vec<ProfileSummary>
where
    F: FnMut(&Candidate) -> Result<ProfileSummary, ParseSkip>,
{
    let mut out = Vec::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        if out.len() >= limit {
            break;
        }
        match build(candidate) {
            Ok(profile) => out.push(profile),
            Err(skip) => debug!("candidate {} skipped: {}", idx, skip),
        }
    }
    out
}

/// Default candidate → summary builder shared by the SERP-style strategies.
///
/// Name comes from the title. Role and company come from the title's headline
/// segments, else from the ordered role/company patterns over the snippet.
/// Location comes from a dedicated element when the source renders one, else
/// from the location patterns. A missing image becomes a generated avatar.
pub fn summarize(candidate: &Candidate, source: &str) -> Result<ProfileSummary, ParseSkip> {
    let parts = name::name_from_title(&candidate.title);
    if parts.name.is_empty() {
        return Err(ParseSkip("no name in title".to_string()));
    }
    if parts.name.chars().count() > 80 {
        return Err(ParseSkip(format!("implausible name {:?}", parts.name)));
    }

    let (role, company) = headline_role_company(&parts.headline)
        .or_else(|| patterns::role_and_company(&candidate.snippet))
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));

    let location = candidate
        .location
        .clone()
        .filter(|l| !l.is_empty())
        .or_else(|| patterns::location(&candidate.snippet))
        .or_else(|| parts.headline.iter().find_map(|h| patterns::location(h)))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    let profile_image = candidate
        .image
        .clone()
        .filter(|s| s.starts_with("http"))
        .unwrap_or_else(|| avatar_url(&parts.name));

    Ok(ProfileSummary {
        name: parts.name,
        company,
        role,
        profile_url: candidate.link.clone().unwrap_or_default(),
        profile_image,
        location,
        bio: truncate_chars(&candidate.snippet, MAX_BIO_CHARS),
        source: source.to_string(),
        synthetic: false,
    })
}

/// `["Staff Engineer", "Acme"]` → role and company; `["Engineer at Acme"]` → patterns.
fn headline_role_company(headline: &[String]) -> Option<(String, String)> {
    match headline {
        [] => None,
        [single] => patterns::role_and_company(single)
            .or_else(|| Some((single.clone(), UNKNOWN.to_string()))),
        [role, company, ..] => Some((role.clone(), company.clone())),
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Deterministic generated-avatar URL for `name`.
pub fn avatar_url(name: &str) -> String {
    let encoded = name
        .split_whitespace()
        .map(|w| utf8_percent_encode(w, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join("+");
    format!("https://ui-avatars.com/api/?name={}&background=random", encoded)
}

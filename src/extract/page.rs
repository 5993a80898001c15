//! Page-level metadata and contact links of an arbitrary profile page.

use scraper::{Html, Selector};

use crate::extract::collapse_ws;
use crate::extract::patterns;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// `og:title`, else `<title>`.
    pub title: Option<String>,
    /// `og:description`, else `meta[name=description]`.
    pub description: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Absolute `http(s)` targets of every anchor, in document order.
    pub links: Vec<String>,
}

/// `content` of `meta[property=key]` or `meta[name=key]`, trimmed and non-empty.
pub fn meta_content(doc: &Html, key: &str) -> Option<String> {
    ["property", "name"].iter().find_map(|attr| {
        let sel = Selector::parse(&format!("meta[{}=\"{}\"]", attr, key)).ok()?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_ws)
            .find(|v| !v.is_empty())
    })
}

fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .map(|el| collapse_ws(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

pub fn read_page(html: &str, base: &url::Url) -> PageMeta {
    let doc = Html::parse_document(html);
    read_document(&doc, base)
}

pub fn read_document(doc: &Html, base: &url::Url) -> PageMeta {
    let mut meta = PageMeta {
        title: meta_content(doc, "og:title").or_else(|| document_title(doc)),
        description: meta_content(doc, "og:description")
            .or_else(|| meta_content(doc, "description")),
        image: meta_content(doc, "og:image")
            .and_then(|src| base.join(&src).ok())
            .map(|u| u.to_string()),
        ..PageMeta::default()
    };

    let Ok(anchors) = Selector::parse("a[href]") else {
        return meta;
    };
    for a in doc.select(&anchors) {
        let Some(href) = a.value().attr("href").map(str::trim) else {
            continue;
        };
        if let Some(addr) = href.strip_prefix("mailto:") {
            let addr = addr.split('?').next().unwrap_or_default().trim();
            if meta.email.is_none() && !addr.is_empty() {
                meta.email = Some(addr.to_string());
            }
        } else if let Some(num) = href.strip_prefix("tel:") {
            if meta.phone.is_none() && !num.trim().is_empty() {
                meta.phone = Some(num.trim().to_string());
            }
        } else if let Ok(target) = base.join(href) {
            if matches!(target.scheme(), "http" | "https") {
                meta.links.push(target.to_string());
            }
        }
    }

    if meta.email.is_none() {
        meta.email = meta.description.as_deref().and_then(patterns::find_email);
    }
    meta
}

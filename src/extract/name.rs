//! Display-name derivation from profile URLs and result titles. Pure functions.

use percent_encoding::percent_decode_str;

use crate::core::types::UNKNOWN_PERSON;

/// Path marker of professional-network profile URLs.
pub const PROFILE_MARKER: &str = "/in/";

/// Derive a display name from a profile URL.
///
/// The slug is the segment after `/in/` when present, otherwise the first path
/// segment after the host. Query and fragment are dropped, `-`, `.` and `_`
/// become spaces and each word is title-cased. Falls back to `"Unknown Person"`.
pub fn extract_name(url: &str) -> String {
    let slug = profile_slug(url);
    let name = title_case(&slug.replace(['-', '.', '_'], " "));
    if name.is_empty() || name.eq_ignore_ascii_case(PROFILE_MARKER.trim_matches('/')) {
        UNKNOWN_PERSON.to_string()
    } else {
        name
    }
}

/// Raw, percent-decoded profile slug of `url` (no case folding).
pub fn profile_slug(url: &str) -> String {
    let s = url.trim();
    let s = s.find("://").map(|i| &s[i + 3..]).unwrap_or(s);

    let tail = match s.find(PROFILE_MARKER) {
        Some(pos) => &s[pos + PROFILE_MARKER.len()..],
        None => s.find('/').map(|pos| &s[pos + 1..]).unwrap_or(""),
    };
    let segment = tail
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    percent_decode_str(segment)
        .decode_utf8_lossy()
        .trim_start_matches('@')
        .trim()
        .to_string()
}

/// Uppercase the first letter of every word and lowercase the rest.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A result title split into the person's name and trailing headline segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitleParts {
    pub name: String,
    pub headline: Vec<String>,
}

const SITE_SUFFIXES: &[&str] = &[
    " | LinkedIn",
    " - LinkedIn",
    " on LinkedIn",
    " / X",
    " / Twitter",
    " | Twitter",
    " · GitHub",
    " - GitHub",
];

/// Split a result title such as `"Jane Doe - Staff Engineer - Acme | LinkedIn"`.
pub fn name_from_title(title: &str) -> TitleParts {
    let mut t = title.split_whitespace().collect::<Vec<_>>().join(" ");
    for suffix in SITE_SUFFIXES {
        if let Some(stripped) = t.strip_suffix(suffix) {
            t = stripped.to_string();
        }
    }
    // Anything after a pipe is site branding.
    if let Some(pos) = t.find(" | ") {
        t.truncate(pos);
    }

    let mut segments = t
        .replace(['\u{2013}', '\u{2014}'], "-")
        .split(" - ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .into_iter();

    let raw_name = segments.next().unwrap_or_default();
    // "Jane Doe (@jdoe)" → "Jane Doe"
    let name = match raw_name.find(" (") {
        Some(pos) => raw_name[..pos].trim().to_string(),
        None => raw_name,
    };

    TitleParts {
        name,
        headline: segments.collect(),
    }
}

/// URL slug form of a name: `"Jane Doe"` → `"jane-doe"`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Handle form of a name: `"Jane Doe"` → `"janedoe"`.
pub fn handle(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<String>()
}

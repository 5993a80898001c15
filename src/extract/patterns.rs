//! Ordered regex heuristics. Every list is first-match-wins: a later pattern is
//! only consulted when every earlier one failed to match.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// An ordered list of labelled patterns with first-match-wins semantics.
pub struct PatternList {
    patterns: Vec<(&'static str, Regex)>,
}

impl PatternList {
    /// Compile `specs` in order. Panics on an invalid pattern, so only use with literals.
    pub fn new(specs: &[(&'static str, &str)]) -> Self {
        let patterns = specs
            .iter()
            .map(|(label, re)| (*label, Regex::new(re).expect("valid heuristic pattern")))
            .collect();
        Self { patterns }
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|(label, _)| *label)
    }

    /// Label and captures of the first pattern that matches `text`.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<(&'static str, Captures<'t>)> {
        self.patterns
            .iter()
            .find_map(|(label, re)| re.captures(text).map(|caps| (*label, caps)))
    }
}

// Clause boundaries: sentence stops, bullets and pipes.
const ROLE_COMPANY_SPECS: &[(&str, &str)] = &[
    (
        "at",
        r"(?P<role>[A-Z][^.·|•\n]{1,80}?)\s+(?:at|@)\s+(?P<company>[A-Z0-9][^.,;·|•\n]{0,60})",
    ),
    (
        "of",
        r"(?P<role>[A-Z][^.,·|•\n]{1,60}?)\s+of\s+(?P<company>[A-Z0-9][^.,;·|•\n]{0,60})",
    ),
    (
        "comma",
        r"^\s*(?P<role>[A-Z][^,·|•\n]{1,60}?),\s*(?P<company>[A-Z0-9][^,.;·|•\n]{1,60})",
    ),
];

const LOCATION_SPECS: &[(&str, &str)] = &[
    (
        "area",
        r"(?P<loc>(?:Greater\s+)?(?:[A-Z][\w'-]*\s+){1,3}(?:Bay\s+Area|Metropolitan\s+Area|Area))\b",
    ),
    (
        "city_state",
        r"(?P<loc>(?:[A-Z][a-zA-Z'-]+\s){0,2}[A-Z][a-zA-Z'-]+,\s*[A-Z]{2})\b",
    ),
    (
        "city_country",
        r"(?P<loc>(?:[A-Z][a-zA-Z'-]+\s){0,2}[A-Z][a-zA-Z'-]+,\s*(?:United States|United Kingdom|Canada|Germany|France|India|Australia|Netherlands|Spain|Italy|Ireland|Singapore|Japan|Brazil|Sweden|Switzerland|Israel|Mexico|Poland|Portugal))\b",
    ),
    (
        "labelled",
        r"(?i:location)\s*[:·]\s*(?P<loc>[A-Z][^·|•\n.]{1,60})",
    ),
];

static ROLE_COMPANY: OnceLock<PatternList> = OnceLock::new();
static LOCATION: OnceLock<PatternList> = OnceLock::new();
static EMAIL: OnceLock<Regex> = OnceLock::new();

pub fn role_company_patterns() -> &'static PatternList {
    ROLE_COMPANY.get_or_init(|| PatternList::new(ROLE_COMPANY_SPECS))
}

pub fn location_patterns() -> &'static PatternList {
    LOCATION.get_or_init(|| PatternList::new(LOCATION_SPECS))
}

fn email_regex() -> &'static Regex {
    EMAIL.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
            .expect("valid email pattern")
    })
}

fn clean_clause(s: &str) -> String {
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    s.trim_end_matches(" and")
        .trim_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
        .to_string()
}

/// Recover `(role, company)` from free text.
pub fn role_and_company(text: &str) -> Option<(String, String)> {
    let (_, caps) = role_company_patterns().first_match(text)?;
    let role = clean_clause(caps.name("role")?.as_str());
    let company = clean_clause(caps.name("company")?.as_str());
    if role.is_empty() || company.is_empty() {
        return None;
    }
    Some((role, company))
}

/// First location-looking phrase in `text`.
pub fn location(text: &str) -> Option<String> {
    let (_, caps) = location_patterns().first_match(text)?;
    let loc = clean_clause(caps.name("loc")?.as_str());
    (!loc.is_empty()).then_some(loc)
}

pub fn find_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

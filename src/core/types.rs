use serde::{Deserialize, Serialize};

use crate::core::error::SourceError;

pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const UNKNOWN_PERSON: &str = "Unknown Person";

/// Label carried by records produced by the synthetic fallback.
pub const SYNTHETIC_SOURCE: &str = "synthetic";

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileSearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetailRequest {
    pub profile_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One search hit, normalized across every source.
///
/// Optional fields are never absent: missing values are filled with the
/// `"Unknown"` sentinels or an empty string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub company: String,
    pub role: String,
    pub profile_url: String,
    pub profile_image: String,
    pub location: String,
    pub bio: String,
    /// Strategy label that produced this record (`"synthetic"` for placeholders).
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub synthetic: bool,
}

impl Default for ProfileSummary {
    fn default() -> Self {
        Self {
            name: UNKNOWN_PERSON.to_string(),
            company: UNKNOWN.to_string(),
            role: UNKNOWN.to_string(),
            profile_url: String::new(),
            profile_image: String::new(),
            location: UNKNOWN_LOCATION.to_string(),
            bio: String::new(),
            source: String::new(),
            synthetic: false,
        }
    }
}

impl ProfileSummary {
    /// `profile_url` when present, else `name`.
    pub fn identity(&self) -> &str {
        if self.profile_url.trim().is_empty() {
            &self.name
        } else {
            &self.profile_url
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationshipStatus {
    #[default]
    New,
    Active,
    Inactive,
    Close,
}

impl RelationshipStatus {
    pub const ALL: [RelationshipStatus; 4] = [
        RelationshipStatus::New,
        RelationshipStatus::Active,
        RelationshipStatus::Inactive,
        RelationshipStatus::Close,
    ];
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

impl SocialLinks {
    /// Record `url` under the platform its host belongs to. Existing entries win.
    pub fn absorb(&mut self, url: &str) {
        let lower = url.to_ascii_lowercase();
        let slot = if lower.contains("linkedin.com/in/") {
            &mut self.linkedin
        } else if lower.contains("twitter.com/") || lower.contains("://x.com/") {
            &mut self.twitter
        } else if lower.contains("github.com/") {
            &mut self.github
        } else {
            return;
        };
        if slot.is_none() {
            *slot = Some(url.to_string());
        }
    }
}

/// A single looked-up profile: the summary fields plus contact details.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    pub name: String,
    pub company: String,
    pub role: String,
    pub profile_url: String,
    pub profile_image: String,
    pub location: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub social_links: SocialLinks,
    pub relationship_status: RelationshipStatus,
    /// Always within `1..=100`.
    pub reputation_score: u8,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub synthetic: bool,
}

impl ProfileDetail {
    pub fn from_summary(summary: ProfileSummary) -> Self {
        Self {
            name: summary.name,
            company: summary.company,
            role: summary.role,
            profile_url: summary.profile_url,
            profile_image: summary.profile_image,
            location: summary.location,
            bio: summary.bio,
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            social_links: SocialLinks::default(),
            relationship_status: RelationshipStatus::New,
            reputation_score: 50,
            source: summary.source,
            synthetic: summary.synthetic,
        }
    }
}

/// Result of one strategy attempt.
#[derive(Debug)]
pub enum StrategyOutcome {
    Success(Vec<ProfileSummary>),
    Empty,
    Failed(SourceError),
}

impl StrategyOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyOutcome::Success(_) => "success",
            StrategyOutcome::Empty => "empty",
            StrategyOutcome::Failed(_) => "failed",
        }
    }
}

impl From<Result<Vec<ProfileSummary>, SourceError>> for StrategyOutcome {
    fn from(res: Result<Vec<ProfileSummary>, SourceError>) -> Self {
        match res {
            Ok(v) if v.is_empty() => StrategyOutcome::Empty,
            Ok(v) => StrategyOutcome::Success(v),
            Err(e) => StrategyOutcome::Failed(e),
        }
    }
}

impl From<Vec<ProfileSummary>> for StrategyOutcome {
    fn from(profiles: Vec<ProfileSummary>) -> Self {
        if profiles.is_empty() {
            StrategyOutcome::Empty
        } else {
            StrategyOutcome::Success(profiles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_camel_case() {
        let s = ProfileSummary {
            name: "Jane Doe".into(),
            profile_url: "https://linkedin.com/in/jane-doe".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["profileUrl"], "https://linkedin.com/in/jane-doe");
        assert_eq!(v["location"], UNKNOWN_LOCATION);
        assert_eq!(s.identity(), "https://linkedin.com/in/jane-doe");
    }

    #[test]
    fn identity_falls_back_to_name() {
        let s = ProfileSummary {
            name: "Jane Doe".into(),
            ..Default::default()
        };
        assert_eq!(s.identity(), "Jane Doe");
    }

    #[test]
    fn social_links_absorb_by_host() {
        let mut links = SocialLinks::default();
        links.absorb("https://x.com/janedoe");
        links.absorb("https://github.com/janedoe");
        links.absorb("https://github.com/someone-else");
        links.absorb("https://example.com/about");
        assert_eq!(links.twitter.as_deref(), Some("https://x.com/janedoe"));
        assert_eq!(links.github.as_deref(), Some("https://github.com/janedoe"));
        assert!(links.linkedin.is_none());
    }

    #[test]
    fn outcome_from_result() {
        let empty: Result<Vec<ProfileSummary>, SourceError> = Ok(Vec::new());
        assert!(matches!(StrategyOutcome::from(empty), StrategyOutcome::Empty));
        let failed: Result<Vec<ProfileSummary>, SourceError> = Err(SourceError::Timeout);
        assert!(matches!(
            StrategyOutcome::from(failed),
            StrategyOutcome::Failed(SourceError::Timeout)
        ));

        assert!(matches!(
            StrategyOutcome::from(Vec::<ProfileSummary>::new()),
            StrategyOutcome::Empty
        ));
        match StrategyOutcome::from(vec![ProfileSummary::default()]) {
            StrategyOutcome::Success(v) => assert_eq!(v.len(), 1),
            other => panic!("expected success, got {}", other.label()),
        }
    }
}

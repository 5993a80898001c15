//! Platform classification of profile URLs and the per-platform reputation band.

/// Center and half-width of the reputation band a record is scored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationParams {
    pub base: i32,
    pub variance: i32,
}

/// Band used for synthetic detail records.
pub const SYNTHETIC_REPUTATION: ReputationParams = ReputationParams {
    base: 75,
    variance: 25,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    ProfessionalNetwork,
    Microblog,
    CodeHosting,
    Generic,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::ProfessionalNetwork,
        Platform::Microblog,
        Platform::CodeHosting,
        Platform::Generic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Platform::ProfessionalNetwork => "professional_network",
            Platform::Microblog => "microblog",
            Platform::CodeHosting => "code_hosting",
            Platform::Generic => "generic",
        }
    }

    /// Classify `url` by host and path shape. Scheme-less input is accepted.
    pub fn classify(url: &str) -> Self {
        let trimmed = url.trim();
        let parsed = url::Url::parse(trimmed)
            .or_else(|_| url::Url::parse(&format!("https://{}", trimmed)));
        let Ok(parsed) = parsed else {
            return Platform::Generic;
        };

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("mobile."))
            .unwrap_or(&host);
        let path = parsed.path();

        match host {
            h if (h == "linkedin.com" || h.ends_with(".linkedin.com")) && path.starts_with("/in/") => {
                Platform::ProfessionalNetwork
            }
            "twitter.com" | "x.com" if path.len() > 1 => Platform::Microblog,
            "github.com" if path.len() > 1 => Platform::CodeHosting,
            _ => Platform::Generic,
        }
    }

    pub fn reputation(self) -> ReputationParams {
        let (base, variance) = match self {
            Platform::CodeHosting => (78, 12),
            Platform::ProfessionalNetwork => (70, 15),
            Platform::Microblog => (65, 20),
            Platform::Generic => (60, 25),
        };
        ReputationParams { base, variance }
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// EngineConfig: file-based config loader (profile-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "PROFILE_SCOUT_CONFIG";
pub const ENV_BROWSER_ENABLED: &str = "PROFILE_SCOUT_BROWSER";
pub const ENV_STRATEGY_TIMEOUT_SECS: &str = "STRATEGY_TIMEOUT_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_HTTP_CONNECT_TIMEOUT_SECS: &str = "HTTP_CONNECT_TIMEOUT_SECS";
pub const ENV_SETTLE_MS: &str = "BROWSER_SETTLE_MS";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

const DEFAULT_COMPANIES: &[&str] = &[
    "TechCorp",
    "InnovateSoft",
    "DataSystems",
    "CloudNine",
    "FutureTech",
    "AI Solutions",
    "Digital Trends",
    "Global Insights",
];

const DEFAULT_ROLES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "UX Designer",
    "Marketing Specialist",
    "Data Scientist",
    "CTO",
    "Sales Director",
    "Engineering Manager",
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "New York, NY",
    "San Francisco, CA",
    "Austin, TX",
    "Seattle, WA",
    "Boston, MA",
    "Chicago, IL",
    "Los Angeles, CA",
    "Denver, CO",
];

/// Placeholder pools the synthetic fallback rotates through.
#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FallbackPool {
    pub companies: Vec<String>,
    pub roles: Vec<String>,
    pub locations: Vec<String>,
    /// Upper bound on synthetic search results. Default: 5.
    pub max_results: usize,
}

impl Default for FallbackPool {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            companies: owned(DEFAULT_COMPANIES),
            roles: owned(DEFAULT_ROLES),
            locations: owned(DEFAULT_LOCATIONS),
            max_results: 5,
        }
    }
}

/// Raw file shape; every field is optional so env vars and defaults can fill gaps.
#[derive(serde::Deserialize, Default, Clone, Debug)]
struct RawConfig {
    browser_enabled: Option<bool>,
    strategy_timeout_secs: Option<u64>,
    http_timeout_secs: Option<u64>,
    http_connect_timeout_secs: Option<u64>,
    settle_delay_ms: Option<u64>,
    chrome_executable: Option<String>,
    fallback: Option<FallbackPool>,
    rng_seed: Option<u64>,
}

/// Engine configuration, read once when the engine is built.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Whether browser-backed strategies take part in the chain.
    pub browser_enabled: bool,
    /// Deadline for a single strategy attempt.
    pub strategy_timeout: Duration,
    pub http_timeout: Duration,
    pub http_connect_timeout: Duration,
    /// Fixed wait after navigation so script-rendered content can populate.
    pub settle_delay: Duration,
    /// Explicit browser binary. `None` means auto-discovery.
    pub chrome_executable: Option<String>,
    pub fallback: FallbackPool,
    /// Fixes the reputation scorer's random source when set.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            browser_enabled: true,
            strategy_timeout: Duration::from_secs(20),
            http_timeout: Duration::from_secs(15),
            http_connect_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(2000),
            chrome_executable: None,
            fallback: FallbackPool::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Config for tests and embedded use: no browser, no file or env lookups.
    pub fn offline() -> Self {
        Self {
            browser_enabled: false,
            strategy_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }

    fn resolve(raw: RawConfig) -> Self {
        let d = Self::default();
        Self {
            browser_enabled: raw
                .browser_enabled
                .or_else(|| env_flag(ENV_BROWSER_ENABLED))
                .unwrap_or(d.browser_enabled),
            strategy_timeout: raw
                .strategy_timeout_secs
                .or_else(|| env_u64(ENV_STRATEGY_TIMEOUT_SECS))
                .map(Duration::from_secs)
                .unwrap_or(d.strategy_timeout),
            http_timeout: raw
                .http_timeout_secs
                .or_else(|| env_u64(ENV_HTTP_TIMEOUT_SECS))
                .map(Duration::from_secs)
                .unwrap_or(d.http_timeout),
            http_connect_timeout: raw
                .http_connect_timeout_secs
                .or_else(|| env_u64(ENV_HTTP_CONNECT_TIMEOUT_SECS))
                .map(Duration::from_secs)
                .unwrap_or(d.http_connect_timeout),
            settle_delay: raw
                .settle_delay_ms
                .or_else(|| env_u64(ENV_SETTLE_MS))
                .map(Duration::from_millis)
                .unwrap_or(d.settle_delay),
            chrome_executable: raw
                .chrome_executable
                .filter(|p| !p.trim().is_empty())
                .or_else(chrome_executable_override),
            fallback: raw.fallback.unwrap_or(d.fallback),
            rng_seed: raw.rng_seed,
        }
    }

    /// Parse a JSON config document, applying env-var and default fallbacks.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        Ok(Self::resolve(raw))
    }

    /// Build a `reqwest::Client` honouring the configured timeouts.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .connect_timeout(self.http_connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
    }
}

/// Load `profile-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PROFILE_SCOUT_CONFIG` env var path
/// 2. `./profile-scout.json`
/// 3. `../profile-scout.json`
/// 4. `~/.profile-scout/config.json`
///
/// Missing file → env vars and defaults. Parse error → warning, then the same.
pub fn load_engine_config() -> EngineConfig {
    let mut candidates = vec![
        PathBuf::from("profile-scout.json"),
        PathBuf::from("../profile-scout.json"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".profile-scout").join("config.json"));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match EngineConfig::from_json(&contents) {
            Ok(cfg) => {
                tracing::info!("profile-scout config loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "profile-scout config parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                EngineConfig::resolve(RawConfig::default())
            }
        };
    }

    EngineConfig::resolve(RawConfig::default())
}

/// Optional override for the Chromium-family browser executable.
///
/// Only returns a value when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if !p.is_empty() && Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    let v = std::env::var(key).ok()?;
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fields_override_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{
                "browser_enabled": false,
                "strategy_timeout_secs": 3,
                "settle_delay_ms": 250,
                "chrome_executable": "/opt/chrome/chrome",
                "fallback": { "companies": ["Acme"], "max_results": 2 },
                "rng_seed": 7
            }"#,
        )
        .unwrap();
        assert!(!cfg.browser_enabled);
        assert_eq!(cfg.strategy_timeout, Duration::from_secs(3));
        assert_eq!(cfg.settle_delay, Duration::from_millis(250));
        assert_eq!(cfg.chrome_executable.as_deref(), Some("/opt/chrome/chrome"));
        assert_eq!(cfg.fallback.companies, vec!["Acme".to_string()]);
        assert_eq!(cfg.fallback.max_results, 2);
        // Unspecified pool fields keep their defaults.
        assert_eq!(cfg.fallback.roles.len(), DEFAULT_ROLES.len());
        assert_eq!(cfg.rng_seed, Some(7));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn offline_disables_browser() {
        let cfg = EngineConfig::offline();
        assert!(!cfg.browser_enabled);
        assert_eq!(cfg.fallback.max_results, 5);
    }
}

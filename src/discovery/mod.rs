//! The discovery engine: an ordered fallback chain over unreliable sources.
//!
//! Search tries each strategy in its fixed order, one at a time, under a
//! per-strategy deadline. The first strategy to return at least one record
//! wins and nothing after it runs. When every strategy comes back empty or
//! failed, the synthetic generator answers instead, so search never fails for
//! valid input.
//!
//! Detail lookup dispatches on the URL's platform. Any failure of the
//! platform strategy degrades to a synthetic detail for the derived name.
//!
//! ```no_run
//! # async fn demo() -> Result<(), profile_scout::DiscoveryError> {
//! use profile_scout::{EngineConfig, ProfileEngine};
//!
//! let mut engine = ProfileEngine::builder(EngineConfig::default()).build();
//! let people = engine.search("Grace Hopper", 5).await?;
//! if let Some(first) = people.first() {
//!     let detail = engine.fetch_detail(&first.profile_url).await?;
//!     println!("{} ({}): {}", detail.name, detail.reputation_score, detail.bio);
//! }
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod platform;
pub mod reputation;
pub mod strategies;
pub mod synthetic;

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::EngineConfig;
use crate::core::error::{DiscoveryError, SourceError};
use crate::core::types::{ProfileDetail, ProfileSummary, StrategyOutcome};
use crate::extract::name::extract_name;
use crate::scraping::browser_manager::SessionPhase;

pub use context::DiscoveryContext;
pub use platform::Platform;
pub use reputation::ReputationScorer;
pub use strategies::{DetailStrategy, SearchStrategy};

pub struct ProfileEngineBuilder {
    config: EngineConfig,
    http: Option<reqwest::Client>,
    search_chain: Option<Vec<Box<dyn SearchStrategy>>>,
    detail_strategies: Option<Vec<Box<dyn DetailStrategy>>>,
}

impl ProfileEngineBuilder {
    /// Use `client` for every plain HTTP fetch instead of one built from the config.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Replace the search chain. Order is priority order.
    pub fn search_chain(mut self, chain: Vec<Box<dyn SearchStrategy>>) -> Self {
        self.search_chain = Some(chain);
        self
    }

    /// Replace the detail strategies. Platforms without one get synthetic detail.
    pub fn detail_strategies(mut self, strategies: Vec<Box<dyn DetailStrategy>>) -> Self {
        self.detail_strategies = Some(strategies);
        self
    }

    pub fn build(self) -> ProfileEngine {
        let http = self.http.unwrap_or_else(|| {
            self.config.http_client().unwrap_or_else(|e| {
                warn!("http client config rejected ({}); using defaults", e);
                reqwest::Client::new()
            })
        });
        let search_chain = self
            .search_chain
            .unwrap_or_else(|| strategies::default_search_chain(&self.config));
        let detail_strategies = self
            .detail_strategies
            .unwrap_or_else(strategies::default_detail_strategies);

        info!(
            strategies = ?search_chain.iter().map(|s| s.name()).collect::<Vec<_>>(),
            browser = self.config.browser_enabled,
            "profile engine ready"
        );

        ProfileEngine {
            ctx: DiscoveryContext::new(self.config, http),
            search_chain,
            detail_strategies,
        }
    }
}

/// Owns the strategy chain, the browser session and the random source.
///
/// Entry points take `&mut self`: one discovery call at a time per engine.
/// Share an engine across tasks behind a `tokio::sync::Mutex`, or build one
/// engine per worker.
pub struct ProfileEngine {
    ctx: DiscoveryContext,
    search_chain: Vec<Box<dyn SearchStrategy>>,
    detail_strategies: Vec<Box<dyn DetailStrategy>>,
}

impl ProfileEngine {
    pub fn builder(config: EngineConfig) -> ProfileEngineBuilder {
        ProfileEngineBuilder {
            config,
            http: None,
            search_chain: None,
            detail_strategies: None,
        }
    }

    pub fn new(config: EngineConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn browser_phase(&self) -> SessionPhase {
        self.ctx.browser.phase()
    }

    /// Up to `limit` profiles for `query`. Errors only on invalid input.
    pub async fn search(
        &mut self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProfileSummary>, DiscoveryError> {
        self.search_with_cancel(query, limit, &CancellationToken::new())
            .await
    }

    /// [`search`](Self::search) that stops early when `cancel` fires.
    ///
    /// Cancelled before the first strategy: `Err(Cancelled)`. Cancelled later:
    /// the running strategy is abandoned and synthetic results are returned.
    pub async fn search_with_cancel(
        &mut self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProfileSummary>, DiscoveryError> {
        let raw_query = query.trim();
        let query = validate_query(query)?;
        if limit == 0 {
            return Err(DiscoveryError::InvalidInput(
                "limit must be positive".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let started = Instant::now();
        let deadline = self.ctx.config.strategy_timeout;
        let mut attempted = 0usize;

        for strategy in &self.search_chain {
            if cancel.is_cancelled() {
                break;
            }
            if strategy.requires_browser() && !self.ctx.browser.is_available() {
                debug!(strategy = strategy.name(), "skipped: browser unavailable");
                continue;
            }

            attempted += 1;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(strategy = strategy.name(), "search cancelled mid-strategy");
                    break;
                }
                res = tokio::time::timeout(deadline, strategy.search(&mut self.ctx, &query, limit)) => {
                    res.unwrap_or(StrategyOutcome::Failed(SourceError::Timeout))
                }
            };

            let outcome = match outcome {
                StrategyOutcome::Success(profiles) => {
                    let before = profiles.len();
                    let named = profiles
                        .into_iter()
                        .filter(|p| !p.name.trim().is_empty())
                        .collect::<Vec<_>>();
                    if named.len() < before {
                        debug!(
                            strategy = strategy.name(),
                            dropped = before - named.len(),
                            "records without a name dropped"
                        );
                    }
                    StrategyOutcome::from(named)
                }
                other => other,
            };

            match outcome {
                StrategyOutcome::Success(mut profiles) => {
                    profiles.truncate(limit);
                    info!(
                        query = %query,
                        strategy = strategy.name(),
                        count = profiles.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "search answered"
                    );
                    return Ok(profiles);
                }
                StrategyOutcome::Failed(e) => {
                    warn!(query = %query, strategy = strategy.name(), error = %e, "strategy failed");
                }
                other => {
                    debug!(query = %query, strategy = strategy.name(), outcome = other.label(), "strategy found nothing");
                }
            }
        }

        if attempted == 0 && cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        // Caller's spelling: placeholder names contain the query as given.
        let profiles = synthetic::generate(&self.ctx.config.fallback, raw_query, limit);
        warn!(
            query = %query,
            degraded = true,
            attempted,
            cancelled = cancel.is_cancelled(),
            count = profiles.len(),
            "every source exhausted; returning synthetic profiles"
        );
        Ok(profiles)
    }

    /// Detail record for `profile_url`. Errors only on invalid input.
    pub async fn fetch_detail(&mut self, profile_url: &str) -> Result<ProfileDetail, DiscoveryError> {
        self.fetch_detail_with_cancel(profile_url, &CancellationToken::new())
            .await
    }

    /// [`fetch_detail`](Self::fetch_detail) that degrades to synthetic detail when `cancel` fires.
    pub async fn fetch_detail_with_cancel(
        &mut self,
        profile_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ProfileDetail, DiscoveryError> {
        let url = normalize_profile_url(profile_url)?;
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let platform = Platform::classify(&url);
        let name = extract_name(&url);
        let deadline = self.ctx.config.strategy_timeout;

        let result = match self.detail_strategies.iter().find(|s| s.platform() == platform) {
            Some(strategy) => {
                let attempt = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SourceError::Timeout),
                    res = tokio::time::timeout(deadline, strategy.fetch_detail(&mut self.ctx, &url, &name)) => {
                        res.unwrap_or(Err(SourceError::Timeout))
                    }
                };
                attempt.map_err(|e| (strategy.name(), e))
            }
            None => Err((
                "none",
                SourceError::Unavailable(format!("no strategy for {}", platform.label())),
            )),
        };

        match result {
            Ok(detail) => {
                info!(url = %url, strategy = detail.source.as_str(), "detail answered");
                Ok(detail)
            }
            Err((strategy, e)) => {
                warn!(
                    url = %url,
                    platform = platform.label(),
                    strategy,
                    error = %e,
                    degraded = true,
                    "detail lookup failed; returning synthetic detail"
                );
                Ok(synthetic::detail(
                    &self.ctx.config.fallback,
                    &mut self.ctx.scorer,
                    platform,
                    &url,
                    &name,
                ))
            }
        }
    }

    /// Close the browser session. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.ctx.browser.shutdown().await;
    }
}

fn validate_query(query: &str) -> Result<String, DiscoveryError> {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "query must not be empty".to_string(),
        ));
    }
    Ok(query)
}

/// Accept `http(s)` URLs; scheme-less input gets `https://`.
fn normalize_profile_url(raw: &str) -> Result<String, DiscoveryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "profile url must not be empty".to_string(),
        ));
    }
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    match url::Url::parse(&candidate) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {
            Ok(u.to_string())
        }
        Ok(u) => Err(DiscoveryError::InvalidInput(format!(
            "unsupported profile url {:?} (scheme {})",
            raw,
            u.scheme()
        ))),
        Err(e) => Err(DiscoveryError::InvalidInput(format!(
            "invalid profile url {:?}: {}",
            raw, e
        ))),
    }
}

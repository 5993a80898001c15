use crate::core::config::EngineConfig;
use crate::discovery::platform::Platform;
use crate::discovery::reputation::ReputationScorer;
use crate::scraping::browser_manager::BrowserSession;

/// Engine-owned state every strategy runs against.
///
/// Strategies borrow it mutably, one at a time: the browser session is a
/// single tab and cannot serve two navigations at once.
pub struct DiscoveryContext {
    pub http: reqwest::Client,
    pub browser: BrowserSession,
    pub config: EngineConfig,
    pub scorer: ReputationScorer,
}

impl DiscoveryContext {
    pub fn new(config: EngineConfig, http: reqwest::Client) -> Self {
        Self {
            browser: BrowserSession::new(&config),
            scorer: ReputationScorer::new(config.rng_seed),
            http,
            config,
        }
    }

    /// Reputation score in `platform`'s band.
    pub fn reputation(&mut self, platform: Platform) -> u8 {
        self.scorer.score(platform.reputation())
    }
}

//! Native headless browser session using `chromiumoxide`.
//!
//! This module owns:
//! * Finding a usable browser executable (Chromium, Chrome, then Brave).
//! * Building a headless launch config with stealth defaults.
//! * `BrowserSession`: the single lazily-launched browser + tab an engine renders
//!   script-driven pages with.
//!
//! Session lifecycle:
//!
//! ```text
//! Uninitialized ──navigate──▶ (launching) ──ok──▶ Ready ──shutdown──▶ Closed
//!                                 │
//!                                 └──err──▶ Unavailable ──shutdown──▶ Closed
//! ```
//!
//! A failed launch is never retried: `Unavailable` is sticky for the session's
//! lifetime and every navigation fails fast with `SourceError::ResourceInit`.

use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::config::{chrome_executable_override, EngineConfig};
use crate::core::error::SourceError;
use crate::scraping::fetch::{detect_block_reason, random_user_agent};

// ── Browser executable discovery ─────────────────────────────────────────────

/// Executable names looked up on `PATH`, most preferred first.
const BROWSER_BINARIES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "brave-browser"];

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];
#[cfg(not(target_os = "macos"))]
const INSTALL_PATHS: &[&str] = &["/usr/bin/chromium", "/usr/bin/google-chrome"];

/// First `BROWSER_BINARIES` entry present in one of `search_path`'s directories.
fn find_on_path(search_path: &std::ffi::OsStr) -> Option<String> {
    BROWSER_BINARIES.iter().find_map(|exe| {
        std::env::split_paths(search_path)
            .map(|dir| dir.join(exe))
            .find(|full| full.is_file())
            .map(|full| full.to_string_lossy().into_owned())
    })
}

/// Browser to launch: the `CHROME_EXECUTABLE` override, then `PATH`, then
/// the platform's usual install locations.
pub fn find_chrome_executable() -> Option<String> {
    chrome_executable_override()
        .or_else(|| std::env::var_os("PATH").and_then(|p| find_on_path(&p)))
        .or_else(|| {
            INSTALL_PATHS
                .iter()
                .find(|p| Path::new(p).is_file())
                .map(|p| p.to_string())
        })
}

// ── Headless browser config builder ──────────────────────────────────────────

/// Build a `BrowserConfig` for headless operation with stealth defaults.
///
/// `--disable-blink-features=AutomationControlled` hides the
/// `navigator.webdriver` flag; the UA is drawn from the desktop pool.
pub fn build_headless_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig, String> {
    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", random_user_agent()))
        .build()
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Upper bound on starting the browser and opening its tab.
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Observable lifecycle phase of a [`BrowserSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Ready,
    Unavailable,
    Closed,
}

struct ActiveBrowser {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

enum SessionState {
    Uninitialized,
    /// Set while a launch is awaited. Seen again afterwards, the launch was
    /// dropped by a deadline or cancellation and counts as failed.
    Launching,
    Ready(ActiveBrowser),
    Unavailable(String),
    Closed,
}

/// The one headless browser an engine owns. Single tab, not reentrant:
/// `navigate` takes `&mut self`, so only one navigation can be in flight.
pub struct BrowserSession {
    enabled: bool,
    executable: Option<String>,
    settle_delay: Duration,
    state: SessionState,
}

impl BrowserSession {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            enabled: config.browser_enabled,
            executable: config.chrome_executable.clone(),
            settle_delay: config.settle_delay,
            state: SessionState::Uninitialized,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Uninitialized => SessionPhase::Uninitialized,
            // `&self` cannot observe a launch in flight: this one was abandoned.
            SessionState::Launching => SessionPhase::Unavailable,
            SessionState::Ready(_) => SessionPhase::Ready,
            SessionState::Unavailable(_) => SessionPhase::Unavailable,
            SessionState::Closed => SessionPhase::Closed,
        }
    }

    /// `false` once browser strategies can no longer succeed in this session.
    pub fn is_available(&self) -> bool {
        self.enabled
            && matches!(
                self.state,
                SessionState::Uninitialized | SessionState::Ready(_)
            )
    }

    async fn launch(&self) -> Result<ActiveBrowser, String> {
        let exe = match &self.executable {
            Some(p) if Path::new(p).exists() => p.clone(),
            Some(p) => return Err(format!("configured browser not found at {}", p)),
            None => find_chrome_executable().ok_or_else(|| {
                "no browser found; install Brave, Chrome, or Chromium or set CHROME_EXECUTABLE"
                    .to_string()
            })?,
        };

        info!("browser session: launching headless instance ({})", exe);
        let config = build_headless_config(&exe, 1366, 900)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| format!("failed to launch ({}): {}", exe, e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser session CDP handler error: {}", e);
                }
            }
        });

        match browser.new_page("about:blank").await {
            Ok(page) => Ok(ActiveBrowser {
                browser,
                page,
                handler,
            }),
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                Err(format!("failed to open tab: {}", e))
            }
        }
    }

    async fn ensure_ready(&mut self) -> Result<&mut ActiveBrowser, SourceError> {
        if !self.enabled {
            return Err(SourceError::ResourceInit(
                "browser strategies disabled by configuration".to_string(),
            ));
        }

        match self.state {
            SessionState::Uninitialized => {
                self.state = SessionState::Launching;
                let launched = match tokio::time::timeout(LAUNCH_TIMEOUT, self.launch()).await {
                    Ok(res) => res,
                    Err(_) => Err(format!(
                        "launch did not finish within {}s",
                        LAUNCH_TIMEOUT.as_secs()
                    )),
                };
                self.state = match launched {
                    Ok(active) => SessionState::Ready(active),
                    Err(reason) => {
                        warn!("browser session unavailable: {}", reason);
                        SessionState::Unavailable(reason)
                    }
                };
            }
            SessionState::Launching => {
                let reason = "previous launch was interrupted before completing".to_string();
                warn!("browser session unavailable: {}", reason);
                self.state = SessionState::Unavailable(reason);
            }
            _ => {}
        }

        match &mut self.state {
            SessionState::Ready(active) => Ok(active),
            SessionState::Unavailable(reason) => Err(SourceError::ResourceInit(reason.clone())),
            SessionState::Closed => Err(SourceError::Closed),
            SessionState::Uninitialized | SessionState::Launching => Err(
                SourceError::ResourceInit("browser session not initialized".to_string()),
            ),
        }
    }

    /// Navigate the session's tab to `url`, wait the settle delay and return the rendered HTML.
    ///
    /// Launches the browser on first use.
    pub async fn navigate(&mut self, url: &str) -> Result<String, SourceError> {
        let settle = self.settle_delay;
        let active = self.ensure_ready().await?;

        active
            .page
            .goto(url)
            .await
            .map_err(|e| SourceError::Unavailable(format!("navigation to {} failed: {}", url, e)))?;

        tokio::time::sleep(settle).await;

        let html = active
            .page
            .content()
            .await
            .map_err(|e| SourceError::Unavailable(format!("failed to read page content: {}", e)))?;

        // Scripts already ran here, so `<noscript>` banners are not blocks.
        match detect_block_reason(reqwest::StatusCode::OK, &html) {
            Some(reason) if reason != "js_required" => Err(SourceError::Blocked { reason }),
            _ => Ok(html),
        }
    }

    /// Release the browser process. Idempotent; a no-op if it never launched.
    pub async fn shutdown(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Ready(mut active) => {
                if let Err(e) = active.browser.close().await {
                    warn!("browser close error (non-fatal): {}", e);
                }
                let _ = active.browser.wait().await;
                active.handler.abort();
                info!("browser session shut down");
            }
            SessionState::Uninitialized
            | SessionState::Launching
            | SessionState::Unavailable(_) => {
                info!("browser session closed (never launched)");
            }
            SessionState::Closed => {}
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Drop cannot await; inside a tokio runtime, hand the close to a task
        // so no Chromium process outlives a forgotten shutdown.
        let SessionState::Ready(_) = self.state else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        if let SessionState::Ready(mut active) =
            std::mem::replace(&mut self.state, SessionState::Closed)
        {
            handle.spawn(async move {
                let _ = active.browser.close().await;
                active.handler.abort();
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(browser_enabled: bool, exe: Option<&str>) -> EngineConfig {
        EngineConfig {
            browser_enabled,
            chrome_executable: exe.map(str::to_string),
            ..EngineConfig::offline()
        }
    }

    #[test]
    fn path_scan_prefers_earlier_binaries() {
        let root = std::env::temp_dir().join(format!("profile-scout-path-{}", std::process::id()));
        let (a, b) = (root.join("a"), root.join("b"));
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("google-chrome"), "").unwrap();
        std::fs::write(b.join("chromium"), "").unwrap();

        let joined = std::env::join_paths([&a, &b]).unwrap();
        assert_eq!(
            find_on_path(&joined),
            Some(b.join("chromium").to_string_lossy().into_owned())
        );

        let empty = std::env::join_paths([root.join("missing")]).unwrap();
        assert_eq!(find_on_path(&empty), None);
    }

    #[tokio::test]
    async fn shutdown_before_use_is_a_noop() {
        let mut session = BrowserSession::new(&config_with(true, None));
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        session.shutdown().await;
        session.shutdown().await;
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(!session.is_available());
    }

    #[tokio::test]
    async fn disabled_session_never_launches() {
        let mut session = BrowserSession::new(&config_with(false, None));
        let err = session.navigate("https://example.com").await.unwrap_err();
        assert!(matches!(err, SourceError::ResourceInit(_)));
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(!session.is_available());
    }

    #[tokio::test]
    async fn failed_launch_is_sticky() {
        let mut session =
            BrowserSession::new(&config_with(true, Some("/nonexistent/profile-scout/chrome")));
        assert!(session.is_available());

        let first = session.navigate("https://example.com").await.unwrap_err();
        assert!(matches!(first, SourceError::ResourceInit(_)));
        assert_eq!(session.phase(), SessionPhase::Unavailable);
        assert!(!session.is_available());

        let second = session.navigate("https://example.com").await.unwrap_err();
        assert_eq!(first, second);

        session.shutdown().await;
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(matches!(
            session.navigate("https://example.com").await,
            Err(SourceError::Closed)
        ));
    }

    /// An executable that records each start in `log` and then never answers.
    #[cfg(unix)]
    fn hanging_browser(tag: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!(
            "profile-scout-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let log = dir.join("launches.log");
        let _ = std::fs::remove_file(&log);
        let exe = dir.join("chrome");
        std::fs::write(
            &exe,
            format!("#!/bin/sh\necho started >> '{}'\nexec sleep 30\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        (exe, log)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interrupted_launch_is_not_retried() {
        let (exe, log) = hanging_browser("interrupted");
        let mut session = BrowserSession::new(&config_with(true, exe.to_str()));

        let cut = tokio::time::timeout(
            Duration::from_millis(300),
            session.navigate("https://example.com"),
        )
        .await;
        assert!(cut.is_err(), "launch should still be pending");
        assert_eq!(session.phase(), SessionPhase::Unavailable);
        assert!(!session.is_available());

        let again = tokio::time::timeout(
            Duration::from_secs(2),
            session.navigate("https://example.com"),
        )
        .await
        .expect("no second launch");
        assert!(matches!(again, Err(SourceError::ResourceInit(_))));

        tokio::time::sleep(Duration::from_millis(200)).await;
        let launches = std::fs::read_to_string(&log).unwrap_or_default();
        assert_eq!(launches.lines().count(), 1);

        session.shutdown().await;
        assert_eq!(session.phase(), SessionPhase::Closed);
    }
}

//! Browser discovery and headed launch via `chromiumoxide`.
//!
//! This module is the single source of truth for:
//! * Finding a usable browser executable (Brave → Chrome → Chromium, cross-platform).
//! * Building a *headed* browser configuration — the inspector needs a visible
//!   window the user can click in.
//! * [`InspectedBrowser`] — exclusive owner of the browser process, the CDP
//!   handler task, and the single inspected page, released on every exit path.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tracing::{info, warn};

use crate::core::config;

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan – finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    // 1. Explicit env override
    if let Some(p) = config::chrome_executable_override() {
        return Some(p);
    }

    // 2. PATH scan (Linux / macOS / Windows package managers)
    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "brave-browser",
            "brave",
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    // 3. Platform-specific well-known paths
    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/brave-browser",
            "/usr/bin/brave",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

// ── Headed browser config builder ────────────────────────────────────────────

/// Build a `BrowserConfig` for a visible interactive window.
///
/// Minimal flags — the window should behave like a normal user browser, with
/// only the sandbox/shm flags needed to run in CI / restricted environments.
pub fn build_headed_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig> {
    BrowserConfig::builder()
        .chrome_executable(exe)
        .with_head()
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-infobars")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

// ── Inspected browser session ────────────────────────────────────────────────

/// A launched headed browser with one inspected page.
///
/// The session loop owns this for its whole lifetime. Call [`close`] on every
/// exit path; `Drop` force-closes as a fallback so an early error or panic
/// never leaks a Chromium process.
///
/// [`close`]: InspectedBrowser::close
pub struct InspectedBrowser {
    browser: Option<Browser>,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    closed: Arc<AtomicBool>,
}

impl InspectedBrowser {
    /// Launch the browser and navigate the inspected page to `url`.
    pub async fn launch(url: &str) -> Result<Self> {
        let exe = find_chrome_executable().ok_or_else(|| {
            anyhow!(
                "No browser found. Install Brave, Chrome, or Chromium. \
                 Set CHROME_EXECUTABLE if installed in a non-standard location."
            )
        })?;

        info!("launching headed browser ({}) → {}", exe, url);

        let cfg = build_headed_config(&exe, 1280, 900)?;
        let (browser, mut handler) = Browser::launch(cfg)
            .await
            .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe, e))?;

        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = Arc::clone(&closed);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
            closed_flag.store(true, Ordering::SeqCst);
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to open page: {}", e))?;

        page.goto(url)
            .await
            .map_err(|e| anyhow!("Failed to navigate to {}: {}", url, e))?;

        // Brief settle so the initial DOM exists before the probe installs.
        tokio::time::sleep(Duration::from_millis(1200)).await;

        Ok(Self {
            browser: Some(browser),
            page,
            handler_task,
            closed,
        })
    }

    /// The single inspected page. `Page` is cheaply cloneable.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// `true` once the CDP event stream has ended (browser gone).
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Gracefully shut the browser down and stop the handler task.
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser close error (non-fatal): {}", e);
            }
            let _ = browser.wait().await;
            info!("browser session closed");
        }
        self.handler_task.abort();
    }
}

impl Drop for InspectedBrowser {
    fn drop(&mut self) {
        // Best-effort cleanup. Drop cannot await; if we're inside a tokio
        // runtime, spawn a task to close the browser to avoid zombie
        // Chromium processes. The handler task is left running — close()
        // needs it to drive the CDP connection, and it ends on its own once
        // the connection drops.
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        handle.spawn(async move {
            let _ = browser.close().await;
            let _ = browser.wait().await;
        });
    }
}

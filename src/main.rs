use anyhow::{Context, Result};
use tracing::info;

use dom_scout::{config, DomProbe, InspectSession, InspectedBrowser, TerminalGuard};

/// Target URL from the command line: `dom-scout <url>`, `dom-scout --url <url>`
/// or `dom-scout --url=<url>`.
fn parse_url_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1).peekable();
    while let Some(a) = args.next() {
        if a == "--url" {
            if let Some(v) = args.next() {
                return Some(v);
            }
        } else if let Some(rest) = a.strip_prefix("--url=") {
            return Some(rest.to_string());
        } else if !a.starts_with('-') {
            return Some(a);
        }
    }
    None
}

/// Log to a file — the live table owns the terminal.
fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("dom-scout.log")
        .context("failed to open dom-scout.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Install the probe and drive the session inside the terminal guard.
/// Split out so `main` can close the browser on both success and error.
async fn inspect(cfg: &config::InspectorConfig, browser: &InspectedBrowser) -> Result<()> {
    let probe = DomProbe::new(browser.page().clone());
    probe.install().await?;

    let mut guard = TerminalGuard::enter()?;
    let mut session = InspectSession::new(probe, cfg);
    session.run(guard.terminal()).await
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cfg = config::load(parse_url_from_args());
    info!("Starting dom-scout inspection of {}", cfg.url);

    let mut browser = InspectedBrowser::launch(&cfg.url).await?;
    let outcome = inspect(&cfg, &browser).await;
    browser.close().await;

    if outcome.is_ok() {
        println!("Inspection session ended.");
    }
    outcome
}

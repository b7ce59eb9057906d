use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// InspectorConfig — file-based config loader (dom-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_URL: &str = "DOM_SCOUT_URL";
pub const ENV_TICK_MS: &str = "DOM_SCOUT_TICK_MS";
pub const ENV_MAX_HISTORY: &str = "DOM_SCOUT_MAX_HISTORY";
pub const ENV_ELEMENTS_DIR: &str = "DOM_SCOUT_ELEMENTS_DIR";
pub const ENV_SCRAPERS_DIR: &str = "DOM_SCOUT_SCRAPERS_DIR";
pub const ENV_CONFIG: &str = "DOM_SCOUT_CONFIG";

/// Page opened when no target URL is supplied anywhere.
pub const DEFAULT_URL: &str = "https://www.google.com";
/// One poll-render iteration every 250 ms ≈ 4 refreshes per second.
pub const DEFAULT_TICK_MS: u64 = 250;
/// Bound on the recently-inspected history panel.
pub const DEFAULT_MAX_HISTORY: usize = 5;
pub const DEFAULT_ELEMENTS_DIR: &str = "scraped_elements";
pub const DEFAULT_SCRAPERS_DIR: &str = "scrapers";
/// Debounce window for save / generate-scraper; must exceed a human key press.
pub const SAVE_COOLDOWN_MS: u64 = 500;

/// Raw shape of `dom-scout.json`. Every field is optional; resolution adds
/// env-var and default fallbacks per field.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct FileConfig {
    pub url: Option<String>,
    pub tick_ms: Option<u64>,
    pub max_history: Option<usize>,
    pub elements_dir: Option<String>,
    pub scrapers_dir: Option<String>,
}

/// Fully-resolved session configuration.
#[derive(Clone, Debug)]
pub struct InspectorConfig {
    pub url: String,
    pub tick: Duration,
    pub max_history: usize,
    pub elements_dir: PathBuf,
    pub scrapers_dir: PathBuf,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        resolve(None, FileConfig::default())
    }
}

/// Load `dom-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `DOM_SCOUT_CONFIG` env var path
/// 2. `./dom-scout.json` (process cwd)
/// 3. `../dom-scout.json` (one level up)
///
/// Missing file → `FileConfig::default()` (all env-var fallbacks apply).
/// Parse error → log a warning, return `FileConfig::default()`.
pub fn load_file_config() -> FileConfig {
    let candidates: Vec<PathBuf> = {
        let mut v = vec![
            PathBuf::from("dom-scout.json"),
            PathBuf::from("../dom-scout.json"),
        ];
        if let Ok(env_path) = std::env::var(ENV_CONFIG) {
            v.insert(0, PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<FileConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("dom-scout.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "dom-scout.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return FileConfig::default();
                }
            },
            Err(_) => continue, // not found at this path — try next
        }
    }

    FileConfig::default()
}

/// Assemble the session config: CLI arg → env var → config file → default,
/// independently per field.
pub fn load(cli_url: Option<String>) -> InspectorConfig {
    resolve(cli_url, load_file_config())
}

fn resolve(cli_url: Option<String>, file: FileConfig) -> InspectorConfig {
    let url = cli_url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| env_string(ENV_URL))
        .or_else(|| file.url.clone().filter(|u| !u.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let url = validate_url(url);

    let tick_ms = env_parse::<u64>(ENV_TICK_MS)
        .or(file.tick_ms)
        .unwrap_or(DEFAULT_TICK_MS);

    let max_history = env_parse::<usize>(ENV_MAX_HISTORY)
        .or(file.max_history)
        .unwrap_or(DEFAULT_MAX_HISTORY);

    let elements_dir = env_string(ENV_ELEMENTS_DIR)
        .or_else(|| file.elements_dir.clone())
        .unwrap_or_else(|| DEFAULT_ELEMENTS_DIR.to_string());

    let scrapers_dir = env_string(ENV_SCRAPERS_DIR)
        .or_else(|| file.scrapers_dir.clone())
        .unwrap_or_else(|| DEFAULT_SCRAPERS_DIR.to_string());

    InspectorConfig {
        url,
        tick: Duration::from_millis(tick_ms),
        max_history,
        elements_dir: PathBuf::from(elements_dir),
        scrapers_dir: PathBuf::from(scrapers_dir),
    }
}

/// Reject URLs the browser cannot navigate to; fall back to the default
/// rather than aborting, since the inspector is still usable on any page.
fn validate_url(candidate: String) -> String {
    match url::Url::parse(&candidate) {
        Ok(_) => candidate,
        Err(e) => {
            tracing::warn!(
                "invalid target URL '{}': {} — falling back to {}",
                candidate,
                e,
                DEFAULT_URL
            );
            DEFAULT_URL.to_string()
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see `browser::launcher`). Only returns
/// a value when `CHROME_EXECUTABLE` points at an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if std::path::Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let file: FileConfig = serde_json::from_str(
            r#"{"tick_ms": 100, "max_history": 9, "elements_dir": "out/elements"}"#,
        )
        .unwrap();
        let cfg = resolve(None, file);
        assert_eq!(cfg.tick, Duration::from_millis(100));
        assert_eq!(cfg.max_history, 9);
        assert_eq!(cfg.elements_dir, PathBuf::from("out/elements"));
        assert_eq!(cfg.scrapers_dir, PathBuf::from(DEFAULT_SCRAPERS_DIR));
    }

    #[test]
    fn cli_url_wins_over_file_url() {
        let file = FileConfig {
            url: Some("https://file.example".to_string()),
            ..Default::default()
        };
        let cfg = resolve(Some("https://cli.example".to_string()), file);
        assert_eq!(cfg.url, "https://cli.example");
    }

    #[test]
    fn blank_cli_url_falls_through() {
        let file = FileConfig {
            url: Some("https://file.example".to_string()),
            ..Default::default()
        };
        let cfg = resolve(Some("   ".to_string()), file);
        assert_eq!(cfg.url, "https://file.example");
    }

    #[test]
    fn invalid_url_falls_back_to_default() {
        let cfg = resolve(Some("not a url".to_string()), FileConfig::default());
        assert_eq!(cfg.url, DEFAULT_URL);
    }

    #[test]
    fn partial_file_parses() {
        let file: FileConfig = serde_json::from_str(r#"{"url": "https://a.example"}"#).unwrap();
        assert_eq!(file.url.as_deref(), Some("https://a.example"));
        assert!(file.tick_ms.is_none());
    }
}

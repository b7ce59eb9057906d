//! Persistence sinks: element snapshots and scraper stubs.
//!
//! Both sinks create their output directory on demand and name files with a
//! `_<YYYYMMDD_HHMMSS>` local timestamp. Failures are typed so the session
//! loop can surface them on the notice line and keep running.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::inspector::descriptor::ElementDescriptor;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create directory {dir}: {source}")]
    CreateDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize element: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Standalone Python scraper parameterized by the selector computed for the
/// saved element. The preference order (id → classes → tag) lives in
/// [`ElementDescriptor::preferred_selector`]; this template just embeds the
/// result.
const SCRAPER_TEMPLATE: &str = r#"def scrape_element(url):
    import requests
    from bs4 import BeautifulSoup

    headers = {'User-Agent': 'Mozilla/5.0'}
    response = requests.get(url, headers=headers)
    soup = BeautifulSoup(response.text, 'html.parser')

    element = soup.select_one("{selector}")
    if not element:
        return None

    return {
        'tag': element.name,
        'text': element.text.strip(),
        'html': str(element),
        'attributes': element.attrs
    }
"#;

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn ensure_dir(dir: &Path) -> Result<(), SinkError> {
    std::fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
        dir: dir.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), SinkError> {
    std::fs::write(path, contents).map_err(|source| SinkError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Write the descriptor as indented UTF-8 JSON under `dir`, returning the
/// file path. The JSON contains exactly the descriptor fields under their
/// wire names.
pub fn save_element(descriptor: &ElementDescriptor, dir: &Path) -> Result<PathBuf, SinkError> {
    ensure_dir(dir)?;
    let path = dir.join(format!("element_{}.json", timestamp()));
    let json = serde_json::to_string_pretty(descriptor)?;
    write_file(&path, &json)?;
    info!("element saved to {}", path.display());
    Ok(path)
}

/// Write a standalone scraper stub for `selector` under `dir`, returning the
/// file path.
pub fn save_scraper_stub(selector: &str, dir: &Path) -> Result<PathBuf, SinkError> {
    ensure_dir(dir)?;
    let path = dir.join(format!("scraper_{}.py", timestamp()));
    let stub = SCRAPER_TEMPLATE.replace("{selector}", selector);
    write_file(&path, &stub)?;
    info!("scraper stub saved to {}", path.display());
    Ok(path)
}

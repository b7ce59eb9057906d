//! In-page instrumentation exposing the current selection via a pull query.
//!
//! The probe installs a mousedown handler into the live page that captures a
//! descriptor of the clicked element, outlines it, and parks the descriptor
//! in a window-global slot. There is no push channel across the CDP
//! boundary, so the host polls [`DomProbe::query`] once per tick.
//!
//! Invariant: at most one element is outlined at a time — selecting a new
//! element clears the previous outline first, and [`DomProbe::clear`] resets
//! both the outline and the slot.

use anyhow::{anyhow, Result};
use chromiumoxide::Page;
use tracing::warn;

use crate::inspector::descriptor::ElementDescriptor;

/// Registers the selection handler. Mirrors the descriptor shape consumed by
/// [`ElementDescriptor`]: `class`, `children` and `parent` wire names, text
/// and html truncated to 100 chars, computed-style dimensions as strings.
const SELECT_SCRIPT: &str = r#"
    window.__domScoutSelection = null;
    window.__domScoutOutlined = null;

    document.addEventListener('mousedown', function (e) {
        if (window.__domScoutOutlined) {
            window.__domScoutOutlined.style.outline = '';
        }
        const el = e.target;
        window.__domScoutOutlined = el;
        window.__domScoutSelection = {
            tag: el.tagName.toLowerCase(),
            class: typeof el.className === 'string' ? el.className : '',
            id: el.id,
            attributes: Array.from(el.attributes)
                .map(a => `${a.name}="${a.value}"`).join(' '),
            text: el.textContent.trim().substring(0, 100),
            html: el.innerHTML.substring(0, 100),
            dimensions: {
                width: window.getComputedStyle(el).width,
                height: window.getComputedStyle(el).height,
                position: window.getComputedStyle(el).position
            },
            children: el.children.length,
            parent: el.parentElement ? el.parentElement.tagName.toLowerCase() : 'none'
        };
        el.style.outline = '2px solid red';
        e.preventDefault();
    });
"#;

const CLEAR_SCRIPT: &str = r#"
    if (window.__domScoutOutlined) {
        window.__domScoutOutlined.style.outline = '';
    }
    window.__domScoutOutlined = null;
    window.__domScoutSelection = null;
"#;

const QUERY_SCRIPT: &str = "window.__domScoutSelection || null";

/// Handle to the probe installed in one inspected page.
///
/// Every method talks to the live page synchronously; any CDP failure means
/// the page navigated away or the browser died, which is fatal for the
/// session — the inspector's only reason to exist is the live binding.
pub struct DomProbe {
    page: Page,
}

impl DomProbe {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// Install the select handler into the page. Call once after navigation.
    pub async fn install(&self) -> Result<()> {
        self.page
            .evaluate(SELECT_SCRIPT)
            .await
            .map_err(|e| anyhow!("Failed to install DOM probe: {}", e))?;
        Ok(())
    }

    /// Remove the current outline, if any, and null the selection slot.
    pub async fn clear(&self) -> Result<()> {
        self.page
            .evaluate(CLEAR_SCRIPT)
            .await
            .map_err(|e| anyhow!("Failed to clear selection: {}", e))?;
        Ok(())
    }

    /// Pull the current selection. `Ok(None)` means nothing is selected; a
    /// descriptor the host cannot decode is logged and treated as no
    /// selection rather than killing the session.
    pub async fn query(&self) -> Result<Option<ElementDescriptor>> {
        let value: serde_json::Value = self
            .page
            .evaluate(QUERY_SCRIPT)
            .await
            .map_err(|e| anyhow!("Failed to query selection: {}", e))?
            .into_value()
            .map_err(|e| anyhow!("Failed to read selection value: {}", e))?;

        if value.is_null() {
            return Ok(None);
        }
        match serde_json::from_value::<ElementDescriptor>(value) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) => {
                warn!("malformed selection descriptor from page: {}", e);
                Ok(None)
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Computed-style metrics for one element, as reported by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub position: String,
}

/// Structured snapshot of one DOM element's identity and rendered metrics.
///
/// Field names mirror the JSON object built by the in-page probe, which is
/// also the wire format of saved element files: `class`, `children` and
/// `parent` on the wire map to `class_attr`, `child_count` and `parent_tag`
/// here. `text` and `html` arrive pre-truncated to 100 chars by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub tag: String,
    #[serde(rename = "class", default)]
    pub class_attr: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(rename = "children", default)]
    pub child_count: u32,
    #[serde(rename = "parent", default = "parent_sentinel")]
    pub parent_tag: String,
}

/// Probe-side sentinel for "element has no parent" (e.g. `<html>`).
fn parent_sentinel() -> String {
    "none".to_string()
}

impl ElementDescriptor {
    /// Preferred CSS selector for this element: the id selector when an id is
    /// present, else the dot-joined class selector, else the bare tag name.
    pub fn preferred_selector(&self) -> String {
        if !self.id.trim().is_empty() {
            return format!("#{}", self.id.trim());
        }
        let classes: Vec<&str> = self.class_attr.split_whitespace().collect();
        if !classes.is_empty() {
            return format!(".{}", classes.join("."));
        }
        self.tag.clone()
    }
}

//! API request and response types.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/config`: every stage and scene the switcher knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub stages: Vec<StageInfo>,
    #[serde(default)]
    pub scenes: Vec<SceneInfo>,
}

/// A named output bus as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageInfo {
    #[serde(rename = "Name")]
    pub name: String,
    /// Program stage this stage previews. Empty when unlinked.
    #[serde(rename = "PreviewFor", default)]
    pub preview_for: String,
}

impl StageInfo {
    pub fn new(name: impl Into<String>, preview_for: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preview_for: preview_for.into(),
        }
    }

    /// Whether this stage feeds another stage as its preview bus.
    pub fn is_preview_link(&self) -> bool {
        !self.preview_for.is_empty()
    }
}

/// A selectable scene. Scenes are global; any stage may show any scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneInfo {
    /// Stable identifier used in API paths and events
    #[serde(rename = "Code")]
    pub code: String,
    /// Short label for the selector button
    #[serde(rename = "Tag", default)]
    pub tag: String,
    /// Long description shown as tooltip
    #[serde(rename = "Label", default)]
    pub label: String,
}

impl SceneInfo {
    pub fn new(code: impl Into<String>, tag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            tag: tag.into(),
            label: label.into(),
        }
    }
}

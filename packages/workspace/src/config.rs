use crate::error::StateResult;
use reshaper_editor::{WorkspaceOptions, DEFAULT_CLASS_ATTRIBUTE};
use reshaper_syntax::DEFAULT_TAG_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "reshaper.config.json";

/// Reshaper configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet period after the last edit before the file is written
    pub save_debounce_ms: u64,

    /// Edits closer together than this undo as one step
    pub undo_coalesce_ms: u64,

    /// Undo steps kept; 0 keeps everything
    pub undo_max_levels: usize,

    /// Attribute the preview build tags elements with
    pub tag_attribute: String,

    /// Attribute edited as an element's class list
    pub class_attribute: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 100,
            undo_coalesce_ms: 1000,
            undo_max_levels: 100,
            tag_attribute: DEFAULT_TAG_ATTRIBUTE.to_string(),
            class_attribute: DEFAULT_CLASS_ATTRIBUTE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> StateResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn workspace_options(&self) -> WorkspaceOptions {
        WorkspaceOptions {
            undo_window: Duration::from_millis(self.undo_coalesce_ms),
            undo_max_levels: self.undo_max_levels,
            class_attribute: self.class_attribute.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{ "saveDebounceMs": 250, "classAttribute": "class" }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
        assert_eq!(config.class_attribute, "class");
        assert_eq!(config.undo_coalesce_ms, 1000);
        assert_eq!(config.tag_attribute, "data-reshaper-loc");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.workspace_options().undo_max_levels, 100);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ nope").unwrap();

        let err = EditorConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, StateError::Config(_)));
    }
}

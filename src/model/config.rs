use serde::{Deserialize, Serialize};

/// Configuration from trellis.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSection {
    /// Window for suppressing duplicate input triggers, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Require confirmation before delete
    #[serde(default = "default_true")]
    pub confirm_delete: bool,
    /// Seconds of dirty idle time before autosave fires; 0 disables
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,
}

impl Default for EditorSection {
    fn default() -> Self {
        EditorSection {
            debounce_ms: default_debounce_ms(),
            confirm_delete: true,
            autosave_secs: default_autosave_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSection {
    /// Colors offered in the row-style menu
    #[serde(default)]
    pub colors: Vec<String>,
    /// Show completed items when rendering the outline
    #[serde(default = "default_true")]
    pub show_done: bool,
}

impl Default for UiSection {
    fn default() -> Self {
        UiSection {
            colors: Vec::new(),
            show_done: true,
        }
    }
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_autosave_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: EditorConfig = toml::from_str("").unwrap();
        assert_eq!(config.editor.debounce_ms, 100);
        assert!(config.editor.confirm_delete);
        assert_eq!(config.editor.autosave_secs, 30);
        assert!(config.ui.show_done);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: EditorConfig = toml::from_str("[editor]\nconfirm_delete = false\n").unwrap();
        assert!(!config.editor.confirm_delete);
        assert_eq!(config.editor.debounce_ms, 100);
    }
}

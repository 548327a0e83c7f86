//! Process-wide settings controlling which providers are offered.

use crate::error::{FixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only enable/disable lookup keyed by provider id or diagnostic id.
///
/// Loaded once at startup and shared (behind an `Arc`) with the dispatcher.
///
/// # Example YAML
///
/// ```yaml
/// enabled_by_default: true
/// overrides:
///   add-braces: false
///   CS0152: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSettings {
    /// Whether ids without an override are enabled.
    #[serde(default = "default_enabled")]
    pub enabled_by_default: bool,

    /// Explicit per-id settings.
    #[serde(default)]
    pub overrides: BTreeMap<String, bool>,
}

fn default_enabled() -> bool {
    true
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            overrides: BTreeMap::new(),
        }
    }
}

impl FixSettings {
    /// Settings with every provider enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables an id.
    pub fn disable(mut self, id: impl Into<String>) -> Self {
        self.overrides.insert(id.into(), false);
        self
    }

    /// Enables an id.
    pub fn enable(mut self, id: impl Into<String>) -> Self {
        self.overrides.insert(id.into(), true);
        self
    }

    /// Returns whether the given provider or diagnostic id is enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.overrides
            .get(id)
            .copied()
            .unwrap_or(self.enabled_by_default)
    }

    /// Load settings from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| {
            FixError::InvalidConfig(format!("Failed to parse YAML settings: {}", e))
        })
    }

    /// Load settings from a JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            FixError::InvalidConfig(format!("Failed to parse JSON settings: {}", e))
        })
    }

    /// Load settings, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            Some("json") => Self::from_json(path),
            _ => Err(FixError::InvalidConfig(format!(
                "Unknown settings format: {}",
                path.display()
            ))),
        }
    }

    /// Save settings to a YAML file.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let settings = FixSettings::new();
        assert!(settings.is_enabled("add-braces"));
        assert!(settings.is_enabled("CS0152"));
    }

    #[test]
    fn test_overrides() {
        let settings = FixSettings::new().disable("add-braces").enable("CS0152");
        assert!(!settings.is_enabled("add-braces"));
        assert!(settings.is_enabled("CS0152"));
        assert!(settings.is_enabled("remove-braces"));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
enabled_by_default: false
overrides:
  simplify-boolean-comparison: true
"#;
        let settings: FixSettings = serde_yaml::from_str(yaml).unwrap();
        assert!(!settings.is_enabled("add-braces"));
        assert!(settings.is_enabled("simplify-boolean-comparison"));
    }

    #[test]
    fn test_parse_json_with_missing_fields() {
        let settings: FixSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, FixSettings::default());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixes.yml");
        let settings = FixSettings::new().disable("merge-string-literals");
        settings.save_yaml(&path).unwrap();

        assert_eq!(FixSettings::load(&path).unwrap(), settings);
        assert!(FixSettings::load(dir.path().join("fixes.toml")).is_err());
    }
}

//! Engine configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header values written to XBEL documents when the network carries none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDefaults {
    pub version: String,
    pub copyright: Option<String>,
    pub contact_info: Option<String>,
    pub authors: Vec<String>,
    pub licenses: Vec<String>,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            copyright: None,
            contact_info: None,
            authors: Vec::new(),
            licenses: Vec::new(),
        }
    }
}

/// Configuration shared by import and export sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Implicit namespace of XBEL functions, predicates and unqualified
    /// parameters; omitted on export.
    pub default_namespace: String,
    /// Bound of the term/statement visitation stack during export.
    pub max_term_depth: usize,
    /// Recorded on provenance events.
    pub owner: String,
    pub header: HeaderDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_namespace: "BEL".to_string(),
            max_term_depth: 256,
            owner: "bionet".to_string(),
            header: HeaderDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bionet.json");
        std::fs::write(&path, r#"{ "max_term_depth": 8, "header": { "authors": ["A. Curator"] } }"#)
            .unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.max_term_depth, 8);
        assert_eq!(config.default_namespace, "BEL");
        assert_eq!(config.header.version, "1.0");
        assert_eq!(config.header.authors, vec!["A. Curator".to_string()]);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = EngineConfig::from_path(Path::new("/nonexistent/bionet.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bionet.json"));
    }
}

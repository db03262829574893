use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sitemap::Classifier;

/// Public base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://docs.incerto.in";

/// Documentation content root, relative to the working directory.
pub const DEFAULT_CONTENT_DIR: &str = "./app";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub sitemap: Classifier,
}

impl Config {
    /// Read a `docmap.toml` file. Missing tables and keys keep their defaults.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub content_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::ChangeFrequency;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.base_url, "https://docs.incerto.in");
        assert_eq!(config.site.content_dir, PathBuf::from("./app"));
        assert_eq!(config.sitemap.rules.len(), 4);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"site": {"base_url": "https://example.com"}}"#).unwrap();
        assert_eq!(config.site.base_url, "https://example.com");
        assert_eq!(config.site.content_dir, PathBuf::from("./app"));
        assert_eq!(config.sitemap, Classifier::default());
    }

    #[test]
    fn test_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docmap.toml");
        std::fs::write(
            &path,
            r#"
[site]
base_url = "https://example.com"

[sitemap]
default_priority = 0.5

[[sitemap.rules]]
path = "/get-started/quick-start"
match = "exact"
priority = 1.0
change_frequency = "daily"
"#,
        )
        .unwrap();

        let config = Config::read(&path).unwrap();
        assert_eq!(config.site.base_url, "https://example.com");
        assert_eq!(config.site.content_dir, PathBuf::from("./app"));
        assert_eq!(config.sitemap.rules.len(), 1);
        assert_eq!(config.sitemap.default_priority, 0.5);
        assert_eq!(config.sitemap.default_change_frequency, ChangeFrequency::Weekly);
        assert_eq!(config.sitemap.classify("/get-started/quick-start").priority, 1.0);
    }

    #[test]
    fn test_read_errors() {
        let dir = TempDir::new().unwrap();

        let missing = Config::read(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));

        let path = dir.path().join("docmap.toml");
        std::fs::write(&path, "[site\nbase_url = 1").unwrap();
        let invalid = Config::read(&path).unwrap_err();
        assert!(matches!(invalid, ConfigError::Parsing(_)));
        assert!(invalid.to_string().starts_with("TOML parse error"));
    }
}

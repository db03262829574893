use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use docmap_core::{Classifier, SiteConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Environment variables holding the public base URL of the site, in order
/// of preference. `NEXT_PUBLIC_SITE_URL` is what existing deployments set.
pub const SITE_URL_ENV: [&str; 2] = ["SITE_URL", "NEXT_PUBLIC_SITE_URL"];

pub const DEFAULT_CONFIG_FILE: &str = "./docmap.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DocmapConfig {
    /// Command configuration
    pub build: BuildConfig,
    /// Base URL and content root
    pub site: SiteConfig,
    /// Priority and change-frequency rules
    pub sitemap: Classifier,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Where `build` writes the sitemap
    pub output: String,
    /// Sitemap format written by `build`: `xml` or `json`
    pub format: String,
    /// Host for the sitemap server
    pub host: String,
    /// Port for the sitemap server
    pub port: u16,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "./out/sitemap.xml".to_string(),
            format: "xml".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl DocmapConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (DOCMAP_*)
    /// 3. `SITE_URL`, then `NEXT_PUBLIC_SITE_URL`
    /// 4. Configuration file
    /// 5. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        Self::load_with_env(args, |name| std::env::var(name).ok())
    }

    fn load_with_env(args: &ArgMatches, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_file = string_arg(args, "config")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(&config_file));
        }

        // 3. The conventional site URL variables
        if let Some(site_url) = site_url_from_env(lookup) {
            let overrides = HashMap::from([("site.base_url".to_string(), site_url)]);
            builder = builder.add_source(config::Config::try_from(&overrides)?);
        }

        // 4. Add environment variables with DOCMAP_ prefix
        builder = builder.add_source(
            Environment::with_prefix("DOCMAP")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 5. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();

        if let Some(content) = string_arg(args, "content") {
            cli_overrides.insert("site.content_dir".to_string(), content.clone());
        }
        if let Some(base_url) = string_arg(args, "base-url") {
            cli_overrides.insert("site.base_url".to_string(), base_url.clone());
        }
        if let Some(output) = string_arg(args, "output") {
            cli_overrides.insert("build.output".to_string(), output.clone());
        }
        if let Some(format) = string_arg(args, "format") {
            cli_overrides.insert("build.format".to_string(), format.clone());
        }
        if let Some(host) = string_arg(args, "host") {
            cli_overrides.insert("build.host".to_string(), host.clone());
        }
        if let Some(port) = args.try_get_one::<u16>("port").unwrap_or(None) {
            cli_overrides.insert("build.port".to_string(), port.to_string());
        }

        builder = builder.add_source(config::Config::try_from(&cli_overrides)?);

        // Build and deserialize
        let config = builder.build()?;
        let docmap_config: DocmapConfig = config.try_deserialize()?;
        debug!("{docmap_config:#?}");

        Ok(docmap_config)
    }

    /// The settings the shared scanning routine and the server need
    pub fn docs_config(&self) -> docmap_core::Config {
        docmap_core::Config {
            site: self.site.clone(),
            sitemap: self.sitemap.clone(),
        }
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

/// First non-empty site URL variable
fn site_url_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    SITE_URL_ENV
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|url| !url.is_empty())
}

/// Only read args that are actually defined for this command
fn string_arg<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a String> {
    args.try_get_one::<String>(id).unwrap_or(None)
}

pub mod config;
pub mod meta;
pub mod route;
pub mod scanner;
pub mod sitemap;

use std::path::Path;

use chrono::Utc;

// Re-export main types
pub use config::{Config, ConfigError, SiteConfig};
pub use meta::{MetaMap, MetaValue};
pub use route::Route;
pub use scanner::{RouteScanner, ScanError};
pub use sitemap::{ChangeFrequency, Classifier, Rule, Sitemap, SitemapEntry};

/// Result of one scan: the discovered routes and the sitemap built from them.
#[derive(Debug, Clone)]
pub struct SitemapBuild {
    pub routes: Vec<Route>,
    pub sitemap: Sitemap,
}

/// Scan `root` and build its sitemap under `base_url`.
///
/// Every entry point (the `scan` and `build` commands and the sitemap
/// server) goes through this function.
pub fn generate_sitemap<P: AsRef<Path>>(
    root: P,
    base_url: &str,
    classifier: &Classifier,
) -> Result<SitemapBuild, ScanError> {
    let routes = RouteScanner::new(root).scan()?;
    let sitemap = Sitemap::from_routes(base_url, &routes, classifier, Utc::now());
    Ok(SitemapBuild { routes, sitemap })
}

use anyhow::{Context, Result};
use clap::{ArgMatches, Command};
use docmap_core::sitemap::{format_priority, normalize_base_url};
use docmap_core::{SitemapBuild, generate_sitemap};
use std::io::{self, Write};

use crate::cmd::add_docs_args;
use crate::config::DocmapConfig;

pub fn make_subcommand() -> Command {
    add_docs_args(Command::new("scan"))
        .about("Scan the documentation tree and print the sitemap it would produce")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = DocmapConfig::load(args)?;
    let site = &config.site;

    println!("Scanning documentation files in {}...", site.content_dir.display());
    let build = generate_sitemap(&site.content_dir, &site.base_url, &config.sitemap)
        .with_context(|| format!("Failed to scan {}", site.content_dir.display()))?;

    write_report(&mut io::stdout().lock(), &build, &site.base_url)?;

    Ok(())
}

/// Lists the discovered pages and the sitemap entries built from them
pub fn write_report(out: &mut impl Write, build: &SitemapBuild, base_url: &str) -> io::Result<()> {
    writeln!(out, "Found {} documentation pages:", build.routes.len())?;
    for route in &build.routes {
        writeln!(out, "  - {route}")?;
    }

    writeln!(out)?;
    writeln!(out, "Generated sitemap entries:")?;
    for entry in build.sitemap.entries() {
        writeln!(
            out,
            "  - {} (priority: {}, frequency: {})",
            entry.url,
            format_priority(entry.priority),
            entry.change_frequency
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Successfully generated sitemap with {} entries", build.sitemap.len())?;
    writeln!(
        out,
        "Your sitemap will be available at: {}/sitemap.xml",
        normalize_base_url(base_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmap_core::Classifier;
    use tempfile::TempDir;

    fn matches_for(content: &str, config: &str) -> ArgMatches {
        make_subcommand()
            .try_get_matches_from(vec!["scan", "--content", content, "--config", config])
            .unwrap()
    }

    #[test]
    fn test_scan_succeeds_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("app");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(content.join("intro.mdx"), "").unwrap();
        let missing_config = dir.path().join("missing.toml");

        execute(&matches_for(content.to_str().unwrap(), missing_config.to_str().unwrap())).unwrap();

        let files: Vec<_> = std::fs::read_dir(&content).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_report_lists_routes_and_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_meta.js"), "export default { intro: 'Introduction' }").unwrap();
        std::fs::write(dir.path().join("intro.mdx"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("database")).unwrap();
        std::fs::write(dir.path().join("database/index.mdx"), "").unwrap();

        let build = generate_sitemap(dir.path(), "https://example.com/", &Classifier::default()).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &build, "https://example.com/").unwrap();
        let report = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Found 2 documentation pages:");
        assert!(lines.contains(&"  - /intro (Introduction)"));
        assert!(lines.contains(&"  - /database"));
        assert!(lines.contains(&"Generated sitemap entries:"));
        assert!(lines.contains(&"  - https://example.com (priority: 1.0, frequency: daily)"));
        assert!(lines.contains(&"  - https://example.com/intro (priority: 0.6, frequency: weekly)"));
        assert!(lines.contains(&"  - https://example.com/database (priority: 0.7, frequency: weekly)"));
        assert_eq!(lines[lines.len() - 2], "Successfully generated sitemap with 3 entries");
        assert_eq!(lines[lines.len() - 1], "Your sitemap will be available at: https://example.com/sitemap.xml");
    }

    #[test]
    fn test_scan_reports_missing_content() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("missing");
        let missing_config = dir.path().join("missing.toml");

        let err = execute(&matches_for(content.to_str().unwrap(), missing_config.to_str().unwrap())).unwrap_err();

        assert!(err.to_string().starts_with("Failed to scan"));
    }
}

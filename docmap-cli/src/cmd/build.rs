use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use docmap_core::{Sitemap, generate_sitemap};
use std::path::Path;

use crate::cmd::add_docs_args;
use crate::config::DocmapConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unknown sitemap format `{other}` (expected `xml` or `json`)"),
        }
    }

    pub fn render(&self, sitemap: &Sitemap) -> Result<String> {
        match self {
            OutputFormat::Xml => Ok(sitemap.to_xml()),
            OutputFormat::Json => Ok(sitemap.to_json()?),
        }
    }
}

pub fn make_subcommand() -> Command {
    add_docs_args(Command::new("build"))
        .about("Generate the sitemap and write it to a file")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Sitemap output file [default: ./out/sitemap.xml]"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .value_parser(["xml", "json"])
                .help("Sitemap format [default: xml]"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = DocmapConfig::load(args)?;
    let build_config = config.build_config();
    let format = OutputFormat::parse(&build_config.format)?;
    let output = Path::new(&build_config.output);

    let site = &config.site;
    let build = generate_sitemap(&site.content_dir, &site.base_url, &config.sitemap)
        .with_context(|| format!("Failed to scan {}", site.content_dir.display()))?;

    write_sitemap(&build.sitemap, format, output)?;

    println!(
        "Sitemap with {} entries written to {}",
        build.sitemap.len(),
        output.display()
    );

    Ok(())
}

fn write_sitemap(sitemap: &Sitemap, format: OutputFormat, output: &Path) -> Result<()> {
    let rendered = format.render(sitemap)?;

    // Ensure parent directory exists
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(output, rendered)
        .with_context(|| format!("Failed to write sitemap to {}", output.display()))?;

    Ok(())
}

mod cmd;
mod config;

use anyhow::{Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("docmap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover documentation routes and generate their sitemap")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log progress and metadata warnings in detail")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(cmd::scan::make_subcommand())
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

fn init_tracing(verbose: bool) {
    // --verbose enables debug output for the scanner, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info,docmap_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("scan", args)) => cmd::scan::execute(args),
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cmd::serve::execute(args))
        }
        Some((name, _)) => bail!("Unknown command: {name}"),
        None => bail!("No command given"),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error generating sitemap: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let matches = cli()
            .try_get_matches_from(vec!["docmap", "scan", "--verbose"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        assert_eq!(matches.subcommand_name(), Some("scan"));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(cli().try_get_matches_from(vec!["docmap"]).is_err());
    }
}

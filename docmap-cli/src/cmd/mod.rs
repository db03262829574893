pub mod build;
pub mod scan;
pub mod serve;

use clap::{Arg, Command};

/// Arguments shared by every command that scans the documentation tree.
///
/// None of them carry clap defaults: unset flags fall through to the config
/// file, the environment and finally the built-in defaults.
pub fn add_docs_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("content")
                .short('d')
                .long("content")
                .value_name("DIR")
                .help("Documentation content directory [default: ./app]"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Public base URL of the site [env: SITE_URL, NEXT_PUBLIC_SITE_URL]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./docmap.toml]"),
        )
}

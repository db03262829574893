use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use docmap_server::{SitemapServer, SitemapServerConfig};

use crate::cmd::add_docs_args;
use crate::config::DocmapConfig;

pub fn make_subcommand() -> Command {
    add_docs_args(Command::new("serve"))
        .about("Serve /sitemap.xml, regenerated on every request")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = DocmapConfig::load(args)?;
    let build_config = config.build_config();

    let server = SitemapServer::new(SitemapServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        docs: config.docs_config(),
    });

    server.run().await
}

use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use docmap_core::{Config, SitemapBuild, generate_sitemap};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

/// Well-known path of the XML sitemap.
pub const SITEMAP_XML_PATH: &str = "/sitemap.xml";
/// Path of the JSON rendition of the same entries.
pub const SITEMAP_JSON_PATH: &str = "/sitemap.json";

/// Configuration for the sitemap server
#[derive(Debug, Clone)]
pub struct SitemapServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Content root, base URL and classification rules
    pub docs: Config,
}

impl Default for SitemapServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            docs: Config::default(),
        }
    }
}

/// Serves the sitemap of a documentation tree, rescanning on every request.
pub struct SitemapServer {
    config: SitemapServerConfig,
}

impl SitemapServer {
    pub fn new(config: SitemapServerConfig) -> Self {
        Self { config }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            docs: Arc::new(self.config.docs.clone()),
        };

        Router::new()
            .route(SITEMAP_XML_PATH, get(sitemap_xml))
            .route(SITEMAP_JSON_PATH, get(sitemap_json))
            .with_state(state)
    }

    pub async fn run(self) -> Result<()> {
        let content_dir = &self.config.docs.site.content_dir;
        if !content_dir.exists() {
            return Err(anyhow::anyhow!(
                "Content directory does not exist: {}",
                content_dir.display()
            ));
        }

        let app = self.router();
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        info!("Serving sitemap for {}", content_dir.display());
        println!("Serving at http://{}{}", addr, SITEMAP_XML_PATH);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    docs: Arc<Config>,
}

async fn sitemap_xml(State(state): State<AppState>) -> Response {
    match generate(state).await {
        Ok(build) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            build.sitemap.to_xml(),
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}

async fn sitemap_json(State(state): State<AppState>) -> Response {
    let json = generate(state)
        .await
        .and_then(|build| Ok(build.sitemap.to_json()?));

    match json {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => internal_error(err),
    }
}

/// The scan does blocking filesystem work, so it runs off the async workers.
async fn generate(state: AppState) -> Result<SitemapBuild> {
    let build = tokio::task::spawn_blocking(move || {
        let docs = &state.docs;
        generate_sitemap(&docs.site.content_dir, &docs.site.base_url, &docs.sitemap)
    })
    .await??;

    Ok(build)
}

fn internal_error(err: anyhow::Error) -> Response {
    error!("Failed to generate sitemap: {err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate sitemap").into_response()
}

//! `source-resolver` CLI - resolve an alternate stream for one episode

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use source_resolver_lib::modules::provider::domain::EpisodeContext;
use source_resolver_lib::shared::utils::logger::{init_logger, init_tracing};
use source_resolver_lib::{
    select_preferred, JsonFilePreferenceStore, ResolveRequest, ResolverConfig, SourceResolver,
};

#[derive(Parser)]
#[command(name = "source-resolver")]
#[command(about = "Find a playable alternate source for an anime episode")]
#[command(version)]
struct Cli {
    /// Page title of the episode
    title: String,

    /// Page path, e.g. /naruto/season-1/episode-5.html
    #[arg(short, long)]
    path: Option<String>,

    /// Episode number (overrides the one parsed from --path)
    #[arg(short, long)]
    episode: Option<u32>,

    /// Provider to try first
    #[arg(long)]
    primary: Option<String>,

    /// JSON configuration file (defaults plus RESOLVER_* variables otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file holding preferred source ids per title
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,

    /// Route `log` output through env_logger instead of tracing
    #[arg(long)]
    env_logger: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env_logger {
        init_logger();
    } else {
        init_tracing(cli.verbose);
    }

    let config = match &cli.config {
        Some(path) => ResolverConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ResolverConfig::from_env().context("loading config from environment")?,
    };
    let config = match cli.primary.as_deref() {
        Some(primary) => config.with_primary(Some(primary)),
        None => config,
    };

    let resolver = SourceResolver::new(config).context("building resolver")?;

    let mut request = ResolveRequest::raw(&cli.title);
    if let Some(path) = &cli.path {
        request = request.with_page_path(path);
    }
    if let Some(episode) = cli.episode {
        let season = request.episode.season;
        request = request.with_episode(EpisodeContext::new(season, Some(episode)));
    }

    let outcome = resolver.resolve(request).await;

    let preferred = match (&cli.preferences, outcome.results()) {
        (Some(path), Some(results)) => {
            let store = JsonFilePreferenceStore::open(path)
                .await
                .with_context(|| format!("opening preferences {}", path.display()))?;
            select_preferred(results, &store, &cli.title)
                .await
                .map(|r| r.id.clone())
        }
        _ => None,
    };

    let output = json!({
        "outcome": outcome,
        "preferred": preferred,
        "health": resolver.health_monitor().snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if !outcome.is_found() {
        std::process::exit(1);
    }
    Ok(())
}

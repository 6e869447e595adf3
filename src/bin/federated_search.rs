//! Command-line front end: run one multi-collection search and print JSON.
//!
//! Tracing goes to stderr so that stdout carries only the JSON response.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use federated_search::{
    BackendConfig, CollectionSearchConfig, FederatedSearch, MergeStrategy,
    MultiCollectionSearchRequest, ResultMode, TypesenseBackend,
};
use tracing_subscriber::EnvFilter;

/// Search several collections at once and print the merged response.
#[derive(Parser)]
#[command(name = "federated-search", version, about)]
struct Cli {
    /// Path to TOML backend configuration.
    #[arg(short, long, env = "FEDERATED_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the backend API key.
    #[arg(long, env = "FEDERATED_SEARCH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to a JSON-encoded request. Takes precedence over --query/--collection.
    #[arg(short, long, conflicts_with_all = ["query", "collection"])]
    request: Option<PathBuf>,

    /// Query text.
    #[arg(short, long)]
    query: Option<String>,

    /// Collection to search; repeat for several. Use `name:weight` to set a weight.
    #[arg(long = "collection", value_name = "NAME[:WEIGHT]")]
    collection: Vec<String>,

    /// Merge strategy: relevance, roundRobin or collectionOrder.
    #[arg(long)]
    strategy: Option<MergeStrategy>,

    /// Result mode: interleaved, perCollection or both.
    #[arg(long)]
    mode: Option<ResultMode>,

    /// Cap on the merged hit list.
    #[arg(long)]
    limit: Option<usize>,

    /// Merge on normalised scores.
    #[arg(long)]
    normalize: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("federated_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => BackendConfig::from_file(path)?,
        None => BackendConfig::default(),
    };
    if let Some(key) = cli.api_key.clone() {
        config.api_key = key;
    }

    let request = build_request(&cli)?;
    let search = FederatedSearch::new(TypesenseBackend::new(&config)?);
    let response = search.search_multiple_collections(&request).await?;

    if let Some(errors) = &response.errors_by_collection {
        for (collection, error) in errors {
            tracing::warn!(%collection, %error, "collection failed");
        }
    }

    let json = serde_json::to_string_pretty(&response).context("failed to encode response")?;
    println!("{json}");
    Ok(())
}

fn build_request(cli: &Cli) -> anyhow::Result<MultiCollectionSearchRequest> {
    let mut request = match cli.request {
        Some(ref path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid request {}", path.display()))?
        }
        None => {
            let query = cli
                .query
                .clone()
                .context("either --request or --query is required")?;
            let collections = cli
                .collection
                .iter()
                .map(|spec| parse_collection(spec))
                .collect::<anyhow::Result<Vec<_>>>()?;
            MultiCollectionSearchRequest::new(query, collections)
        }
    };

    if let Some(strategy) = cli.strategy {
        request.merge_strategy = strategy;
    }
    if let Some(mode) = cli.mode {
        request.result_mode = mode;
    }
    if cli.limit.is_some() {
        request.global_max_results = cli.limit;
    }
    if cli.normalize {
        request.normalize_scores = true;
    }
    Ok(request)
}

/// Parse `name` or `name:weight`.
fn parse_collection(spec: &str) -> anyhow::Result<CollectionSearchConfig> {
    match spec.rsplit_once(':') {
        Some((name, weight)) => {
            let weight: f64 = weight
                .parse()
                .with_context(|| format!("invalid weight in `{spec}`"))?;
            Ok(CollectionSearchConfig::new(name).with_weight(weight))
        }
        None => Ok(CollectionSearchConfig::new(spec)),
    }
}

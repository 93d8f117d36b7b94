//! recordgate - fetch records through the resilient access layer
//!
//! A thin CLI over [`ApiClient`]: load configuration, perform one request,
//! print the payload.

use clap::Parser;
use recordgate::{ApiClient, ApiClientError, ClientConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recordgate",
    version,
    about = "Fetch records from a rate-limited JSON API with caching and retries"
)]
struct Cli {
    /// Endpoint path relative to the configured base URL
    endpoint: String,

    /// Query parameters as NAME=VALUE pairs
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// YAML settings file; environment variables are used when absent
    #[arg(long, env = "RECORDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Print a statistics snapshot to stderr after the request
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> recordgate::Result<()> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path).await?,
        None => ClientConfig::from_env()?,
    };
    let client = ApiClient::new(config)?;

    let params = parse_params(&cli.params)?;
    let borrowed: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    let response = client.get(&cli.endpoint, &borrowed).await?;
    println!("{}", response.text());

    if cli.stats {
        eprintln!("{}", serde_json::to_string_pretty(&client.stats())?);
    }
    Ok(())
}

fn parse_params(raw: &[String]) -> recordgate::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| {
                    ApiClientError::Config(format!(
                        "invalid parameter '{}', expected NAME=VALUE",
                        pair
                    ))
                })
        })
        .collect()
}

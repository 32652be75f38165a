//! # chunk-query
//!
//! Runs an MSQL query against an `ExecuteMSQL` endpoint in bounded chunks and
//! writes every returned row as one JSON line.
//!
//! Settings are layered: built-in defaults, the JSON config file, `CHUNKQUERY_*`
//! environment variables (a `.env` file is honored), then command-line flags.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lib_chunkquery::configs::{EndpointConfig, RetrievalConfig};
use lib_chunkquery::loggers::{LoggingOptions, init_logging};
use lib_chunkquery::retrieve::{DEFAULT_EXECUTE_PATH, MsqlHttpTransport};
use lib_chunkquery::{ChunkedRetrieval, Identity, Query};
use tracing::{error, info};

/// Command-line arguments for `chunk-query`.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Runs an MSQL query in bounded chunks and prints the rows as JSON lines"
)]
struct Args {
    /// JSON config file (camelCase keys, see RetrievalConfig).
    #[arg(short, long, env = "CHUNKQUERY_CONFIG")]
    config: Option<PathBuf>,

    /// MSQL query text.
    #[arg(short, long, conflicts_with = "query_file")]
    query: Option<String>,

    /// File holding the MSQL query text.
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Absolute base URL of the endpoint.
    #[arg(long)]
    base_url: Option<String>,

    /// Path of the execute call, relative to the base URL.
    #[arg(long)]
    path: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "CHUNKQUERY_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Rows requested per page.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Maximum number of pages to fetch.
    #[arg(long)]
    max_pages: Option<usize>,

    /// First record to request.
    #[arg(long)]
    start: Option<usize>,

    /// Log every page request and attempt.
    #[arg(short, long)]
    verbose: bool,

    /// Directory for JSON log files.
    #[arg(long, env = "CHUNKQUERY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long, env = "CHUNKQUERY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Write rows to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    /// The command-line layer, overriding every other configuration source.
    fn overrides(&self) -> RetrievalConfig {
        RetrievalConfig {
            limit_per_page: self.limit,
            max_pages: self.max_pages,
            start_offset: self.start,
            verbose: self.verbose.then_some(true),
            endpoint: EndpointConfig {
                base_url: self.base_url.clone(),
                path: self.path.clone(),
                auth_token: self.auth_token.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn query_text(&self) -> Result<String> {
        match (&self.query, &self.query_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(file)) => fs::read_to_string(file)
                .map(|text| text.trim().to_string())
                .with_context(|| format!("failed to read query file {}", file.display())),
            (None, None) => bail!("either --query or --query-file is required"),
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = RetrievalConfig::load(args.config.as_deref())?.merge(args.overrides());

    let base_url = config
        .endpoint
        .base_url
        .clone()
        .context("no endpoint base URL: set --base-url, CHUNKQUERY_BASE_URL or endpoint.baseUrl")?;
    let transport = MsqlHttpTransport::with_options(
        &base_url,
        config.endpoint.path.as_deref().unwrap_or(DEFAULT_EXECUTE_PATH),
        config.endpoint.auth_token.clone(),
        config.endpoint.timeout(),
    )?;

    let query = Query::with_paging(
        args.query_text()?,
        config.paging()?,
        config.verbose.unwrap_or(false),
    );
    let retrieval = ChunkedRetrieval::new(transport, config.retry_policy());

    let report = retrieval
        .get_all_with_report(&query, &Identity)
        .await
        .context("chunked query failed")?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for row in &report.items {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(
        rows = report.items.len(),
        pages_fetched = report.pages_fetched,
        next_offset = report.next_offset,
        exhausted = report.exhausted,
        "query complete"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let logging = LoggingOptions {
        level: args.log_level.clone(),
        log_dir: args.log_dir.clone(),
        ..Default::default()
    };
    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

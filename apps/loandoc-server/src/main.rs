//! Loan Document Copilot Server
//!
//! Compares two versions of a loan facility agreement and reports:
//!
//! - Key terms extracted from each version
//! - Material changes between them, with an impact label per field
//! - ESG (green / sustainability-linked lending) keyword checks on the
//!   revised version
//!
//! ## Architecture
//!
//! The analysis itself lives in `loandoc-engine` and is pure. This server
//! only handles transport: multipart uploads, document decoding via
//! `shared-pdf`, CORS, rate limiting and request logging.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tokio::sync::Semaphore;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_analyze_text, handle_analyze_upload, handle_health, handle_list_esg_rules};

/// Command-line arguments for the loan document server
#[derive(Parser, Debug)]
#[command(name = "loandoc-server")]
#[command(about = "Key-term diffing and ESG checks for loan facility agreements")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Per-document decoding timeout in milliseconds
    #[arg(long, default_value = "10000")]
    decode_timeout_ms: u64,

    /// Maximum number of documents decoded at once
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..))]
    max_concurrent_decodes: u32,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    rate_limit: u32,

    /// Maximum request body size in bytes (both uploads together)
    #[arg(long, default_value = "20971520")]
    max_upload_bytes: usize,

    /// Comma-separated CORS origins; "*" allows any origin
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://localhost:3000,https://loandoccopilot-frontend.vercel.app"
    )]
    allowed_origins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Per-document decoding timeout in milliseconds
    pub decode_timeout_ms: u64,
    /// Bounds concurrent decodes, including ones that outlived their timeout
    pub decode_permits: Arc<Semaphore>,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
}

/// Build the API router without the network-facing middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/esg-rules", get(handle_list_esg_rules))
        .route("/api/analyze", post(handle_analyze_upload))
        .route("/api/analyze/text", post(handle_analyze_text))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

/// Milliseconds between replenished rate-limit tokens for `rate` requests per second
fn replenish_interval_ms(rate: u32) -> u64 {
    (1000 / u64::from(rate.max(1))).max(1)
}

/// Build the CORS layer from the configured origin list.
///
/// `*` allows any origin without credentials. An explicit list allows
/// credentials and mirrors the requested method and headers; wildcards are
/// not valid alongside credentials.
fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.iter().any(|o| o.trim() == "*") {
        return Ok(CorsLayer::permissive());
    }

    let values = origins
        .iter()
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting loandoc server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(args.rate_limit))
            .burst_size(args.rate_limit.saturating_mul(2))
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    let cors = cors_layer(&args.allowed_origins)?;

    // Create shared state
    let state = AppState {
        decode_timeout_ms: args.decode_timeout_ms,
        decode_permits: Arc::new(Semaphore::new(args.max_concurrent_decodes as usize)),
        max_upload_bytes: args.max_upload_bytes,
    };

    let router = app(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(GovernorLayer {
                config: governor_conf,
            })
            .layer(cors),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Rate limit: one request every {}ms per IP, burst {}",
        replenish_interval_ms(args.rate_limit),
        args.rate_limit.saturating_mul(2)
    );
    info!(
        "Decode timeout: {}ms, max {} concurrent decodes",
        args.decode_timeout_ms, args.max_concurrent_decodes
    );
    info!("CORS origins: {}", args.allowed_origins.join(", "));

    // Governor keys on the peer address
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

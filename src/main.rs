use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::{builder::RangedU64ValueParser, Parser, Subcommand};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_imagery::{
    http::{router, AppState},
    Article, ImageResolver, ResolverConfig,
};

#[derive(Parser)]
#[command(name = "news-imagery")]
#[command(about = "Resolve displayable image URLs for news articles")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Base URL of the backend serving /proxy/image
    #[arg(long, global = true)]
    backend_base: Option<String>,

    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    probe_timeout_secs: Option<u64>,

    /// Maximum resolutions in flight for batches
    #[arg(long, global = true, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    concurrency: Option<usize>,

    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the articles in a JSON file (one article or an array)
    Resolve { file: PathBuf },

    /// Serve the resolver over HTTP
    Serve {
        #[arg(short, long, default_value = "3006")]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("news_imagery={filter_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = ResolverConfig::from_env().context("invalid image resolver configuration")?;
    if let Some(base) = args.backend_base {
        config.backend_base = base;
    }
    if let Some(secs) = args.probe_timeout_secs {
        config.probe_timeout = Duration::from_secs(secs);
    }
    if let Some(concurrency) = args.concurrency {
        config.batch_concurrency = concurrency;
    }

    let resolver = ImageResolver::from_config(&config).context("failed to build HTTP client")?;

    match args.command {
        Command::Resolve { file } => resolve_file(&resolver, &file, config.batch_concurrency).await,
        Command::Serve { port, host } => {
            serve(resolver, config.batch_concurrency, &host, port).await
        }
    }
}

async fn resolve_file(
    resolver: &ImageResolver,
    file: &Path,
    concurrency: usize,
) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let articles: Vec<Article> = match serde_json::from_str::<Value>(&contents)? {
        Value::Array(items) => items.into_iter().map(Article::from_json).collect(),
        single => vec![Article::from_json(single)],
    };

    info!("Resolving images for {} articles", articles.len());
    let resolutions = resolver.resolve_many(&articles, concurrency).await;

    let output: Vec<Value> = articles
        .iter()
        .zip(resolutions)
        .map(|(article, resolution)| {
            json!({
                "title": article.title,
                "url": resolution.url,
                "source": resolution.source,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn serve(
    resolver: ImageResolver,
    batch_concurrency: usize,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let app = router(AppState::new(resolver, batch_concurrency));

    let bind_addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("Image resolver started on {}", bind_addr);
    info!("   curl -X POST -H 'content-type: application/json' -d @article.json http://{}/resolve", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}

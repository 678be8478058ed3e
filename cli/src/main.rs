//! Terminal host for the submission-stats screen.
mod app;
mod render;
mod transport;

use anyhow::Result;
use app::CliApp;
use stats_core::ClientConfig;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` as given, or `info` when it is unset or invalid.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(LevelFilter::INFO.to_string()))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    info!(endpoint = %config.endpoint, username = %config.username, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(CliApp::new(config).run());
    // A fetch abandoned by quitting may still be blocked in ureq.
    runtime.shutdown_background();
    result
}

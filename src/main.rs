use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use banks_etl::api::HttpPageFetcher;
use banks_etl::models::EtlConfig;
use banks_etl::pipeline::EtlPipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the report, so diagnostics go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banks_etl=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EtlConfig::default();
    let pipeline = EtlPipeline::new(config.clone());

    let mut stdout = std::io::stdout().lock();

    let fetcher = match HttpPageFetcher::new(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            // same boundary as a failed run: log entry, console message, exit 0
            pipeline.report_failure(&e, &mut stdout);
            return Ok(());
        }
    };

    match pipeline.run_reported(&fetcher, &mut stdout).await {
        Ok(summary) => info!("Loaded {} banks", summary.banks.len()),
        Err(e) => info!("Run aborted: {}", e.kind()),
    }

    Ok(())
}

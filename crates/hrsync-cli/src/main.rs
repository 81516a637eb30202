//! `hrsync` binary: authenticate, run one reconciliation, log a summary.

use anyhow::Context;
use hrsync_core::{ReconciliationEngine, RunReport};
use hrsync_odoo::OdooClient;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{LogFormat, Settings};

#[tokio::main]
async fn main() {
    let matches = cli::command().get_matches();
    let settings = Settings::from_matches(&matches);
    init_logging(&settings);

    if let Err(e) = run(settings).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    match settings.log_format {
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let client = OdooClient::connect(settings.odoo)
        .await
        .context("could not authenticate with Odoo")?;
    tracing::info!(uid = client.uid(), "authenticated with Odoo");

    let engine = ReconciliationEngine::new(client, settings.sync)?;
    let report = engine.run().await.context("reconciliation run failed")?;
    log_summary(&report);
    Ok(())
}

fn log_summary(report: &RunReport) {
    let delta = &report.delta;
    tracing::info!(
        added = delta.added.len(),
        removed = delta.removed.len(),
        updated = delta.updated.len(),
        unchanged = delta.unchanged.len(),
        skipped = report.skipped,
        "run complete"
    );

    if let Some(images) = &report.images {
        tracing::info!(
            written = images.written.len(),
            unchanged = images.unchanged,
            removed = images.removed.len(),
            failed = images.failures.len(),
            "images synced"
        );
    }
}

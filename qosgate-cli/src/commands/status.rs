//! Status command implementation

use anyhow::{Context, Result};
use qosgate_admission::StatusReporter;
use std::sync::Arc;

use crate::cli::StatusArgs;

pub async fn execute(args: StatusArgs) -> Result<()> {
    tracing::info!(config = %args.config.config.display(), "Reporting runtime status");

    let admission = super::load_admission(&args.config.config).await?;
    let reporter = StatusReporter::new(Arc::clone(admission.catalog()));

    let network = args.network_error.map_or(Ok(()), Err);
    let status = reporter.status(network);

    let json = serde_json::to_string_pretty(&status).context("Failed to encode status")?;
    println!("{json}");

    Ok(())
}

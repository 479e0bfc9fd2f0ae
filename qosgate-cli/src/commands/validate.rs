//! Validate command implementation

use anyhow::{Context, Result};
use qosgate_admission::validate_resources;
use qosgate_core::ResourceScope;

use crate::cli::RequestArgs;

pub async fn execute(args: RequestArgs) -> Result<()> {
    let admission = super::load_admission(&args.config.config).await?;
    let request = super::load_request(&args.request).await?;

    admission
        .handle_sandbox(&request.sandbox)
        .context("Pod sandbox QoS resources rejected")?;

    validate_resources(
        admission.catalog(),
        ResourceScope::Container,
        &request.container.qos_resources,
    )
    .with_context(|| {
        format!(
            "QoS resources of container {:?} rejected",
            request.container.name
        )
    })?;

    println!(
        "QoS resources valid: {} pod, {} container",
        request.sandbox.qos_resources.len(),
        request.container.qos_resources.len()
    );

    Ok(())
}

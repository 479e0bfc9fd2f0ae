//! Admit command implementation

use anyhow::{Context, Result};
use oci_spec::runtime::Spec;
use tracing::{debug, info};

use crate::cli::AdmitArgs;

pub async fn execute(args: AdmitArgs) -> Result<()> {
    let admission = super::load_admission(&args.request.config.config).await?;
    let request = super::load_request(&args.request.request).await?;

    let mut spec = match &args.spec {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read spec {}", path.display()))?;
            serde_json::from_str::<Spec>(&json)
                .with_context(|| format!("Invalid OCI spec {}", path.display()))?
        }
        None => Spec::default(),
    };

    admission
        .handle_sandbox(&request.sandbox)
        .context("Pod sandbox QoS resources rejected")?;

    let assignments = admission
        .handle_container(&mut spec, &request.container, &request.sandbox)
        .with_context(|| {
            format!(
                "QoS resources of container {:?} rejected",
                request.container.name
            )
        })?;

    for assignment in assignments.in_order() {
        match assignment.class() {
            Some(class) => info!(
                container = request.container.name.as_str(),
                resource = %assignment.resource,
                class,
                source = %assignment.source,
                "QoS class assigned"
            ),
            None => debug!(
                container = request.container.name.as_str(),
                resource = %assignment.resource,
                "No QoS class requested"
            ),
        }
    }

    let json = serde_json::to_string_pretty(&spec).context("Failed to encode OCI spec")?;
    println!("{json}");

    Ok(())
}

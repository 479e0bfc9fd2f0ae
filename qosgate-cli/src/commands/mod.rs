use crate::cli::Commands;
use anyhow::{Context, Result};
use qosgate_admission::QosAdmission;
use qosgate_core::{ContainerConfig, QosConfig, SandboxConfig};
use serde::Deserialize;
use std::path::Path;

pub mod admit;
pub mod status;
pub mod validate;

/// Dispatch command to appropriate handler
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Status(args) => status::execute(args).await,
        Commands::Validate(args) => validate::execute(args).await,
        Commands::Admit(args) => admit::execute(args).await,
    }
}

/// Admission request file
#[derive(Debug, Deserialize)]
pub struct AdmissionRequest {
    /// Pod sandbox
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Container being created
    pub container: ContainerConfig,
}

/// Load the platform configuration
pub async fn load_config(path: &Path) -> Result<QosConfig> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    QosConfig::from_json_str(&json)
        .with_context(|| format!("Invalid config {}", path.display()))
}

/// Load the platform configuration and build the admission handler
pub async fn load_admission(path: &Path) -> Result<QosAdmission> {
    let config = load_config(path).await?;
    QosAdmission::from_config(&config).context("Failed to build QoS capability catalog")
}

/// Load an admission request
pub async fn load_request(path: &Path) -> Result<AdmissionRequest> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request {}", path.display()))?;

    serde_json::from_str(&json).with_context(|| format!("Invalid request {}", path.display()))
}

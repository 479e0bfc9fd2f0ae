//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qosgate")]
#[command(about = "QoS resource class admission for container runtimes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show runtime status and the QoS resource catalog
    Status(StatusArgs),

    /// Validate the QoS resource requests of an admission request
    Validate(RequestArgs),

    /// Resolve QoS classes and print the patched OCI runtime spec
    Admit(AdmitArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Platform QoS configuration (JSON)
    #[arg(short, long, env = "QOSGATE_CONFIG")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Report the network as not ready with this error
    #[arg(long, value_name = "ERROR")]
    pub network_error: Option<String>,
}

#[derive(Args)]
pub struct RequestArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Admission request with sandbox and container sections (JSON)
    #[arg(short, long)]
    pub request: PathBuf,
}

#[derive(Args)]
pub struct AdmitArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// OCI runtime spec to patch (defaults to the standard Linux runtime spec)
    #[arg(short, long)]
    pub spec: Option<PathBuf>,
}

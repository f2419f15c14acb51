// CLI command definitions

use super::stack::{
    ApplyCommand, DeleteCommand, KubeconfigCommand, OutputsCommand, RenderCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "dreamin-kube",
    version,
    about = "Declare and apply the Dreamin GKE application stack",
    long_about = "Renders the cluster, namespace, deployment, load-balanced service and ingress \
                  descriptors of the Dreamin stack, generates a gcloud-backed kubeconfig, and \
                  applies the workload objects with server-side apply"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print every stack descriptor as YAML or JSON
    Render(RenderCommand),

    /// Generate a kubeconfig for the provisioned GKE cluster
    Kubeconfig(KubeconfigCommand),

    /// Validate and apply namespace, deployment, service and ingress
    Apply(ApplyCommand),

    /// Show exported values, waiting for load balancer addresses
    Outputs(OutputsCommand),

    /// Delete the applied workload objects
    Delete(DeleteCommand),
}

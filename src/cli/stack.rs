//! Stack commands

use crate::cli::display::TableRenderer;
use crate::domain::config::{apply_to_stack_conf, parse_dynamic_configs, StackConf};
use crate::infrastructure::kubernetes::{kubeconfig_output, render_kubeconfig, ClusterEndpoint};
use crate::shared::Output;
use crate::{StackDeployer, StackDescriptor, StackValidator};
use clap::{Args, Parser, ValueEnum};
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Path to the stack configuration file (TOML)
    /// If not provided, reads DREAMIN_STACK_CONF or falls back to built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Dynamic configuration properties to override any settings (-D key=value)
    ///
    /// Stack: stack.name
    /// GCP: gcp.project, gcp.zone, gcp.region
    /// Cluster: cluster.node-count, cluster.machine-type, cluster.version, cluster.autoscaling
    /// App: app.image, app.replicas, app.container-port
    /// Service: service.port, service.neg
    /// Ingress: ingress.class, ingress.chart-version, ingress.chart-repo
    ///
    /// Example: -Dapp.replicas=2 -Dgcp.project=my-project
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Connect with a kubeconfig generated from `gcloud container clusters describe --format=json` output
    #[arg(long, value_name = "PATH", conflicts_with_all = ["kubeconfig", "context"])]
    pub cluster_json: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Yaml,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportsFormat {
    Table,
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Output format (yaml or json)
    #[arg(long, short = 'o', value_enum, default_value = "yaml")]
    pub output: RenderFormat,

    /// `helm template` output of the ingress controller chart; its objects are
    /// moved into the stack namespace and appended to the output
    #[arg(long, value_name = "PATH")]
    pub chart_manifest: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct KubeconfigCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// `gcloud container clusters describe --format=json` output
    #[arg(long, value_name = "PATH", conflicts_with_all = ["name", "endpoint", "ca_cert"])]
    pub cluster_json: Option<String>,

    /// Cluster name (defaults to the stack name)
    #[arg(long)]
    pub name: Option<String>,

    /// Control plane endpoint, without scheme
    #[arg(long, required_unless_present = "cluster_json")]
    pub endpoint: Option<String>,

    /// Base64 encoded cluster CA certificate
    #[arg(long, required_unless_present = "cluster_json")]
    pub ca_cert: Option<String>,

    /// Write the document to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ApplyCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct OutputsCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Seconds to wait for load balancer addresses (0 reads current status once)
    #[arg(long, default_value = "300")]
    pub timeout: u64,

    /// Output format (table or json)
    #[arg(long, short = 'o', value_enum, default_value = "table")]
    pub output: ExportsFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also delete the namespace
    #[arg(long)]
    pub delete_namespace: bool,
}

/// Resolve configuration (flags > -D > file > defaults) and build validated descriptors.
pub fn load_stack(args: &StackArgs) -> anyhow::Result<(StackConf, StackDescriptor)> {
    let mut conf = StackConf::load(args.config_file.as_deref())?;

    if !args.properties.is_empty() {
        let dynamic_configs = parse_dynamic_configs(&args.properties)
            .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
        apply_to_stack_conf(&dynamic_configs, &mut conf)?;
    }

    StackValidator::validate_conf(&conf)?;
    let stack = StackDescriptor::from_conf(&conf)?;
    StackValidator::validate(&stack)?;

    Ok((conf, stack))
}

async fn read_cluster_endpoint(path: String) -> anyhow::Result<ClusterEndpoint> {
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read cluster description {}: {}", path, e))?;
    Ok(ClusterEndpoint::from_describe_json(&json)?)
}

/// Connect to the cluster; returns the generated kubeconfig when one was rendered.
async fn connect(
    conn: &ConnectionArgs,
    conf: &StackConf,
    stack: &StackDescriptor,
) -> anyhow::Result<(StackDeployer, Option<String>)> {
    let namespace = stack.namespace_name().to_string();

    if let Some(ref path) = conn.cluster_json {
        let cluster = read_cluster_endpoint(path.clone()).await?;
        let kubeconfig = render_kubeconfig(&conf.gcp.project, &conf.gcp.zone, &cluster)?;
        let deployer = StackDeployer::from_kubeconfig_yaml(namespace, &kubeconfig)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to cluster: {}", e))?;
        return Ok((deployer, Some(kubeconfig)));
    }

    let deployer =
        StackDeployer::new_with_config(namespace, conn.kubeconfig.clone(), conn.context.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to cluster: {}", e))?;
    Ok((deployer, None))
}

/// Render the stack, plus the namespaced chart objects when a rendered chart is given.
pub fn render_stack(
    stack: &StackDescriptor,
    format: RenderFormat,
    chart_manifest: Option<&str>,
) -> anyhow::Result<String> {
    let chart = &stack.ingress_chart;

    match format {
        RenderFormat::Json => {
            let mut json = stack.to_json()?;
            if let Some(rendered) = chart_manifest {
                let objects = serde_json::to_value(chart.transform_manifests(rendered)?)?;
                if let Some(map) = json.as_object_mut() {
                    map.insert(CHART_MANIFESTS_KEY.to_string(), objects);
                }
            }
            Ok(serde_json::to_string_pretty(&json)?)
        }
        RenderFormat::Yaml => {
            let mut yaml = stack.to_yaml()?;
            if let Some(rendered) = chart_manifest {
                yaml.push_str(&format!("---\n# {}\n", CHART_MANIFESTS_KEY));
                yaml.push_str(&chart.transform_manifests_yaml(rendered)?);
            }
            Ok(yaml)
        }
    }
}

const CHART_MANIFESTS_KEY: &str = "ingress-controller-manifests";

impl RenderCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (_, stack) = load_stack(&self.stack)?;

        let chart_manifest = match self.chart_manifest {
            Some(ref path) => Some(tokio::fs::read_to_string(path).await.map_err(|e| {
                anyhow::anyhow!("Failed to read chart manifest {}: {}", path, e)
            })?),
            None => None,
        };

        let rendered = render_stack(&stack, self.output, chart_manifest.as_deref())?;
        match self.output {
            RenderFormat::Json => println!("{}", rendered),
            RenderFormat::Yaml => {
                println!(
                    "# Rendered by dreamin-kube at {}",
                    chrono::Utc::now().to_rfc3339()
                );
                print!("{}", rendered);
            }
        }

        Ok(())
    }
}

impl KubeconfigCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (conf, stack) = load_stack(&self.stack)?;
        let project = conf.gcp.project.clone();
        let zone = conf.gcp.zone.clone();

        let kubeconfig = if let Some(ref path) = self.cluster_json {
            let path = path.clone();
            Output::new(async move {
                read_cluster_endpoint(path)
                    .await
                    .map_err(|e| crate::StackError::Unresolved(e.to_string()))
            })
            .apply(move |cluster| render_kubeconfig(&project, &zone, &cluster))
        } else {
            let name = self
                .name
                .clone()
                .unwrap_or_else(|| stack.cluster_name().to_string());
            kubeconfig_output(
                project,
                zone,
                Output::ready(name),
                Output::ready(self.endpoint.clone().unwrap_or_default()),
                Output::ready(self.ca_cert.clone().unwrap_or_default()),
            )
        };

        let document = kubeconfig.resolve().await?;

        if let Some(ref out) = self.out {
            tokio::fs::write(out, &document).await?;
            println!("✓ Kubeconfig written to {}", out);
        } else {
            print!("{}", document);
        }

        Ok(())
    }
}

impl ApplyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (conf, stack) = load_stack(&self.stack)?;
        let (deployer, _) = connect(&self.connection, &conf, &stack).await?;

        deployer
            .deploy(&stack)
            .await
            .map_err(|e| anyhow::anyhow!("Apply failed: {}", e))?;

        println!("Stack {} applied successfully!", stack.cluster_name());
        Ok(())
    }
}

impl OutputsCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (conf, stack) = load_stack(&self.stack)?;
        let (deployer, kubeconfig) = connect(&self.connection, &conf, &stack).await?;

        let exports = deployer
            .resolve_exports(&stack, kubeconfig, Duration::from_secs(self.timeout))
            .await?;

        match self.output {
            ExportsFormat::Json => println!("{}", serde_json::to_string_pretty(&exports)?),
            ExportsFormat::Table => {
                println!("{}", TableRenderer::new().render_exports(&exports));
                if !exports.is_fully_resolved() {
                    println!("⏳ Some exports are still pending; re-run with a longer --timeout");
                }
            }
        }

        Ok(())
    }
}

impl DeleteCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (conf, stack) = load_stack(&self.stack)?;
        let (deployer, _) = connect(&self.connection, &conf, &stack).await?;

        deployer.delete(&stack, self.delete_namespace).await?;
        Ok(())
    }
}

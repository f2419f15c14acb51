//! Build automation for dreamin-kube
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - test: Run tests
//! - smoke: Render the default stack and a sample kubeconfig with the release binary
//! - ci: Run CI checks
//! - format / clippy

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for dreamin-kube")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tests
    Test {
        /// Also run tests that need a live cluster
        #[arg(long)]
        cluster: bool,
    },
    /// Render the stack and a sample kubeconfig, checking both are well formed
    Smoke,
    /// Run CI checks (format, clippy, test, smoke)
    Ci,
    /// Format code
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Test { cluster } => test(&sh, cluster),
        Commands::Smoke => smoke(&sh),
        Commands::Ci => ci(&sh),
        Commands::Format { check } => format(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn test(sh: &Shell, cluster: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if cluster {
        cmd!(sh, "cargo test --all -- --include-ignored").run()?;
    } else {
        cmd!(sh, "cargo test --all").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn smoke(sh: &Shell) -> Result<()> {
    println!("💨 Rendering stack...");
    cmd!(sh, "cargo build --release").run()?;

    let binary = project_root()?.join("target/release/dreamin-kube");

    let rendered = cmd!(sh, "{binary} render").read()?;
    for kind in ["kind: Namespace", "kind: Deployment", "kind: Service", "kind: Ingress"] {
        if !rendered.contains(kind) {
            bail!("rendered stack is missing '{}'", kind);
        }
    }

    let kubeconfig = cmd!(
        sh,
        "{binary} kubeconfig --name demo --endpoint 1.2.3.4 --ca-cert QkFTRTY0 -Dgcp.project=proj -Dgcp.zone=asia-1"
    )
    .read()
    .context("Failed to render kubeconfig")?;
    if !kubeconfig.contains("current-context: proj_asia-1_demo") {
        bail!("unexpected kubeconfig:\n{}", kubeconfig);
    }

    println!("✅ Smoke checks passed");
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    clippy(sh)?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n💨 Running smoke checks...");
    smoke(sh)?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --all-targets --all-features -- -D warnings").run()?;
    println!("✅ Clippy checks passed");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}

//! rename-interfaces
//!
//! Generates an OpenShift MachineConfig that renames network interfaces
//! through systemd link files. Without `--apply` the YAML goes to stdout or
//! `--output`. With `--apply` the cluster topology picks the pool role, the
//! resource is shown for confirmation, and then created or replaced.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{is_affirmative, Cli};
use cluster_client::KubeClusterClient;
use crds::MachineConfigRole;
use machineconfig::topology::detect_role;
use machineconfig::{build_machine_config, render, GenerationPlan, Reconciler, ResolvedPlan, UdevadmProbe};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SEPARATOR_WIDTH: usize = 80;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let plan = GenerationPlan::from_options(&cli.rename_options())?;
    let probe = UdevadmProbe::new(cli.kubeconfig.clone(), cli.probe_timeout());
    let plan = plan.resolve(&probe).await?;

    if cli.apply {
        apply_to_cluster(&cli, &plan).await
    } else {
        generate(&cli, &plan, cli.role).await
    }
}

async fn generate(cli: &Cli, plan: &ResolvedPlan, role: MachineConfigRole) -> Result<()> {
    let machine_config = build_machine_config(plan, role)?;
    let yaml = render::to_yaml(&machine_config)?;

    match &cli.output {
        Some(path) => {
            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options
                .open(path)
                .await
                .with_context(|| format!("failed to open output file {}", path.display()))?;
            file.write_all(yaml.as_bytes())
                .await
                .with_context(|| format!("failed to write output file {}", path.display()))?;
            file.flush().await?;
            info!("MachineConfig written to: {}", path.display());
        }
        None => print!("{}", yaml),
    }

    Ok(())
}

async fn apply_to_cluster(cli: &Cli, plan: &ResolvedPlan) -> Result<()> {
    match &cli.kubeconfig {
        Some(path) => info!("Using kubeconfig: {}", path.display()),
        None => info!("Using kubeconfig from KUBECONFIG or ~/.kube/config"),
    }

    let client = KubeClusterClient::new(cli.kubeconfig.as_deref())
        .await
        .context("failed to connect to the cluster")?;

    let topology = detect_role(&client)
        .await
        .context("failed to detect cluster topology")?;

    println!("Cluster information:");
    print!("{}", topology.summary());
    if topology.is_compact() {
        println!("\nSingle-node or master schedulable cluster detected - will use 'master' role label");
    } else {
        println!("\nMulti-node cluster detected - will use 'worker' role label");
    }

    let machine_config = build_machine_config(plan, topology.role)?;
    let yaml = render::to_yaml(&machine_config)?;

    let separator = "=".repeat(SEPARATOR_WIDTH);
    println!("\n{separator}\nMachineConfig to be applied:\n{separator}\n{yaml}{separator}");

    if !cli.yes && !confirm().await? {
        println!("Aborted.");
        return Ok(());
    }

    let outcome = Reconciler::new(client)
        .apply(&machine_config)
        .await
        .context("failed to apply MachineConfig")?;

    let verb = if outcome.was_created() { "created" } else { "updated" };
    println!("\nMachineConfig '{}' {} successfully!", plan.name, verb);
    println!("\nNote: The Machine Config Operator will roll out this change to the nodes.");
    println!("This may take several minutes and will cause node reboots.");

    Ok(())
}

async fn confirm() -> Result<bool> {
    print!("\nDo you want to apply this MachineConfig to the cluster? (yes/no): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    let read = BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(read > 0 && is_affirmative(&answer))
}

//! Command-line options

use clap::Parser;
use crds::MachineConfigRole;
use machineconfig::plan::{parse_list, DEFAULT_MACHINE_CONFIG_NAME};
use machineconfig::RenameOptions;
use std::path::PathBuf;
use std::time::Duration;

/// Generate a MachineConfig that renames network interfaces with systemd link files.
///
/// Interfaces are matched by MAC address or by PCI vendor/model ID (given
/// directly or read from a reference interface), and named explicitly, by
/// index prefix, or through a systemd NamePolicy.
#[derive(Debug, Parser)]
#[command(name = "rename-interfaces", version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated MAC addresses to match
    #[arg(short = 'm', long)]
    pub macs: Option<String>,

    /// systemd NamePolicy value (e.g. "slot", "path", "onboard slot")
    #[arg(short = 'p', long)]
    pub name_policy: Option<String>,

    /// Comma-separated interface names, one per MAC address
    #[arg(short = 'n', long)]
    pub names: Option<String>,

    /// Name interfaces <prefix>0, <prefix>1, ... in MAC order
    #[arg(long)]
    pub name_prefix: Option<String>,

    /// Kubeconfig file (default: KUBECONFIG, then ~/.kube/config)
    #[arg(short = 'k', long)]
    pub kubeconfig: Option<PathBuf>,

    /// Write the MachineConfig to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Detect the cluster topology and apply the MachineConfig
    #[arg(short = 'a', long)]
    pub apply: bool,

    /// MachineConfig name
    #[arg(long, default_value = DEFAULT_MACHINE_CONFIG_NAME)]
    pub mc_name: String,

    /// PCI vendor ID to match (e.g. 0x8086)
    #[arg(long)]
    pub vendor: Option<String>,

    /// PCI model ID to match (e.g. 0x1593)
    #[arg(long)]
    pub model: Option<String>,

    /// Read vendor/model IDs from this interface
    #[arg(long = "ref-if-name", alias = "refIfName")]
    pub ref_if_name: Option<String>,

    /// Probe the reference interface on this node via `oc debug`
    #[arg(long)]
    pub node: Option<String>,

    /// Pool role label when generating without --apply
    #[arg(long, default_value_t = MachineConfigRole::Worker, conflicts_with = "apply")]
    pub role: MachineConfigRole,

    /// Apply without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Seconds to wait for the hardware probe
    #[arg(long, default_value_t = 120)]
    pub probe_timeout: u64,
}

impl Cli {
    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            machine_config_name: self.mc_name.clone(),
            macs: self.macs.as_deref().map(parse_list).unwrap_or_default(),
            names: self.names.as_deref().map(parse_list).unwrap_or_default(),
            name_policy: self.name_policy.clone(),
            name_prefix: self.name_prefix.clone(),
            vendor_id: self.vendor.clone(),
            model_id: self.model.clone(),
            reference_interface: self.ref_if_name.clone(),
            node: self.node.clone(),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }
}

/// Whether a confirmation answer means yes
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

//! Hardware ID probing
//!
//! Reads the udev `ID_VENDOR_ID` and `ID_MODEL_ID` properties of a reference
//! interface, either on this machine or on a cluster node via `oc debug`.

use crate::error::MachineConfigError;
use crate::template::HardwareId;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

const VENDOR_KEY: &str = "ID_VENDOR_ID=";
const MODEL_KEY: &str = "ID_MODEL_ID=";

/// Default bound on a single probe, including `oc debug` pod startup
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(120);

/// Interface to probe, optionally on a remote node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub interface: String,
    pub node: Option<String>,
}

impl ProbeTarget {
    fn error(&self, reason: impl Into<String>) -> MachineConfigError {
        MachineConfigError::Probe {
            interface: self.interface.clone(),
            node: self.node.clone(),
            reason: reason.into(),
        }
    }

    fn sys_path(&self) -> String {
        format!("/sys/class/net/{}", self.interface)
    }
}

/// Source of vendor/model IDs for a reference interface
#[async_trait::async_trait]
pub trait HardwareProbe: Send + Sync {
    async fn probe(&self, target: &ProbeTarget) -> Result<HardwareId, MachineConfigError>;
}

/// Probe backed by `udevadm info`, run locally or through `oc debug node/<node>`
#[derive(Debug, Clone)]
pub struct UdevadmProbe {
    kubeconfig: Option<PathBuf>,
    timeout: Duration,
}

impl Default for UdevadmProbe {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl UdevadmProbe {
    pub fn new(kubeconfig: Option<PathBuf>, timeout: Duration) -> Self {
        Self { kubeconfig, timeout }
    }

    /// Program and arguments that read the target's udev properties
    pub fn command_line(&self, target: &ProbeTarget) -> (String, Vec<String>) {
        let mut udevadm_args: Vec<String> = ["info", "-q", "property", "-p"].map(String::from).to_vec();
        udevadm_args.push(target.sys_path());

        match &target.node {
            None => ("udevadm".to_string(), udevadm_args),
            Some(node) => {
                let mut args = vec!["debug".to_string(), format!("node/{}", node)];
                if let Some(kubeconfig) = &self.kubeconfig {
                    args.push(format!("--kubeconfig={}", kubeconfig.display()));
                }
                args.extend(["--", "chroot", "/host", "udevadm"].map(String::from));
                args.extend(udevadm_args);
                ("oc".to_string(), args)
            }
        }
    }

    async fn run(&self, target: &ProbeTarget) -> Result<Output, MachineConfigError> {
        let (program, args) = self.command_line(target);
        debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(&program).args(&args).kill_on_drop(true).output();
        match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(target.error(format!("failed to execute {}: {}", program, e))),
            Err(_) => Err(target.error(format!("{} timed out after {}s", program, self.timeout.as_secs()))),
        }
    }
}

#[async_trait::async_trait]
impl HardwareProbe for UdevadmProbe {
    async fn probe(&self, target: &ProbeTarget) -> Result<HardwareId, MachineConfigError> {
        match &target.node {
            Some(node) => info!("Detecting vendor/model from interface {} on node {}", target.interface, node),
            None => info!("Detecting vendor/model from local interface {}", target.interface),
        }

        let output = self.run(target).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(target.error(failure_reason(&output.status, &stdout, &stderr)));
        }

        let id = parse_udevadm_output(&stdout, target)?;
        info!(
            "Auto-detected from interface {}: Vendor ID={}, Model ID={}",
            target.interface,
            id.vendor_id(),
            id.model_id()
        );
        Ok(id)
    }
}

/// Describe a failed probe run, keeping stdout and stderr apart
fn failure_reason(status: &ExitStatus, stdout: &str, stderr: &str) -> String {
    let mut reason = format!("probe exited with {}", status);
    for (stream, text) in [("stdout", stdout.trim()), ("stderr", stderr.trim())] {
        if !text.is_empty() {
            reason.push_str(&format!("\n{}: {}", stream, text));
        }
    }
    reason
}

/// Extract vendor and model IDs from `udevadm info -q property` output.
///
/// # Errors
///
/// `Probe` when either property is missing.
pub fn parse_udevadm_output(output: &str, target: &ProbeTarget) -> Result<HardwareId, MachineConfigError> {
    let mut vendor_id = None;
    let mut model_id = None;

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(VENDOR_KEY) {
            vendor_id = Some(value);
        } else if let Some(value) = line.strip_prefix(MODEL_KEY) {
            model_id = Some(value);
        }
    }

    match (vendor_id, model_id) {
        (Some(vendor), Some(model)) if !vendor.is_empty() && !model.is_empty() => Ok(HardwareId::new(vendor, model)),
        _ => Err(target.error(format!(
            "could not find vendor ID and/or model ID for interface {}",
            target.interface
        ))),
    }
}

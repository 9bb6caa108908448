//! MachineConfig CRD
//!
//! Cluster-scoped OpenShift resource carrying an Ignition config. Only the
//! parts of the Ignition config used for writing files are modelled here;
//! anything else on a remote object is dropped when it is replaced.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ignition config format version written into every resource
pub const IGNITION_VERSION: &str = "3.2.0";

/// Directory the Machine Config Operator writes systemd link files into
pub const NETWORK_DIR: &str = "/etc/systemd/network/";

/// Permission bits for systemd link files (0644)
pub const LINK_FILE_MODE: i32 = 0o644;

#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "MachineConfig",
    plural = "machineconfigs",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigSpec {
    /// Ignition config rendered onto the node
    pub config: IgnitionConfig,
}

/// Subset of an Ignition config: version plus storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct IgnitionConfig {
    pub ignition: Ignition,

    #[serde(default)]
    pub storage: Storage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ignition {
    /// Ignition spec version (e.g., "3.2.0")
    pub version: String,
}

impl Default for Ignition {
    fn default() -> Self {
        Self {
            version: IGNITION_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    /// Files written to the node filesystem, in order
    #[serde(default)]
    pub files: Vec<MachineConfigFile>,
}

/// One file entry in the Ignition storage section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigFile {
    /// Absolute path on the node
    pub path: String,

    /// Numeric permission mode (decimal in the serialized form)
    pub mode: i32,

    /// Replace the file if it already exists
    #[serde(default)]
    pub overwrite: bool,

    pub contents: FileContents,

    /// Plain-text form of `contents.source`, kept only for annotating
    /// rendered documents. Never serialized and never read back.
    #[serde(skip)]
    #[schemars(skip)]
    pub decoded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileContents {
    /// Data URI holding the file body
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_resource_identity() {
        assert_eq!(MachineConfig::api_version(&()), "machineconfiguration.openshift.io/v1");
        assert_eq!(MachineConfig::kind(&()), "MachineConfig");
        assert_eq!(MachineConfig::plural(&()), "machineconfigs");
    }

    #[test]
    fn test_decoded_annotation_is_not_serialized() {
        let file = MachineConfigFile {
            path: "/etc/systemd/network/10-ptp0.link".to_string(),
            mode: LINK_FILE_MODE,
            overwrite: true,
            contents: FileContents {
                source: "data:text/plain,x".to_string(),
            },
            decoded: Some("x".to_string()),
        };

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "path": "/etc/systemd/network/10-ptp0.link",
                "mode": 420,
                "overwrite": true,
                "contents": { "source": "data:text/plain,x" }
            })
        );
    }

    #[test]
    fn test_default_spec_uses_current_ignition_version() {
        let spec = MachineConfigSpec::default();
        assert_eq!(spec.config.ignition.version, IGNITION_VERSION);
        assert!(spec.config.storage.files.is_empty());
    }
}

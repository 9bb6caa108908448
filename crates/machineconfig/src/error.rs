//! MachineConfig generation and apply errors.

use cluster_client::ClusterError;
use thiserror::Error;

/// Errors that can occur while generating or applying a MachineConfig.
#[derive(Debug, Error)]
pub enum MachineConfigError {
    /// Explicit names do not pair one-to-one with MAC addresses
    #[error("number of MAC addresses ({macs}) must match number of names ({names})")]
    CardinalityMismatch { macs: usize, names: usize },

    /// Neither MAC addresses nor vendor/model IDs were given
    #[error("at least one matching method must be specified: MAC addresses or vendor/model IDs")]
    MissingMatchCriterion,

    /// No naming strategy was given
    #[error("either a name policy, explicit names, or a name prefix must be specified")]
    MissingNamingStrategy,

    /// Two options that exclude each other were both given
    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    /// An option value is unusable on its own
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Hardware probe failed or its output lacked vendor/model IDs
    #[error("failed to probe interface {interface}{}: {reason}", on_node(.node))]
    Probe {
        interface: String,
        node: Option<String>,
        reason: String,
    },

    /// The cluster reported no nodes
    #[error("no nodes found in cluster")]
    NoMembersFound,

    /// Listing nodes for topology detection failed
    #[error("failed to list nodes: {0}")]
    ListNodes(#[source] ClusterError),

    /// Looking up the existing MachineConfig failed for a reason other than absence
    #[error("failed to look up MachineConfig {name}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: ClusterError,
    },

    /// The remote MachineConfig changed between lookup and update
    #[error("MachineConfig {name} was modified concurrently; re-run to retry: {source}")]
    Conflict {
        name: String,
        #[source]
        source: ClusterError,
    },

    /// Creating the MachineConfig failed
    #[error("failed to create MachineConfig {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: ClusterError,
    },

    /// Updating the existing MachineConfig failed
    #[error("failed to update MachineConfig {name}: {source}")]
    Update {
        name: String,
        #[source]
        source: ClusterError,
    },

    /// YAML serialization failed
    #[error("failed to serialize MachineConfig: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

fn on_node(node: &Option<String>) -> String {
    node.as_ref().map(|n| format!(" on node {}", n)).unwrap_or_default()
}

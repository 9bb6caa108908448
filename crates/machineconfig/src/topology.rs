//! Cluster topology detection
//!
//! Picks the machine config pool a MachineConfig should target. On
//! single-node and compact clusters (control-plane nodes that also run
//! workloads, no dedicated workers) the worker pool is empty, so the resource
//! must go to the master pool instead.

use crate::error::MachineConfigError;
use cluster_client::{ClusterClientTrait, ClusterNode};
use crds::MachineConfigRole;
use std::fmt;
use tracing::info;

/// Node counts by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeRoleCounts {
    pub total: usize,
    /// Nodes with a master or control-plane role label
    pub control_plane: usize,
    /// Worker-labelled nodes without a control-plane label
    pub dedicated_workers: usize,
    /// Nodes labelled both control-plane and worker
    pub schedulable_control_plane: usize,
}

impl NodeRoleCounts {
    pub fn from_nodes(nodes: &[ClusterNode]) -> Self {
        let mut counts = Self {
            total: nodes.len(),
            ..Self::default()
        };

        for node in nodes {
            let control_plane = node.is_control_plane();
            let worker = node.is_worker();

            if control_plane {
                counts.control_plane += 1;
            }
            if control_plane && worker {
                counts.schedulable_control_plane += 1;
            } else if worker {
                counts.dedicated_workers += 1;
            }
        }

        counts
    }

    /// Master iff there is exactly one node, or schedulable control-plane
    /// nodes exist and no dedicated workers do.
    pub fn role(&self) -> MachineConfigRole {
        let compact = self.schedulable_control_plane > 0 && self.dedicated_workers == 0;
        if self.total == 1 || compact {
            MachineConfigRole::Master
        } else {
            MachineConfigRole::Worker
        }
    }
}

impl fmt::Display for NodeRoleCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Nodes: {}", self.total)?;
        writeln!(f, "  Control Plane Nodes: {}", self.control_plane)?;
        writeln!(
            f,
            "  Worker Nodes (total): {}",
            self.dedicated_workers + self.schedulable_control_plane
        )?;
        if self.schedulable_control_plane > 0 {
            writeln!(f, "  Schedulable Masters (also workers): {}", self.schedulable_control_plane)?;
        }
        if self.dedicated_workers > 0 {
            writeln!(f, "  Dedicated Workers: {}", self.dedicated_workers)?;
        }
        Ok(())
    }
}

/// Result of topology detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyClassification {
    pub role: MachineConfigRole,
    pub counts: NodeRoleCounts,
}

impl TopologyClassification {
    /// Whether the cluster is single-node or compact
    pub fn is_compact(&self) -> bool {
        self.role == MachineConfigRole::Master
    }

    /// Operator-facing summary of the node counts. Informational only.
    pub fn summary(&self) -> String {
        self.counts.to_string()
    }
}

/// Classify a node set.
///
/// # Errors
///
/// `NoMembersFound` for an empty set; there is no default role.
pub fn classify_nodes(nodes: &[ClusterNode]) -> Result<TopologyClassification, MachineConfigError> {
    if nodes.is_empty() {
        return Err(MachineConfigError::NoMembersFound);
    }

    let counts = NodeRoleCounts::from_nodes(nodes);
    Ok(TopologyClassification {
        role: counts.role(),
        counts,
    })
}

/// List the cluster's nodes and classify them.
pub async fn detect_role<C>(client: &C) -> Result<TopologyClassification, MachineConfigError>
where
    C: ClusterClientTrait + ?Sized,
{
    let nodes = client.list_nodes().await.map_err(MachineConfigError::ListNodes)?;
    let classification = classify_nodes(&nodes)?;

    info!(
        "Detected {} nodes ({} control-plane, {} dedicated workers, {} schedulable control-plane); using '{}' role",
        classification.counts.total,
        classification.counts.control_plane,
        classification.counts.dedicated_workers,
        classification.counts.schedulable_control_plane,
        classification.role
    );

    Ok(classification)
}

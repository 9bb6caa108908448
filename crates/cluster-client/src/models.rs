//! Cluster data models

use crds::{NODE_ROLE_CONTROL_PLANE, NODE_ROLE_MASTER, NODE_ROLE_WORKER};
use k8s_openapi::api::core::v1::Node;
use std::collections::BTreeSet;

/// A cluster node reduced to what topology detection needs: its name and the
/// set of label keys present on it. Label values are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClusterNode {
    pub name: String,
    pub labels: BTreeSet<String>,
}

impl ClusterNode {
    /// Create a node record from a name and label keys
    pub fn new<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the node carries the given label key
    pub fn has_label(&self, key: &str) -> bool {
        self.labels.contains(key)
    }

    /// Carries either the legacy master or the control-plane role label
    pub fn is_control_plane(&self) -> bool {
        self.has_label(NODE_ROLE_MASTER) || self.has_label(NODE_ROLE_CONTROL_PLANE)
    }

    /// Carries the worker role label
    pub fn is_worker(&self) -> bool {
        self.has_label(NODE_ROLE_WORKER)
    }
}

impl From<&Node> for ClusterNode {
    fn from(node: &Node) -> Self {
        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            labels: node
                .metadata
                .labels
                .as_ref()
                .map(|labels| labels.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

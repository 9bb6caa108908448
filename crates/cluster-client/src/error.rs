//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the cluster API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes API or transport error not covered by a more specific variant
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be loaded or inferred
    #[error("Invalid cluster configuration: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (lost a create race)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Update rejected because the resourceVersion was stale
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication or authorization failed (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// API server unreachable or returned an unexpected failure
    #[error("Cluster API error: {0}")]
    Api(String),
}

impl ClusterError {
    /// True when the error means the requested object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }

    /// True when the error is an optimistic-concurrency rejection
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClusterError::Conflict(_))
    }
}

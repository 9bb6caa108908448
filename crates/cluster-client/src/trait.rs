//! ClusterClient trait for mocking
//!
//! This trait abstracts the cluster API so the topology classifier and the
//! reconciler can be unit tested against an in-memory implementation.

use crate::error::ClusterError;
use crate::models::ClusterNode;
use crds::MachineConfig;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Trait for cluster API operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    /// List every node in the cluster
    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, ClusterError>;

    /// Get the metadata of a MachineConfig by name; `ClusterError::NotFound`
    /// when absent. The body is never decoded.
    async fn get_machine_config_metadata(&self, name: &str) -> Result<ObjectMeta, ClusterError>;

    /// Create a MachineConfig
    async fn create_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError>;

    /// Replace a MachineConfig wholesale. The object must carry the
    /// `resourceVersion` it was read at; a stale one yields `ClusterError::Conflict`.
    async fn replace_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError>;
}

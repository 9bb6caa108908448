//! Create-or-update reconciliation of MachineConfigs.
//!
//! The existing object's metadata is looked up by name; its body is never
//! decoded, so an object of any shape is replaced. If found, the new resource is
//! sent as a full replacement carrying the remote `resourceVersion`, so the
//! API server rejects it if someone else wrote in between. If absent, it is
//! created; two concurrent creators race and the server's atomic create picks
//! the winner. Nothing here retries.

use crate::error::MachineConfigError;
use cluster_client::{ClusterClientTrait, ClusterError};
use crds::MachineConfig;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{error, info};

/// What the reconciler did
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// No MachineConfig of that name existed; the server's copy is returned
    Created(MachineConfig),
    /// An existing MachineConfig was replaced; the server's copy is returned
    Updated(MachineConfig),
}

impl ApplyOutcome {
    pub fn was_created(&self) -> bool {
        matches!(self, ApplyOutcome::Created(_))
    }
}

/// Applies MachineConfigs to a cluster.
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
}

impl<C: ClusterClientTrait> Reconciler<C> {
    /// Creates a new reconciler instance.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Create the MachineConfig, or replace the existing one of the same name.
    ///
    /// # Errors
    ///
    /// - `Lookup` when the lookup fails for any reason other than not-found;
    ///   no create is attempted in that case.
    /// - `Conflict` when the remote object changed after the lookup.
    /// - `Create` / `Update` for other write failures.
    pub async fn apply(&self, machine_config: &MachineConfig) -> Result<ApplyOutcome, MachineConfigError> {
        let name = machine_config
            .metadata
            .name
            .clone()
            .ok_or_else(|| MachineConfigError::InvalidOption("MachineConfig missing name".to_string()))?;

        match self.client.get_machine_config_metadata(&name).await {
            Ok(existing) => self.update(name, machine_config, existing).await,
            Err(ClusterError::NotFound(_)) => self.create(name, machine_config).await,
            Err(source) => {
                error!("Failed to look up MachineConfig {}: {}", name, source);
                Err(MachineConfigError::Lookup { name, source })
            }
        }
    }

    async fn update(
        &self,
        name: String,
        machine_config: &MachineConfig,
        existing: ObjectMeta,
    ) -> Result<ApplyOutcome, MachineConfigError> {
        let mut replacement = machine_config.clone();
        replacement.metadata.resource_version = existing.resource_version;

        info!(
            "MachineConfig {} exists (resourceVersion {:?}), replacing",
            name, replacement.metadata.resource_version
        );

        match self.client.replace_machine_config(&replacement).await {
            Ok(updated) => {
                info!("Updated existing MachineConfig: {}", name);
                Ok(ApplyOutcome::Updated(updated))
            }
            Err(source @ ClusterError::Conflict(_)) => {
                error!("MachineConfig {} changed since it was read", name);
                Err(MachineConfigError::Conflict { name, source })
            }
            Err(source) => Err(MachineConfigError::Update { name, source }),
        }
    }

    async fn create(&self, name: String, machine_config: &MachineConfig) -> Result<ApplyOutcome, MachineConfigError> {
        info!("MachineConfig {} not found, creating", name);

        match self.client.create_machine_config(machine_config).await {
            Ok(created) => {
                info!("Created new MachineConfig: {}", name);
                Ok(ApplyOutcome::Created(created))
            }
            Err(source) => Err(MachineConfigError::Create { name, source }),
        }
    }
}

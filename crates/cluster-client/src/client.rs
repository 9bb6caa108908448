//! Kubernetes-backed cluster client

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crate::models::ClusterNode;
use crds::MachineConfig;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;
use tracing::debug;

/// Cluster client talking to a live API server through kube-rs
#[derive(Clone)]
pub struct KubeClusterClient {
    nodes: Api<Node>,
    machine_configs: Api<MachineConfig>,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

/// Install ring as the process-wide rustls provider. A provider that is
/// already installed is kept.
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }
}

impl KubeClusterClient {
    /// Create a client from an explicit kubeconfig file, or infer the
    /// configuration (`KUBECONFIG`, `~/.kube/config`, in-cluster) when `None`.
    pub async fn new(kubeconfig: Option<&Path>) -> Result<Self, ClusterError> {
        match kubeconfig {
            Some(path) => {
                debug!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    ClusterError::Config(format!("failed to read kubeconfig {}: {}", path.display(), e))
                })?;
                Self::from_kubeconfig(kubeconfig).await
            }
            None => {
                let config = Config::infer()
                    .await
                    .map_err(|e| ClusterError::Config(format!("failed to infer config: {}", e)))?;
                Self::from_config(config)
            }
        }
    }

    /// Create a client from an already parsed kubeconfig
    pub async fn from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Self, ClusterError> {
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| ClusterError::Config(format!("failed to build config: {}", e)))?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ClusterError> {
        install_crypto_provider();
        let client = Client::try_from(config)?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing kube client
    pub fn from_client(client: Client) -> Self {
        Self {
            nodes: Api::all(client.clone()),
            machine_configs: Api::all(client),
        }
    }
}

/// HTTP status code carried by an API error response, if any
fn status_code(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    }
}

/// Map a kube error to the client taxonomy. `conflict_is_stale` decides whether
/// a 409 means a stale resourceVersion (replace) or a name collision (create).
fn classify_error(err: kube::Error, name: &str, conflict_is_stale: bool) -> ClusterError {
    match status_code(&err) {
        Some(404) => ClusterError::NotFound(format!("MachineConfig {}", name)),
        Some(409) if conflict_is_stale => ClusterError::Conflict(format!(
            "MachineConfig {} was modified concurrently: {}",
            name, err
        )),
        Some(409) => ClusterError::AlreadyExists(format!("MachineConfig {}: {}", name, err)),
        Some(401 | 403) => ClusterError::Authentication(err.to_string()),
        Some(code) if code >= 500 => ClusterError::Api(err.to_string()),
        _ => ClusterError::Kube(err),
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for KubeClusterClient {
    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, ClusterError> {
        debug!("Listing cluster nodes");
        let nodes = self
            .nodes
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_error(e, "nodes", false))?;
        Ok(nodes.items.iter().map(ClusterNode::from).collect())
    }

    async fn get_machine_config_metadata(&self, name: &str) -> Result<ObjectMeta, ClusterError> {
        // metadata only, so a remote body of any shape is accepted
        debug!("GET MachineConfig {} metadata", name);
        match self.machine_configs.get_metadata_opt(name).await {
            Ok(Some(partial)) => Ok(partial.metadata),
            Ok(None) => Err(ClusterError::NotFound(format!("MachineConfig {}", name))),
            Err(e) => Err(classify_error(e, name, false)),
        }
    }

    async fn create_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError> {
        let name = machine_config.metadata.name.as_deref().unwrap_or_default();
        debug!("POST MachineConfig {}", name);
        self.machine_configs
            .create(&PostParams::default(), machine_config)
            .await
            .map_err(|e| classify_error(e, name, false))
    }

    async fn replace_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError> {
        let name = machine_config.metadata.name.as_deref().unwrap_or_default();
        debug!(
            "PUT MachineConfig {} at resourceVersion {:?}",
            name, machine_config.metadata.resource_version
        );
        self.machine_configs
            .replace(name, &PostParams::default(), machine_config)
            .await
            .map_err(|e| classify_error(e, name, true))
    }
}

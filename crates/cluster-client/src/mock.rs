//! Mock ClusterClient for unit testing
//!
//! Stores nodes and MachineConfigs in memory, enforces resourceVersion checks
//! on replace the way the API server does, records every call, and can be
//! told to fail lookups or writes.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crate::models::ClusterNode;
use crds::MachineConfig;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Failure to inject into the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// 401/403 from the API server
    Unauthorized,
    /// Connection refused, timeout, 5xx
    Unavailable,
    /// Stale resourceVersion on replace
    Conflict,
}

impl MockFailure {
    fn to_error(self, name: &str) -> ClusterError {
        match self {
            MockFailure::Unauthorized => {
                ClusterError::Authentication(format!("forbidden: cannot access MachineConfig {}", name))
            }
            MockFailure::Unavailable => ClusterError::Api("connection refused".to_string()),
            MockFailure::Conflict => ClusterError::Conflict(format!("MachineConfig {} was modified concurrently", name)),
        }
    }
}

/// A call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListNodes,
    Get(String),
    Create(String),
    Replace(String),
}

/// A stored object. `body` is `None` for objects whose spec this crate does
/// not model (e.g. a MachineConfig that only sets kernel arguments).
#[derive(Debug, Clone)]
struct RemoteMachineConfig {
    metadata: ObjectMeta,
    body: Option<MachineConfig>,
}

/// Mock ClusterClient for testing
#[derive(Clone, Default)]
pub struct MockClusterClient {
    nodes: Arc<Mutex<Vec<ClusterNode>>>,
    machine_configs: Arc<Mutex<HashMap<String, RemoteMachineConfig>>>,
    next_resource_version: Arc<Mutex<u64>>,
    lookup_failure: Arc<Mutex<Option<MockFailure>>>,
    write_failure: Arc<Mutex<Option<MockFailure>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl std::fmt::Debug for MockClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClusterClient")
            .field("calls", &*lock(&self.calls))
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockClusterClient {
    /// Create an empty mock cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the mock cluster (for test setup)
    pub fn add_node(&self, node: ClusterNode) {
        lock(&self.nodes).push(node);
    }

    /// Store a MachineConfig as if it already existed remotely; a
    /// resourceVersion is assigned. Returns the stored copy.
    pub fn add_machine_config(&self, mut machine_config: MachineConfig) -> MachineConfig {
        machine_config.metadata.resource_version = Some(self.bump_resource_version());
        self.store(machine_config.clone());
        machine_config
    }

    /// Store an object of the same kind whose body is not a typed
    /// MachineConfig; only its metadata is visible. Returns the stored metadata.
    pub fn add_foreign_machine_config(&self, mut metadata: ObjectMeta) -> ObjectMeta {
        metadata.resource_version = Some(self.bump_resource_version());
        let name = metadata.name.clone().unwrap_or_default();
        lock(&self.machine_configs).insert(
            name,
            RemoteMachineConfig {
                metadata: metadata.clone(),
                body: None,
            },
        );
        metadata
    }

    /// Fetch a stored MachineConfig without recording a call. `None` when
    /// absent or when the stored object is foreign.
    pub fn stored_machine_config(&self, name: &str) -> Option<MachineConfig> {
        lock(&self.machine_configs).get(name).and_then(|remote| remote.body.clone())
    }

    /// Make every lookup fail with the given failure
    pub fn fail_lookups_with(&self, failure: MockFailure) {
        *lock(&self.lookup_failure) = Some(failure);
    }

    /// Make every create/replace fail with the given failure
    pub fn fail_writes_with(&self, failure: MockFailure) {
        *lock(&self.write_failure) = Some(failure);
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn store(&self, machine_config: MachineConfig) {
        let name = machine_config.metadata.name.clone().unwrap_or_default();
        lock(&self.machine_configs).insert(
            name,
            RemoteMachineConfig {
                metadata: machine_config.metadata.clone(),
                body: Some(machine_config),
            },
        );
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }

    fn bump_resource_version(&self) -> String {
        let mut version = lock(&self.next_resource_version);
        *version += 1;
        version.to_string()
    }

    fn check_write(&self, name: &str) -> Result<(), ClusterError> {
        match *lock(&self.write_failure) {
            Some(failure) => Err(failure.to_error(name)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, ClusterError> {
        self.record(MockCall::ListNodes);
        if let Some(failure) = *lock(&self.lookup_failure) {
            return Err(failure.to_error("nodes"));
        }
        Ok(lock(&self.nodes).clone())
    }

    async fn get_machine_config_metadata(&self, name: &str) -> Result<ObjectMeta, ClusterError> {
        self.record(MockCall::Get(name.to_string()));
        if let Some(failure) = *lock(&self.lookup_failure) {
            return Err(failure.to_error(name));
        }
        lock(&self.machine_configs)
            .get(name)
            .map(|remote| remote.metadata.clone())
            .ok_or_else(|| ClusterError::NotFound(format!("MachineConfig {}", name)))
    }

    async fn create_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError> {
        let name = machine_config.metadata.name.clone().unwrap_or_default();
        self.record(MockCall::Create(name.clone()));
        self.check_write(&name)?;

        if lock(&self.machine_configs).contains_key(&name) {
            return Err(ClusterError::AlreadyExists(format!("MachineConfig {}", name)));
        }

        let mut created = machine_config.clone();
        created.metadata.resource_version = Some(self.bump_resource_version());
        self.store(created.clone());
        Ok(created)
    }

    async fn replace_machine_config(&self, machine_config: &MachineConfig) -> Result<MachineConfig, ClusterError> {
        let name = machine_config.metadata.name.clone().unwrap_or_default();
        self.record(MockCall::Replace(name.clone()));
        self.check_write(&name)?;

        let current_version = lock(&self.machine_configs)
            .get(&name)
            .map(|remote| remote.metadata.resource_version.clone())
            .ok_or_else(|| ClusterError::NotFound(format!("MachineConfig {}", name)))?;

        if current_version != machine_config.metadata.resource_version {
            return Err(MockFailure::Conflict.to_error(&name));
        }

        let mut replaced = machine_config.clone();
        replaced.metadata.resource_version = Some(self.bump_resource_version());
        self.store(replaced.clone());
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::MachineConfigSpec;

    fn machine_config(name: &str) -> MachineConfig {
        MachineConfig::new(name, MachineConfigSpec::default())
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mock = MockClusterClient::new();
        let err = mock.get_machine_config_metadata("absent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_assigns_resource_version() {
        let mock = MockClusterClient::new();
        let created = mock.create_machine_config(&machine_config("mc")).await.unwrap();
        assert_eq!(created.metadata.resource_version.as_deref(), Some("1"));
        assert_eq!(mock.calls(), vec![MockCall::Create("mc".to_string())]);
    }

    #[tokio::test]
    async fn test_create_existing_is_rejected() {
        let mock = MockClusterClient::new();
        mock.add_machine_config(machine_config("mc"));
        let err = mock.create_machine_config(&machine_config("mc")).await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_replace_with_stale_version_conflicts() {
        let mock = MockClusterClient::new();
        let stored = mock.add_machine_config(machine_config("mc"));

        let mut stale = stored.clone();
        stale.metadata.resource_version = Some("0".to_string());
        let err = mock.replace_machine_config(&stale).await.unwrap_err();
        assert!(err.is_conflict());

        let replaced = mock.replace_machine_config(&stored).await.unwrap();
        assert_ne!(replaced.metadata.resource_version, stored.metadata.resource_version);
    }

    #[tokio::test]
    async fn test_lookup_failure_injection() {
        let mock = MockClusterClient::new();
        mock.add_machine_config(machine_config("mc"));
        mock.fail_lookups_with(MockFailure::Unauthorized);

        let err = mock.get_machine_config_metadata("mc").await.unwrap_err();
        assert!(matches!(err, ClusterError::Authentication(_)));
        assert!(mock.list_nodes().await.is_err());
    }

    #[tokio::test]
    async fn test_foreign_object_exposes_metadata_and_can_be_replaced() {
        let mock = MockClusterClient::new();
        let foreign = mock.add_foreign_machine_config(ObjectMeta {
            name: Some("mc".to_string()),
            ..Default::default()
        });

        let metadata = mock.get_machine_config_metadata("mc").await.unwrap();
        assert_eq!(metadata.resource_version, foreign.resource_version);
        assert!(mock.stored_machine_config("mc").is_none());

        let mut replacement = machine_config("mc");
        replacement.metadata.resource_version = metadata.resource_version;
        mock.replace_machine_config(&replacement).await.unwrap();
        assert!(mock.stored_machine_config("mc").is_some());
    }
}

//! Cluster API Client
//!
//! Thin client over the Kubernetes API covering the two resource kinds the
//! interface-rename tooling touches: nodes (listed for their role labels) and
//! `MachineConfig` objects (looked up by name, created, or replaced).
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterClientTrait, KubeClusterClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Uses KUBECONFIG / ~/.kube/config / in-cluster config
//! let client = KubeClusterClient::new(None).await?;
//!
//! let nodes = client.list_nodes().await?;
//! println!("{} nodes", nodes.len());
//!
//! match client.get_machine_config_metadata("50-interface-rename").await {
//!     Ok(existing) => println!("exists at {:?}", existing.resource_version),
//!     Err(e) if e.is_not_found() => println!("not found"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **test-util**: exposes `MockClusterClient`, an in-memory implementation
//!   with optimistic-concurrency checks and fault injection.

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeClusterClient;
pub use error::ClusterError;
pub use models::*;
pub use cluster_trait::ClusterClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockCall, MockClusterClient, MockFailure};

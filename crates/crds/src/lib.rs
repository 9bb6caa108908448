//! MachineConfig CRD Definitions
//!
//! Typed bindings for the OpenShift `MachineConfig` custom resource and the
//! label keys used to select node pools.

pub mod labels;
pub mod machine_config;

pub use labels::*;
pub use machine_config::*;

//! Well-known label keys
//!
//! Label keys read from cluster nodes and written onto `MachineConfig`
//! resources. These are part of the contract with the Machine Config Operator.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label key selecting which machine config pool renders a `MachineConfig`
pub const ROLE_LABEL: &str = "machineconfiguration.openshift.io/role";

/// Legacy control-plane node role label
pub const NODE_ROLE_MASTER: &str = "node-role.kubernetes.io/master";

/// Control-plane node role label
pub const NODE_ROLE_CONTROL_PLANE: &str = "node-role.kubernetes.io/control-plane";

/// Worker node role label
pub const NODE_ROLE_WORKER: &str = "node-role.kubernetes.io/worker";

/// Machine config pool role a resource is labelled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MachineConfigRole {
    /// Control-plane pool; used on single-node and compact clusters
    Master,
    /// Worker pool; used whenever dedicated workers exist
    #[default]
    Worker,
}

impl MachineConfigRole {
    /// Label value for this role
    pub fn as_str(self) -> &'static str {
        match self {
            MachineConfigRole::Master => "master",
            MachineConfigRole::Worker => "worker",
        }
    }
}

impl fmt::Display for MachineConfigRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a role value that is neither `master` nor `worker`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown machine config role '{0}' (expected 'master' or 'worker')")]
pub struct UnknownRoleError(pub String);

impl FromStr for MachineConfigRole {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "master" => Ok(MachineConfigRole::Master),
            "worker" => Ok(MachineConfigRole::Worker),
            other => Err(UnknownRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_label_value() {
        for role in [MachineConfigRole::Master, MachineConfigRole::Worker] {
            assert_eq!(role.as_str().parse::<MachineConfigRole>(), Ok(role));
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = "infra".parse::<MachineConfigRole>().unwrap_err();
        assert_eq!(err, UnknownRoleError("infra".to_string()));
    }
}

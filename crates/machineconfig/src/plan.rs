//! Generation plans
//!
//! Raw operator options are validated into a `GenerationPlan` before anything
//! touches a node or the cluster. A plan that names a reference interface is
//! resolved into a `ResolvedPlan` by probing that interface for its hardware IDs.

use crate::error::MachineConfigError;
use crate::probe::{HardwareProbe, ProbeTarget};
use crate::template::HardwareId;

/// Default MachineConfig name
pub const DEFAULT_MACHINE_CONFIG_NAME: &str = "50-interface-rename";

/// Unvalidated options, as collected from a command line or config.
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub machine_config_name: String,
    pub macs: Vec<String>,
    pub names: Vec<String>,
    pub name_policy: Option<String>,
    pub name_prefix: Option<String>,
    pub vendor_id: Option<String>,
    pub model_id: Option<String>,
    pub reference_interface: Option<String>,
    pub node: Option<String>,
}

/// Split a comma-separated list, trimming items and dropping empty ones
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(String::from)
}

/// How interfaces are matched, before probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matching {
    Macs(Vec<String>),
    HardwareId(HardwareId),
    /// Hardware IDs still to be read from this interface
    Probe(ProbeTarget),
}

/// How interfaces are matched, after probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource {
    Macs(Vec<String>),
    HardwareId(HardwareId),
}

/// How matched interfaces are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Naming {
    /// One name per MAC, positionally; exactly one for hardware-ID matching
    Explicit(Vec<String>),
    /// systemd `NamePolicy` value
    Policy(String),
    /// `<prefix><index>` per MAC
    IndexPrefix(String),
}

/// Validated plan; may still need a hardware probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub name: String,
    pub matching: Matching,
    pub naming: Naming,
}

/// Plan ready for building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub name: String,
    pub matching: MatchSource,
    pub naming: Naming,
}

impl GenerationPlan {
    /// Validate raw options.
    ///
    /// # Errors
    ///
    /// Input contract violations only; nothing external is consulted.
    pub fn from_options(options: &RenameOptions) -> Result<Self, MachineConfigError> {
        let name = options.machine_config_name.trim();
        if name.is_empty() {
            return Err(MachineConfigError::InvalidOption(
                "MachineConfig name must not be empty".to_string(),
            ));
        }

        let matching = Self::matching(options)?;
        let naming = Self::naming(options)?;

        match (&matching, &naming) {
            (Matching::Macs(macs), Naming::Explicit(names)) if macs.len() != names.len() => {
                return Err(MachineConfigError::CardinalityMismatch {
                    macs: macs.len(),
                    names: names.len(),
                });
            }
            (Matching::HardwareId(_) | Matching::Probe(_), Naming::Explicit(names)) if names.len() > 1 => {
                return Err(MachineConfigError::ConflictingOptions(
                    "when using vendor/model matching, only one interface name can be specified".to_string(),
                ));
            }
            (Matching::HardwareId(_) | Matching::Probe(_), Naming::IndexPrefix(_)) => {
                return Err(MachineConfigError::ConflictingOptions(
                    "a name prefix can only be used with MAC address matching".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            name: name.to_string(),
            matching,
            naming,
        })
    }

    fn matching(options: &RenameOptions) -> Result<Matching, MachineConfigError> {
        let vendor = non_empty(options.vendor_id.as_ref());
        let model = non_empty(options.model_id.as_ref());
        let reference = non_empty(options.reference_interface.as_ref());
        let node = non_empty(options.node.as_ref());
        let macs: Vec<String> = options
            .macs
            .iter()
            .map(|mac| mac.trim())
            .filter(|mac| !mac.is_empty())
            .map(String::from)
            .collect();

        if node.is_some() && reference.is_none() {
            return Err(MachineConfigError::ConflictingOptions(
                "a node requires a reference interface to detect".to_string(),
            ));
        }

        let hardware = match (reference, vendor, model) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(MachineConfigError::ConflictingOptions(
                    "a reference interface cannot be used with vendor or model IDs".to_string(),
                ));
            }
            (Some(interface), None, None) => Some(Matching::Probe(ProbeTarget { interface, node })),
            (None, Some(vendor), Some(model)) => Some(Matching::HardwareId(HardwareId::new(vendor, model))),
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(MachineConfigError::ConflictingOptions(
                    "vendor and model IDs must be specified together".to_string(),
                ));
            }
            (None, None, None) => None,
        };

        match (hardware, macs.is_empty()) {
            (Some(_), false) => Err(MachineConfigError::ConflictingOptions(
                "MAC addresses and vendor/model matching are mutually exclusive".to_string(),
            )),
            (Some(hardware), true) => Ok(hardware),
            (None, false) => Ok(Matching::Macs(macs)),
            (None, true) => Err(MachineConfigError::MissingMatchCriterion),
        }
    }

    fn naming(options: &RenameOptions) -> Result<Naming, MachineConfigError> {
        let names: Vec<String> = options
            .names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect();

        let mut strategies = Vec::with_capacity(1);
        if let Some(policy) = non_empty(options.name_policy.as_ref()) {
            strategies.push(Naming::Policy(policy));
        }
        if !names.is_empty() {
            strategies.push(Naming::Explicit(names));
        }
        if let Some(prefix) = non_empty(options.name_prefix.as_ref()) {
            strategies.push(Naming::IndexPrefix(prefix));
        }

        match strategies.len() {
            0 => Err(MachineConfigError::MissingNamingStrategy),
            1 => Ok(strategies.remove(0)),
            _ => Err(MachineConfigError::ConflictingOptions(
                "name policy, explicit names and name prefix are mutually exclusive".to_string(),
            )),
        }
    }

    /// Interface that must be probed before building, if any
    pub fn probe_target(&self) -> Option<&ProbeTarget> {
        match &self.matching {
            Matching::Probe(target) => Some(target),
            Matching::Macs(_) | Matching::HardwareId(_) => None,
        }
    }

    /// Probe the reference interface if the plan has one.
    ///
    /// # Errors
    ///
    /// `Probe` when the hardware probe fails.
    pub async fn resolve<P>(self, probe: &P) -> Result<ResolvedPlan, MachineConfigError>
    where
        P: HardwareProbe + ?Sized,
    {
        let matching = match self.matching {
            Matching::Macs(macs) => MatchSource::Macs(macs),
            Matching::HardwareId(id) => MatchSource::HardwareId(id),
            Matching::Probe(target) => MatchSource::HardwareId(probe.probe(&target).await?),
        };

        Ok(ResolvedPlan {
            name: self.name,
            matching,
            naming: self.naming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn options() -> RenameOptions {
        RenameOptions {
            machine_config_name: DEFAULT_MACHINE_CONFIG_NAME.to_string(),
            ..Default::default()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    struct FixedProbe {
        seen: Mutex<Vec<ProbeTarget>>,
    }

    #[async_trait::async_trait]
    impl HardwareProbe for FixedProbe {
        async fn probe(&self, target: &ProbeTarget) -> Result<HardwareId, MachineConfigError> {
            self.seen.lock().unwrap().push(target.clone());
            Ok(HardwareId::new("8086", "1593"))
        }
    }

    struct FailingProbe;

    #[async_trait::async_trait]
    impl HardwareProbe for FailingProbe {
        async fn probe(&self, target: &ProbeTarget) -> Result<HardwareId, MachineConfigError> {
            Err(MachineConfigError::Probe {
                interface: target.interface.clone(),
                node: target.node.clone(),
                reason: "udevadm exited with status 1".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_list_trims_and_drops_empty() {
        assert_eq!(
            parse_list(" aa:bb:cc:dd:ee:ff , ,11:22:33:44:55:66,"),
            strings(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"])
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_macs_with_names() {
        let plan = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"]),
            names: strings(&["ptp0", "ptp1"]),
            ..options()
        })
        .unwrap();

        assert_eq!(plan.name, "50-interface-rename");
        assert_eq!(plan.matching, Matching::Macs(strings(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"])));
        assert_eq!(plan.naming, Naming::Explicit(strings(&["ptp0", "ptp1"])));
        assert!(plan.probe_target().is_none());
    }

    #[test]
    fn test_name_count_must_match_macs() {
        let err = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"]),
            names: strings(&["ptp0"]),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::CardinalityMismatch { macs: 2, names: 1 }));
    }

    #[test]
    fn test_missing_match_criterion() {
        let err = GenerationPlan::from_options(&RenameOptions {
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::MissingMatchCriterion));
    }

    #[test]
    fn test_missing_naming_strategy() {
        let err = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            name_policy: Some("   ".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::MissingNamingStrategy));
    }

    #[test]
    fn test_policy_and_names_are_exclusive() {
        let err = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            names: strings(&["ptp0"]),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_vendor_requires_model() {
        let err = GenerationPlan::from_options(&RenameOptions {
            vendor_id: Some("8086".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_vendor_model_with_policy() {
        let plan = GenerationPlan::from_options(&RenameOptions {
            vendor_id: Some(" 8086 ".to_string()),
            model_id: Some("0x153a".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap();
        assert_eq!(plan.matching, Matching::HardwareId(HardwareId::new("0x8086", "0x153a")));
        assert_eq!(plan.naming, Naming::Policy("slot".to_string()));
    }

    #[test]
    fn test_vendor_model_takes_one_name() {
        let err = GenerationPlan::from_options(&RenameOptions {
            vendor_id: Some("8086".to_string()),
            model_id: Some("153a".to_string()),
            names: strings(&["ptp0", "ptp1"]),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_vendor_model_rejects_prefix() {
        let err = GenerationPlan::from_options(&RenameOptions {
            vendor_id: Some("8086".to_string()),
            model_id: Some("153a".to_string()),
            name_prefix: Some("ptp".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_macs_and_vendor_are_exclusive() {
        let err = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            vendor_id: Some("8086".to_string()),
            model_id: Some("153a".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_reference_interface_excludes_vendor() {
        let err = GenerationPlan::from_options(&RenameOptions {
            reference_interface: Some("ens1f0".to_string()),
            vendor_id: Some("8086".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_node_requires_reference_interface() {
        let err = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            node: Some("worker-0".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::ConflictingOptions(_)));
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let err = GenerationPlan::from_options(&RenameOptions {
            machine_config_name: " ".to_string(),
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            name_policy: Some("slot".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, MachineConfigError::InvalidOption(_)));
    }

    #[tokio::test]
    async fn test_resolve_probes_reference_interface() {
        let plan = GenerationPlan::from_options(&RenameOptions {
            reference_interface: Some("ens1f0".to_string()),
            node: Some("worker-0".to_string()),
            names: strings(&["ptp0"]),
            ..options()
        })
        .unwrap();

        let probe = FixedProbe {
            seen: Mutex::new(Vec::new()),
        };
        let resolved = plan.resolve(&probe).await.unwrap();

        assert_eq!(resolved.matching, MatchSource::HardwareId(HardwareId::new("0x8086", "0x1593")));
        assert_eq!(resolved.naming, Naming::Explicit(strings(&["ptp0"])));
        assert_eq!(
            probe.seen.lock().unwrap().as_slice(),
            &[ProbeTarget {
                interface: "ens1f0".to_string(),
                node: Some("worker-0".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_without_probe_target_never_probes() {
        let plan = GenerationPlan::from_options(&RenameOptions {
            macs: strings(&["aa:bb:cc:dd:ee:ff"]),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap();

        let resolved = plan.resolve(&FailingProbe).await.unwrap();
        assert_eq!(resolved.matching, MatchSource::Macs(strings(&["aa:bb:cc:dd:ee:ff"])));
    }

    #[tokio::test]
    async fn test_resolve_propagates_probe_failure() {
        let plan = GenerationPlan::from_options(&RenameOptions {
            reference_interface: Some("ens1f0".to_string()),
            name_policy: Some("slot".to_string()),
            ..options()
        })
        .unwrap();

        let err = plan.resolve(&FailingProbe).await.unwrap_err();
        assert!(matches!(err, MachineConfigError::Probe { .. }));
    }
}

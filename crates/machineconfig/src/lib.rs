//! Interface-rename MachineConfig generation
//!
//! Turns matching criteria (MAC addresses or PCI vendor/model IDs) and a
//! naming strategy (explicit names, an index prefix, or a systemd `NamePolicy`)
//! into an OpenShift `MachineConfig` that drops systemd `.link` files under
//! `/etc/systemd/network/`, and applies it to a cluster with create-or-update
//! semantics.
//!
//! # Example
//!
//! ```
//! use crds::MachineConfigRole;
//! use machineconfig::{builder, render};
//!
//! let macs = vec!["aa:bb:cc:dd:ee:ff".to_string(), "11:22:33:44:55:66".to_string()];
//! let names = vec!["ptp0".to_string(), "ptp1".to_string()];
//!
//! let mc = builder::with_explicit_names("50-interface-rename", MachineConfigRole::Worker, &macs, &names)?;
//! let yaml = render::to_yaml(&mc)?;
//! assert!(yaml.contains("path: /etc/systemd/network/10-ptp0.link"));
//! # Ok::<(), machineconfig::MachineConfigError>(())
//! ```

pub mod builder;
pub mod encoding;
pub mod error;
pub mod plan;
pub mod probe;
pub mod reconciler;
pub mod render;
pub mod template;
pub mod topology;

pub use builder::build_machine_config;
pub use error::MachineConfigError;
pub use plan::{GenerationPlan, MatchSource, Matching, Naming, RenameOptions, ResolvedPlan};
pub use probe::{HardwareProbe, ProbeTarget, UdevadmProbe};
pub use reconciler::{ApplyOutcome, Reconciler};
pub use template::{HardwareId, MatchCriterion, NamingStrategy};
pub use topology::{NodeRoleCounts, TopologyClassification};

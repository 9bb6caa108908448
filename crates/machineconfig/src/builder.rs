//! MachineConfig construction
//!
//! One constructor per supported (matching × naming) combination. Every
//! constructor builds the complete file list before assembling the resource,
//! so a failed build never yields a partial MachineConfig.
//!
//! Link file paths are part of the contract with nodes that already carry
//! earlier renders; they must not change:
//!
//! | matching    | naming   | path                                                |
//! |-------------|----------|-----------------------------------------------------|
//! | MAC list    | prefix   | `/etc/systemd/network/10-<prefix><i>.link`          |
//! | MAC list    | names    | `/etc/systemd/network/10-<name>.link`               |
//! | MAC list    | policy   | `/etc/systemd/network/10-interface-<mac>.link`      |
//! | vendor/model| name     | `/etc/systemd/network/10-<name>.link`               |
//! | vendor/model| policy   | `/etc/systemd/network/10-interface-<vendor>-<model>.link` |

use crate::encoding::encode_data_uri;
use crate::error::MachineConfigError;
use crate::plan::{MatchSource, Naming, ResolvedPlan};
use crate::template::{render_link_file, HardwareId, MatchCriterion, NamingStrategy};
use crds::{
    FileContents, Ignition, IgnitionConfig, MachineConfig, MachineConfigFile, MachineConfigRole,
    MachineConfigSpec, Storage, LINK_FILE_MODE, NETWORK_DIR, ROLE_LABEL,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::debug;

/// Path of the link file for a discriminator (`10-<discriminator>.link`)
pub fn link_file_path(discriminator: &str) -> String {
    format!("{}10-{}.link", NETWORK_DIR, discriminator)
}

fn link_file(path: String, criterion: &MatchCriterion, naming: &NamingStrategy, annotate: bool) -> MachineConfigFile {
    let text = render_link_file(criterion, naming);
    MachineConfigFile {
        path,
        mode: LINK_FILE_MODE,
        overwrite: true,
        contents: FileContents {
            source: encode_data_uri(&text),
        },
        decoded: annotate.then_some(text),
    }
}

/// Assemble the resource around a finished file list
fn assemble(name: &str, role: MachineConfigRole, files: Vec<MachineConfigFile>) -> MachineConfig {
    debug!("Assembling MachineConfig {} ({} role, {} files)", name, role, files.len());
    MachineConfig {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(ROLE_LABEL.to_string(), role.as_str().to_string())])),
            ..Default::default()
        },
        spec: MachineConfigSpec {
            config: IgnitionConfig {
                ignition: Ignition::default(),
                storage: Storage { files },
            },
        },
    }
}

/// Name each MAC `<prefix><index>` (zero-based).
///
/// Files from this constructor carry no decoded-content annotation.
pub fn with_index_names(name: &str, role: MachineConfigRole, macs: &[String], prefix: &str) -> MachineConfig {
    let files = macs
        .iter()
        .enumerate()
        .map(|(i, mac)| {
            let interface_name = format!("{}{}", prefix, i);
            link_file(
                link_file_path(&interface_name),
                &MatchCriterion::ByMac(mac.clone()),
                &NamingStrategy::ExplicitName(interface_name),
                false,
            )
        })
        .collect();

    assemble(name, role, files)
}

/// Pair `names[i]` with `macs[i]`.
///
/// # Errors
///
/// `CardinalityMismatch` when the two lists differ in length.
pub fn with_explicit_names(
    name: &str,
    role: MachineConfigRole,
    macs: &[String],
    names: &[String],
) -> Result<MachineConfig, MachineConfigError> {
    if macs.len() != names.len() {
        return Err(MachineConfigError::CardinalityMismatch {
            macs: macs.len(),
            names: names.len(),
        });
    }

    let files = macs
        .iter()
        .zip(names)
        .map(|(mac, interface_name)| {
            link_file(
                link_file_path(interface_name),
                &MatchCriterion::ByMac(mac.clone()),
                &NamingStrategy::ExplicitName(interface_name.clone()),
                true,
            )
        })
        .collect();

    Ok(assemble(name, role, files))
}

/// Apply the same `NamePolicy` to every MAC. Paths are keyed on the MAC with
/// colons removed.
pub fn with_name_policy(name: &str, role: MachineConfigRole, macs: &[String], policy: &str) -> MachineConfig {
    let files = macs
        .iter()
        .map(|mac| {
            let safe_mac = mac.replace(':', "");
            link_file(
                link_file_path(&format!("interface-{}", safe_mac)),
                &MatchCriterion::ByMac(mac.clone()),
                &NamingStrategy::Policy(policy.to_string()),
                true,
            )
        })
        .collect();

    assemble(name, role, files)
}

/// One file matching every interface of a hardware model, with a fixed name.
pub fn with_hardware_id_and_name(
    name: &str,
    role: MachineConfigRole,
    id: &HardwareId,
    interface_name: &str,
) -> MachineConfig {
    let file = link_file(
        link_file_path(interface_name),
        &MatchCriterion::ByHardwareId(id.clone()),
        &NamingStrategy::ExplicitName(interface_name.to_string()),
        true,
    );

    assemble(name, role, vec![file])
}

/// One file matching every interface of a hardware model, named by policy.
pub fn with_hardware_id_and_policy(name: &str, role: MachineConfigRole, id: &HardwareId, policy: &str) -> MachineConfig {
    let file = link_file(
        link_file_path(&format!("interface-{}", id.file_token())),
        &MatchCriterion::ByHardwareId(id.clone()),
        &NamingStrategy::Policy(policy.to_string()),
        true,
    );

    assemble(name, role, vec![file])
}

/// Build the MachineConfig a resolved plan describes.
///
/// # Errors
///
/// `CardinalityMismatch` for mismatched MAC/name lists, `ConflictingOptions`
/// for naming strategies that do not apply to hardware-ID matching.
pub fn build_machine_config(plan: &ResolvedPlan, role: MachineConfigRole) -> Result<MachineConfig, MachineConfigError> {
    let name = plan.name.as_str();

    match (&plan.matching, &plan.naming) {
        (MatchSource::Macs(macs), Naming::Explicit(names)) => with_explicit_names(name, role, macs, names),
        (MatchSource::Macs(macs), Naming::Policy(policy)) => Ok(with_name_policy(name, role, macs, policy)),
        (MatchSource::Macs(macs), Naming::IndexPrefix(prefix)) => Ok(with_index_names(name, role, macs, prefix)),
        (MatchSource::HardwareId(id), Naming::Explicit(names)) => match names.as_slice() {
            [interface_name] => Ok(with_hardware_id_and_name(name, role, id, interface_name)),
            _ => Err(MachineConfigError::ConflictingOptions(format!(
                "vendor/model matching takes exactly one interface name, got {}",
                names.len()
            ))),
        },
        (MatchSource::HardwareId(id), Naming::Policy(policy)) => Ok(with_hardware_id_and_policy(name, role, id, policy)),
        (MatchSource::HardwareId(_), Naming::IndexPrefix(_)) => Err(MachineConfigError::ConflictingOptions(
            "a name prefix cannot be used with vendor/model matching".to_string(),
        )),
    }
}

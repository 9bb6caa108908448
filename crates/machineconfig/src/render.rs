//! YAML rendering of MachineConfigs
//!
//! Output is the plain manifest plus, under each link file's `path:` line,
//! comment lines showing the decoded file body. serde_yaml has no way to attach
//! comments to a sequence element, so they are spliced into the serialized
//! text in a second pass. The comments are for human review only.

use crate::error::MachineConfigError;
use crds::{MachineConfig, MachineConfigFile, MachineConfigSpec, NETWORK_DIR};
use kube::Resource;
use serde::Serialize;
use std::collections::BTreeMap;

/// Indentation of annotation comments (one level under a file entry's keys)
const ANNOTATION_INDENT: &str = "          ";

const PATH_ENTRY: &str = "- path: ";

/// Manifest in the field order operators expect: name before labels.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    api_version: String,
    kind: String,
    metadata: DocumentMetadata<'a>,
    spec: &'a MachineConfigSpec,
}

#[derive(Serialize)]
struct DocumentMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a BTreeMap<String, String>>,
}

/// Serialize a MachineConfig to YAML with decoded-content comments.
///
/// # Errors
///
/// `Serialization` if serde_yaml fails, which well-formed resources never trigger.
pub fn to_yaml(machine_config: &MachineConfig) -> Result<String, MachineConfigError> {
    let document = Document {
        api_version: MachineConfig::api_version(&()).into_owned(),
        kind: MachineConfig::kind(&()).into_owned(),
        metadata: DocumentMetadata {
            name: machine_config.metadata.name.as_deref().unwrap_or_default(),
            labels: machine_config.metadata.labels.as_ref(),
        },
        spec: &machine_config.spec,
    };

    let yaml = serde_yaml::to_string(&document)?;
    Ok(annotate_link_files(&yaml, &machine_config.spec.config.storage.files))
}

/// Insert each file's decoded body as comments below its `- path:` line.
/// Blank lines of the body are dropped.
fn annotate_link_files(yaml: &str, files: &[MachineConfigFile]) -> String {
    let mut out = String::with_capacity(yaml.len());
    let mut entries = files.iter();

    for line in yaml.lines() {
        out.push_str(line);
        out.push('\n');

        let Some(path) = line.trim_start().strip_prefix(PATH_ENTRY) else {
            continue;
        };
        let Some(file) = entries.next() else {
            continue;
        };

        if !path.trim_matches(|c| c == '\'' || c == '"').starts_with(NETWORK_DIR) {
            continue;
        }
        if let Some(decoded) = &file.decoded {
            for comment in decoded.lines().filter(|l| !l.is_empty()) {
                out.push_str(ANNOTATION_INDENT);
                out.push_str("# ");
                out.push_str(comment);
                out.push('\n');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use crate::template::HardwareId;
    use crds::MachineConfigRole;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_document_shape() {
        let mc = builder::with_explicit_names(
            "50-interface-rename",
            MachineConfigRole::Worker,
            &strings(&["aa:bb:cc:dd:ee:ff"]),
            &strings(&["ptp0"]),
        )
        .unwrap();

        let yaml = to_yaml(&mc).unwrap();
        let lines: Vec<&str> = yaml.lines().collect();

        assert_eq!(
            &lines[..15],
            &[
                "apiVersion: machineconfiguration.openshift.io/v1",
                "kind: MachineConfig",
                "metadata:",
                "  name: 50-interface-rename",
                "  labels:",
                "    machineconfiguration.openshift.io/role: worker",
                "spec:",
                "  config:",
                "    ignition:",
                "      version: 3.2.0",
                "    storage:",
                "      files:",
                "      - path: /etc/systemd/network/10-ptp0.link",
                "          # [Match]",
                "          # MACAddress=aa:bb:cc:dd:ee:ff",
            ]
        );
        assert_eq!(
            &lines[15..20],
            &[
                "          # [Link]",
                "          # Name=ptp0",
                "        mode: 420",
                "        overwrite: true",
                "        contents:",
            ]
        );
        assert!(lines[20].trim_start().starts_with("source:"));
        assert!(lines[20].contains("data:text/plain,%5BMatch%5D%0AMACAddress%3Daa%3Abb%3Acc%3Add%3Aee%3Aff"));
        assert!(yaml.ends_with('\n'));
    }

    #[test]
    fn test_comments_follow_their_own_file() {
        let mc = builder::with_name_policy(
            "mc",
            MachineConfigRole::Master,
            &strings(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"]),
            "slot path",
        );
        let yaml = to_yaml(&mc).unwrap();

        let first = yaml.find("10-interface-aabbccddeeff.link").unwrap();
        let second = yaml.find("10-interface-112233445566.link").unwrap();
        let first_mac = yaml.find("# MACAddress=aa:bb:cc:dd:ee:ff").unwrap();
        let second_mac = yaml.find("# MACAddress=11:22:33:44:55:66").unwrap();

        assert!(first < first_mac && first_mac < second && second < second_mac);
        assert_eq!(yaml.matches("# NamePolicy=slot path").count(), 2);
    }

    #[test]
    fn test_unannotated_files_get_no_comments() {
        let mc = builder::with_index_names(
            "mc",
            MachineConfigRole::Worker,
            &strings(&["aa:bb:cc:dd:ee:ff"]),
            "ptp",
        );
        let yaml = to_yaml(&mc).unwrap();
        assert!(yaml.contains("- path: /etc/systemd/network/10-ptp0.link\n        mode: 420\n"));
        assert!(!yaml.contains('#'));
    }

    #[test]
    fn test_comments_are_inert_yaml() {
        let mc = builder::with_hardware_id_and_policy(
            "mc",
            MachineConfigRole::Worker,
            &HardwareId::new("8086", "153a"),
            "slot",
        );
        let yaml = to_yaml(&mc).unwrap();
        assert!(yaml.contains("          # Property=ID_VENDOR_ID=0x8086\n"));

        let reparsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let files = &reparsed["spec"]["config"]["storage"]["files"];
        assert_eq!(files[0]["path"], "/etc/systemd/network/10-interface-8086-153a.link");
        assert_eq!(files[0]["contents"]["source"], mc.spec.config.storage.files[0].contents.source.as_str());
    }

    #[test]
    fn test_annotation_skips_files_outside_network_dir() {
        let mut file = builder::with_index_names("mc", MachineConfigRole::Worker, &strings(&["aa"]), "x")
            .spec
            .config
            .storage
            .files
            .remove(0);
        file.path = "/etc/other/file".to_string();
        file.decoded = Some("hidden".to_string());

        let yaml = "      files:\n      - path: /etc/other/file\n        mode: 420\n";
        assert_eq!(annotate_link_files(yaml, &[file]), yaml);
    }
}

//! systemd `.link` file templates
//!
//! A link file has a `[Match]` section selecting the device and a `[Link]`
//! section naming it. Rendering is pure and total; every criterion/strategy
//! pair produces a valid file.

use std::fmt;

const HEX_PREFIX: &str = "0x";

/// PCI/USB vendor and model identifier pair, as udev reports them.
///
/// Both IDs are stored with a `0x` prefix; constructing from an ID that
/// already has one is a no-op, so canonicalization is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HardwareId {
    vendor_id: String,
    model_id: String,
}

impl HardwareId {
    pub fn new(vendor_id: impl AsRef<str>, model_id: impl AsRef<str>) -> Self {
        Self {
            vendor_id: canonical_hex_id(vendor_id.as_ref()),
            model_id: canonical_hex_id(model_id.as_ref()),
        }
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Filename-safe `<vendor>-<model>` token.
    ///
    /// Strips every `0x` and `:` and nothing else, so existing generated
    /// filenames stay stable.
    pub fn file_token(&self) -> String {
        format!("{}-{}", sanitize_id(&self.vendor_id), sanitize_id(&self.model_id))
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor_id, self.model_id)
    }
}

/// Prefix `id` with `0x` unless it already carries it
pub fn canonical_hex_id(id: &str) -> String {
    if id.starts_with(HEX_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", HEX_PREFIX, id)
    }
}

fn sanitize_id(id: &str) -> String {
    id.replace(HEX_PREFIX, "").replace(':', "")
}

/// How the `[Match]` section selects a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCriterion {
    /// Exact MAC address, written verbatim
    ByMac(String),
    /// udev `ID_VENDOR_ID` / `ID_MODEL_ID` properties. Matches every
    /// interface of that hardware model.
    ByHardwareId(HardwareId),
}

/// How the `[Link]` section names the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Fixed interface name
    ExplicitName(String),
    /// systemd naming scheme(s), e.g. `slot` or `onboard slot path`
    Policy(String),
}

/// Render one link file.
///
/// ```
/// use machineconfig::template::{render_link_file, MatchCriterion, NamingStrategy};
///
/// let text = render_link_file(
///     &MatchCriterion::ByMac("aa:bb:cc:dd:ee:ff".to_string()),
///     &NamingStrategy::ExplicitName("ptp0".to_string()),
/// );
/// assert_eq!(text, "[Match]\nMACAddress=aa:bb:cc:dd:ee:ff\n\n[Link]\nName=ptp0\n");
/// ```
pub fn render_link_file(criterion: &MatchCriterion, naming: &NamingStrategy) -> String {
    let mut out = String::from("[Match]\n");

    match criterion {
        MatchCriterion::ByMac(address) => {
            out.push_str(&format!("MACAddress={}\n", address));
        }
        MatchCriterion::ByHardwareId(id) => {
            out.push_str(&format!("Property=ID_VENDOR_ID={}\n", id.vendor_id()));
            out.push_str(&format!("Property=ID_MODEL_ID={}\n", id.model_id()));
        }
    }

    out.push_str("\n[Link]\n");

    match naming {
        NamingStrategy::ExplicitName(name) => out.push_str(&format!("Name={}\n", name)),
        NamingStrategy::Policy(scheme) => out.push_str(&format!("NamePolicy={}\n", scheme)),
    }

    out
}

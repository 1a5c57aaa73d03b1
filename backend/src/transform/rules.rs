//! Derivation rules: scope of development and device relevancy.

use crate::models::{Device, DeviceSet, GENERAL_RULES};

/// A purpose keyword and the devices it enables.
#[derive(Debug, Clone, Copy)]
pub struct DeviceRule {
    /// Lower-case substring searched in the purpose text
    pub keyword: &'static str,
    pub devices: &'static [Device],
}

/// Purpose keyword rules. Every matching rule applies.
pub const DEVICE_RULES: [DeviceRule; 4] = [
    DeviceRule {
        keyword: "web",
        devices: &[Device::Web],
    },
    DeviceRule {
        keyword: "mobile",
        devices: &[Device::AndroidMobile, Device::AppleMobile],
    },
    DeviceRule {
        keyword: "connected tv",
        devices: &[Device::AndroidTv, Device::AppleTv, Device::FireTv, Device::Roku],
    },
    DeviceRule {
        keyword: "smarttv",
        devices: &[Device::SmartTv, Device::VizioTv],
    },
];

/// Collapse the category hierarchy into a single scope label.
///
/// `sub` wins over `comp` when both are set; `main` does not take part.
pub fn generate_scope_of_dev(_main: &str, sub: &str, comp: &str) -> String {
    match (sub.is_empty(), comp.is_empty()) {
        (true, true) => GENERAL_RULES.to_string(),
        (false, _) => sub.to_string(),
        (true, false) => comp.to_string(),
    }
}

/// Devices a purpose text applies to.
pub fn set_device_relevancy(purpose: &str) -> DeviceSet {
    let purpose = purpose.to_lowercase();
    DEVICE_RULES
        .iter()
        .filter(|rule| purpose.contains(rule.keyword))
        .fold(DeviceSet::empty(), |set, rule| {
            set.union(DeviceSet::of(rule.devices))
        })
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ConfigMap = BTreeMap<String, String>;
pub type DeviceMap = BTreeMap<String, ConfigMap>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    /// 原始儲存的實例類型字串，由分類器負責檢查
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(default)]
    pub profiles: Vec<String>,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub devices: DeviceMap,
}

/// Configuration template inherited by the instances that list it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub devices: DeviceMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(default)]
    pub config: ConfigMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub fingerprint: String,
    /// Size in bytes, as recorded at import time.
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    /// Project-level configuration, e.g. the `limits.*` quotas.
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceType {
    Container,
    VirtualMachine,
}

impl InstanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::Container => "container",
            InstanceType::VirtualMachine => "virtual-machine",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "container" => Some(InstanceType::Container),
            "virtual-machine" => Some(InstanceType::VirtualMachine),
            _ => None,
        }
    }
}

impl ProjectInfo {
    pub fn has_limits(&self) -> bool {
        self.config.keys().any(|key| key.starts_with("limits."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LimitKey {
    Memory,
    Cpu,
    Processes,
    Disk,
}

impl LimitKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKey::Memory => "limits.memory",
            LimitKey::Cpu => "limits.cpu",
            LimitKey::Processes => "limits.processes",
            LimitKey::Disk => "limits.disk",
        }
    }

    /// 尚未加總前的初始值
    pub fn zero(&self) -> LimitValue {
        match self {
            LimitKey::Memory | LimitKey::Disk => LimitValue::Bytes(0),
            LimitKey::Cpu | LimitKey::Processes => LimitValue::Count(0),
        }
    }
}

impl std::fmt::Display for LimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw aggregate of one limit kind, before a printer renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    Bytes(i64),
    Count(i64),
}

impl LimitValue {
    /// Adds two values of the same kind; mixed kinds or overflow yield `None`.
    pub fn checked_add(self, other: LimitValue) -> Option<LimitValue> {
        match (self, other) {
            (LimitValue::Bytes(a), LimitValue::Bytes(b)) => a.checked_add(b).map(LimitValue::Bytes),
            (LimitValue::Count(a), LimitValue::Count(b)) => a.checked_add(b).map(LimitValue::Count),
            _ => None,
        }
    }
}

pub type LimitTotals = BTreeMap<LimitKey, LimitValue>;

pub const REPORT_KEYS: [&str; 7] = [
    "disk",
    "memory",
    "containers",
    "virtual-machines",
    "cpu",
    "processes",
    "networks",
];

/// Current allocations of a project, every value ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsageReport {
    values: BTreeMap<&'static str, String>,
}

impl Default for UsageReport {
    fn default() -> Self {
        Self {
            values: REPORT_KEYS.iter().map(|key| (*key, "0".to_string())).collect(),
        }
    }
}

impl UsageReport {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Only the fixed report keys can be set; anything else is ignored.
    pub(crate) fn set(&mut self, key: &str, value: String) {
        if let Some(slot) = self.values.get_mut(key) {
            *slot = value;
        }
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.values
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_has_all_keys_zeroed() {
        let report = UsageReport::default();
        assert_eq!(report.iter().count(), REPORT_KEYS.len());
        for key in REPORT_KEYS {
            assert_eq!(report.get(key), Some("0"));
        }
    }

    #[test]
    fn test_report_ignores_unknown_keys() {
        let mut report = UsageReport::default();
        report.set("gpus", "4".to_string());
        report.set("cpu", "4".to_string());
        assert_eq!(report.get("gpus"), None);
        assert_eq!(report.get("cpu"), Some("4"));
    }

    #[test]
    fn test_report_serializes_as_flat_object() {
        let json = serde_json::to_value(UsageReport::default()).unwrap();
        assert_eq!(json["virtual-machines"], "0");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_limit_key_names_and_zero_values() {
        assert_eq!(LimitKey::Cpu.to_string(), "limits.cpu");
        assert_eq!(LimitKey::Disk.as_str(), "limits.disk");
        assert_eq!(LimitKey::Disk.zero(), LimitValue::Bytes(0));
        assert_eq!(LimitKey::Processes.zero(), LimitValue::Count(0));
    }

    #[test]
    fn test_limit_value_addition_requires_same_kind() {
        assert_eq!(
            LimitValue::Bytes(1).checked_add(LimitValue::Bytes(2)),
            Some(LimitValue::Bytes(3))
        );
        assert_eq!(LimitValue::Bytes(1).checked_add(LimitValue::Count(2)), None);
        assert_eq!(LimitValue::Count(i64::MAX).checked_add(LimitValue::Count(1)), None);
    }

    #[test]
    fn test_instance_type_names() {
        assert_eq!(InstanceType::parse("container"), Some(InstanceType::Container));
        assert_eq!(
            InstanceType::parse(InstanceType::VirtualMachine.as_str()),
            Some(InstanceType::VirtualMachine)
        );
        assert_eq!(InstanceType::parse("Container"), None);
    }
}

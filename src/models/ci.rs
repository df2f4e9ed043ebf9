//! Configuration item model for the `cmdb_ci` table.

use serde::Deserialize;

use super::common::{display_of, value_of, FieldValue};

/// A record from the `cmdb_ci` table.
///
/// Only the fields reconciliation needs are mapped; the CMDB carries
/// far more, but matching runs on identity fields alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationItem {
    /// Opaque record identity.
    #[serde(default)]
    pub sys_id: Option<FieldValue>,

    /// CI name.
    #[serde(default)]
    pub name: Option<FieldValue>,

    /// Asset tag, when the CI carries one.
    #[serde(default)]
    pub asset_tag: Option<FieldValue>,

    /// Manufacturer serial number.
    #[serde(default)]
    pub serial_number: Option<FieldValue>,

    /// CI class (e.g., `cmdb_ci_computer`).
    #[serde(default)]
    pub sys_class_name: Option<FieldValue>,

    /// Install status.
    #[serde(default)]
    pub install_status: Option<FieldValue>,
}

impl ConfigurationItem {
    /// Returns the sys_id, if present.
    pub fn sys_id(&self) -> Option<&str> {
        value_of(&self.sys_id)
    }

    /// Returns the CI name, falling back to sys_id.
    pub fn name(&self) -> &str {
        display_of(&self.name)
            .or_else(|| self.sys_id())
            .unwrap_or("(unnamed)")
    }

    /// Returns the asset tag.
    pub fn asset_tag(&self) -> Option<&str> {
        value_of(&self.asset_tag)
    }

    /// Returns the serial number.
    pub fn serial_number(&self) -> Option<&str> {
        value_of(&self.serial_number)
    }

    /// Returns the CI class name.
    pub fn class_name(&self) -> Option<&str> {
        display_of(&self.sys_class_name)
    }

    /// Returns the install status display value.
    pub fn install_status(&self) -> Option<&str> {
        display_of(&self.install_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "sys_id": "ci000000000000000000000000000001",
            "name": "SRV-DB-01",
            "asset_tag": "P1000042",
            "serial_number": "SN-9981",
            "sys_class_name": "cmdb_ci_server"
        }"#;
        let ci: ConfigurationItem = serde_json::from_str(json).unwrap();
        assert_eq!(ci.name(), "SRV-DB-01");
        assert_eq!(ci.asset_tag(), Some("P1000042"));
        assert_eq!(ci.serial_number(), Some("SN-9981"));
        assert_eq!(ci.class_name(), Some("cmdb_ci_server"));
    }

    #[test]
    fn test_name_fallback() {
        let ci: ConfigurationItem =
            serde_json::from_str(r#"{"sys_id": "ci000000000000000000000000000002"}"#).unwrap();
        assert_eq!(ci.name(), "ci000000000000000000000000000002");
    }
}

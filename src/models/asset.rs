//! Base asset model for the `alm_asset` table, plus lifecycle helpers.
//!
//! `alm_asset` is the parent table of hardware and software entries;
//! the detail and lifecycle tools read it directly so they work for
//! every asset class.

use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{date_of, display_of, f64_of, value_of, FieldValue};

/// A record from the `alm_asset` base table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRecord {
    /// Opaque record identity.
    #[serde(default)]
    pub sys_id: Option<FieldValue>,

    /// Asset tag.
    #[serde(default)]
    pub asset_tag: Option<FieldValue>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<FieldValue>,

    /// Model (reference field).
    #[serde(default)]
    pub model: Option<FieldValue>,

    /// Model category.
    #[serde(default)]
    pub model_category: Option<FieldValue>,

    /// Serial number.
    #[serde(default)]
    pub serial_number: Option<FieldValue>,

    /// Install status.
    #[serde(default)]
    pub install_status: Option<FieldValue>,

    /// Substatus.
    #[serde(default)]
    pub substatus: Option<FieldValue>,

    /// Assigned user (reference field).
    #[serde(default)]
    pub assigned_to: Option<FieldValue>,

    /// Owning department (reference field).
    #[serde(default)]
    pub department: Option<FieldValue>,

    /// Location (reference field).
    #[serde(default)]
    pub location: Option<FieldValue>,

    /// Purchase cost.
    #[serde(default)]
    pub cost: Option<FieldValue>,

    /// Purchase date.
    #[serde(default)]
    pub purchase_date: Option<FieldValue>,

    /// Install date.
    #[serde(default)]
    pub install_date: Option<FieldValue>,

    /// Retirement date.
    #[serde(default)]
    pub retired_date: Option<FieldValue>,

    /// Disposal date.
    #[serde(default)]
    pub disposal_date: Option<FieldValue>,

    /// Creation timestamp.
    #[serde(default)]
    pub sys_created_on: Option<FieldValue>,

    /// Last update timestamp.
    #[serde(default)]
    pub sys_updated_on: Option<FieldValue>,
}

impl AssetRecord {
    /// Returns the sys_id, if present.
    pub fn sys_id(&self) -> Option<&str> {
        value_of(&self.sys_id)
    }

    /// Returns the asset tag, if present.
    pub fn asset_tag(&self) -> Option<&str> {
        value_of(&self.asset_tag)
    }

    /// Returns the display name, falling back to asset tag or sys_id.
    pub fn display_name(&self) -> &str {
        display_of(&self.display_name)
            .or_else(|| self.asset_tag())
            .or_else(|| self.sys_id())
            .unwrap_or("(unnamed)")
    }

    /// Returns the model display name.
    pub fn model(&self) -> Option<&str> {
        display_of(&self.model)
    }

    /// Returns the model category display name.
    pub fn model_category(&self) -> Option<&str> {
        display_of(&self.model_category)
    }

    /// Returns the serial number.
    pub fn serial_number(&self) -> Option<&str> {
        value_of(&self.serial_number)
    }

    /// Returns the install status display value.
    pub fn install_status(&self) -> Option<&str> {
        display_of(&self.install_status)
    }

    /// Returns the substatus display value.
    pub fn substatus(&self) -> Option<&str> {
        display_of(&self.substatus)
    }

    /// Returns the assigned user's display name.
    pub fn assigned_to(&self) -> Option<&str> {
        display_of(&self.assigned_to)
    }

    /// Returns the department display name.
    pub fn department(&self) -> Option<&str> {
        display_of(&self.department)
    }

    /// Returns the location display name.
    pub fn location(&self) -> Option<&str> {
        display_of(&self.location)
    }

    /// Returns the parsed purchase cost.
    pub fn cost(&self) -> Option<f64> {
        f64_of(&self.cost)
    }

    /// Returns the parsed purchase date.
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        date_of(&self.purchase_date)
    }

    /// Returns the parsed install date.
    pub fn install_date(&self) -> Option<NaiveDate> {
        date_of(&self.install_date)
    }

    /// Returns the parsed retirement date.
    pub fn retired_date(&self) -> Option<NaiveDate> {
        date_of(&self.retired_date)
    }

    /// Returns the parsed last-update date.
    pub fn updated_on(&self) -> Option<NaiveDate> {
        date_of(&self.sys_updated_on)
    }

    /// Maps the install status to a human-readable lifecycle stage.
    pub fn lifecycle_stage(&self) -> &str {
        lifecycle_stage(self.install_status().unwrap_or(""))
    }

    /// Days the asset has spent in its current stage, approximated from
    /// the last update timestamp.
    pub fn days_in_stage(&self, today: NaiveDate) -> Option<i64> {
        self.updated_on().map(|d| (today - d).num_days())
    }
}

/// Maps a ServiceNow install status to a lifecycle stage name.
///
/// Unknown statuses pass through unchanged (or "Unknown" when empty).
pub fn lifecycle_stage(install_status: &str) -> &str {
    match install_status {
        "On order" => "Procurement",
        "In stock" => "Received/Stocked",
        "In transit" => "In Transit",
        "Installed" | "In use" => "Active/Deployed",
        "In maintenance" => "Maintenance",
        "Retired" => "Retired",
        "Missing" | "Absent" => "Missing",
        "Disposed" => "Disposed",
        "" => "Unknown",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_stage_mapping() {
        assert_eq!(lifecycle_stage("In use"), "Active/Deployed");
        assert_eq!(lifecycle_stage("Installed"), "Active/Deployed");
        assert_eq!(lifecycle_stage("On order"), "Procurement");
        assert_eq!(lifecycle_stage("In stock"), "Received/Stocked");
        assert_eq!(lifecycle_stage("Retired"), "Retired");
        assert_eq!(lifecycle_stage("Absent"), "Missing");
        assert_eq!(lifecycle_stage(""), "Unknown");
    }

    #[test]
    fn test_lifecycle_stage_passthrough() {
        assert_eq!(lifecycle_stage("Quarantined"), "Quarantined");
    }

    #[test]
    fn test_days_in_stage() {
        let asset: AssetRecord =
            serde_json::from_str(r#"{"sys_updated_on": "2026-08-01 12:00:00"}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(asset.days_in_stage(today), Some(29));
    }

    #[test]
    fn test_lifecycle_stage_accessor() {
        let asset: AssetRecord =
            serde_json::from_str(r#"{"install_status": "In use"}"#).unwrap();
        assert_eq!(asset.lifecycle_stage(), "Active/Deployed");
    }
}

//! Hardware asset model for the `alm_hardware` table.

use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{date_of, display_of, f64_of, value_of, FieldValue};

/// A record from the `alm_hardware` table.
///
/// Every field is optional so partially-populated rows deserialize
/// without errors; accessors parse the typed values on demand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HardwareAsset {
    /// Opaque record identity, assigned by the instance.
    #[serde(default)]
    pub sys_id: Option<FieldValue>,

    /// Asset tag (e.g., `P1000001`).
    #[serde(default)]
    pub asset_tag: Option<FieldValue>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<FieldValue>,

    /// Hardware model (reference field).
    #[serde(default)]
    pub model: Option<FieldValue>,

    /// Model category (e.g., "Computer", "Server").
    #[serde(default)]
    pub model_category: Option<FieldValue>,

    /// Manufacturer serial number.
    #[serde(default)]
    pub serial_number: Option<FieldValue>,

    /// Assigned user (reference field).
    #[serde(default)]
    pub assigned_to: Option<FieldValue>,

    /// Owning department (reference field).
    #[serde(default)]
    pub department: Option<FieldValue>,

    /// Location (reference field).
    #[serde(default)]
    pub location: Option<FieldValue>,

    /// Install status (e.g., "In use", "Retired").
    #[serde(default)]
    pub install_status: Option<FieldValue>,

    /// Substatus within the install status.
    #[serde(default)]
    pub substatus: Option<FieldValue>,

    /// Purchase cost.
    #[serde(default)]
    pub cost: Option<FieldValue>,

    /// Purchase date.
    #[serde(default)]
    pub purchase_date: Option<FieldValue>,

    /// Warranty expiration date.
    #[serde(default)]
    pub warranty_expiration: Option<FieldValue>,

    /// Linked configuration item (reference to `cmdb_ci`).
    #[serde(default)]
    pub ci: Option<FieldValue>,

    /// Last update timestamp.
    #[serde(default)]
    pub sys_updated_on: Option<FieldValue>,
}

impl HardwareAsset {
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

    /// Returns the assigned user's display name, if any.
    pub fn assigned_to(&self) -> Option<&str> {
        display_of(&self.assigned_to)
    }

    /// Returns the install status display value.
    pub fn install_status(&self) -> Option<&str> {
        display_of(&self.install_status)
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

    /// Returns the parsed warranty expiration date.
    pub fn warranty_expiration(&self) -> Option<NaiveDate> {
        date_of(&self.warranty_expiration)
    }

    /// Returns the sys_id of the linked configuration item, if any.
    pub fn ci_sys_id(&self) -> Option<&str> {
        value_of(&self.ci)
    }

    /// Returns the parsed last-update date.
    pub fn updated_on(&self) -> Option<NaiveDate> {
        date_of(&self.sys_updated_on)
    }

    /// True when the asset has no assigned user.
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to().is_none()
    }
}

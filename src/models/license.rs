//! Software license model for the `alm_license` table.

use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{date_of, display_of, f64_of, i64_of, value_of, FieldValue};

/// A record from the `alm_license` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoftwareLicense {
    /// Opaque record identity.
    #[serde(default)]
    pub sys_id: Option<FieldValue>,

    /// Asset tag.
    #[serde(default)]
    pub asset_tag: Option<FieldValue>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<FieldValue>,

    /// Licensed product (reference to the software model).
    #[serde(default)]
    pub software_model: Option<FieldValue>,

    /// Vendor (reference field).
    #[serde(default)]
    pub vendor: Option<FieldValue>,

    /// Total purchased seats (entitlements).
    #[serde(default)]
    pub rights: Option<FieldValue>,

    /// Seats currently allocated/installed.
    #[serde(default)]
    pub allocated: Option<FieldValue>,

    /// License cost.
    #[serde(default)]
    pub cost: Option<FieldValue>,

    /// Coverage start date.
    #[serde(default)]
    pub start_date: Option<FieldValue>,

    /// Coverage end date.
    #[serde(default)]
    pub end_date: Option<FieldValue>,

    /// Last update timestamp.
    #[serde(default)]
    pub sys_updated_on: Option<FieldValue>,
}

impl SoftwareLicense {
    /// Returns the sys_id, if present.
    pub fn sys_id(&self) -> Option<&str> {
        value_of(&self.sys_id)
    }

    /// Returns the product display name.
    pub fn product(&self) -> Option<&str> {
        display_of(&self.software_model)
    }

    /// Returns the vendor display name.
    pub fn vendor(&self) -> Option<&str> {
        display_of(&self.vendor)
    }

    /// Total purchased seats; missing or unparseable counts as 0.
    pub fn rights(&self) -> i64 {
        i64_of(&self.rights).unwrap_or(0)
    }

    /// Allocated seats; missing or unparseable counts as 0.
    pub fn allocated(&self) -> i64 {
        i64_of(&self.allocated).unwrap_or(0)
    }

    /// Returns the parsed license cost.
    pub fn cost(&self) -> Option<f64> {
        f64_of(&self.cost)
    }

    /// Returns the parsed coverage end date.
    pub fn end_date(&self) -> Option<NaiveDate> {
        date_of(&self.end_date)
    }

    /// Seat utilization as a percentage, or 0 when no seats are owned.
    pub fn utilization_pct(&self) -> f64 {
        let rights = self.rights();
        if rights <= 0 {
            return 0.0;
        }
        (self.allocated() as f64 / rights as f64) * 100.0
    }
}

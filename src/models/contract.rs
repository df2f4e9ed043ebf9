//! Contract model for the `ast_contract` table.

use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{date_of, display_of, f64_of, value_of, FieldValue};

/// A record from the `ast_contract` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contract {
    /// Opaque record identity.
    #[serde(default)]
    pub sys_id: Option<FieldValue>,

    /// Contract number.
    #[serde(default)]
    pub number: Option<FieldValue>,

    /// Short description.
    #[serde(default)]
    pub short_description: Option<FieldValue>,

    /// Vendor (reference field).
    #[serde(default)]
    pub vendor: Option<FieldValue>,

    /// Contract state (e.g., "active", "expired").
    #[serde(default)]
    pub state: Option<FieldValue>,

    /// Start date.
    #[serde(default)]
    pub starts: Option<FieldValue>,

    /// End date.
    #[serde(default)]
    pub ends: Option<FieldValue>,

    /// Total contract cost.
    #[serde(default)]
    pub cost: Option<FieldValue>,

    /// Recurring payment amount.
    #[serde(default)]
    pub payment_amount: Option<FieldValue>,

    /// Last update timestamp.
    #[serde(default)]
    pub sys_updated_on: Option<FieldValue>,
}

impl Contract {
    /// Returns the sys_id, if present.
    pub fn sys_id(&self) -> Option<&str> {
        value_of(&self.sys_id)
    }

    /// Returns the contract number, falling back to sys_id.
    pub fn number(&self) -> &str {
        value_of(&self.number)
            .or_else(|| self.sys_id())
            .unwrap_or("(unknown)")
    }

    /// Returns the short description.
    pub fn short_description(&self) -> Option<&str> {
        display_of(&self.short_description)
    }

    /// Returns the vendor display name.
    pub fn vendor(&self) -> Option<&str> {
        display_of(&self.vendor)
    }

    /// Returns the state display value.
    pub fn state(&self) -> Option<&str> {
        display_of(&self.state)
    }

    /// Returns the parsed end date.
    pub fn ends(&self) -> Option<NaiveDate> {
        date_of(&self.ends)
    }

    /// Returns the parsed total cost.
    pub fn cost(&self) -> Option<f64> {
        f64_of(&self.cost)
    }

    /// Days until the contract ends, relative to `today`.
    ///
    /// Negative when already expired; `None` when no end date is set.
    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.ends().map(|ends| (ends - today).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_remaining() {
        let contract: Contract =
            serde_json::from_str(r#"{"ends": "2026-09-29"}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(contract.days_remaining(today), Some(30));
    }

    #[test]
    fn test_days_remaining_expired_is_negative() {
        let contract: Contract =
            serde_json::from_str(r#"{"ends": "2026-08-20"}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(contract.days_remaining(today), Some(-10));
    }

    #[test]
    fn test_days_remaining_no_end_date() {
        let contract: Contract = serde_json::from_str("{}").unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(contract.days_remaining(today), None);
    }

    #[test]
    fn test_number_fallback() {
        let contract: Contract = serde_json::from_str("{}").unwrap();
        assert_eq!(contract.number(), "(unknown)");
    }
}

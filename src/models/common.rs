//! Common types shared across ServiceNow table models.
//!
//! This module defines `FieldValue`, the dual representation of Table API
//! fields, plus the parse helpers the record models build on.
//!
//! With `sysparm_display_value=all` the instance returns every field as a
//! `{"display_value": ..., "value": ...}` object; with the default setting
//! plain fields arrive as bare strings and reference fields as
//! `{"link": ..., "value": ...}` objects. `FieldValue` absorbs all three
//! shapes so the record models don't have to care which mode produced a row.

use chrono::NaiveDate;
use serde::Deserialize;

/// A single field from a Table API row.
///
/// ServiceNow serializes fields either as a bare string or as an object
/// carrying the raw `value` alongside a human-readable `display_value`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Bare string form (`sysparm_display_value=false` plain fields).
    Text(String),
    /// Object form with raw value and/or display value.
    Reference {
        /// Human-readable rendering of the field.
        #[serde(default)]
        display_value: Option<String>,
        /// Raw stored value (sys_id for reference fields).
        #[serde(default)]
        value: Option<String>,
        /// REST link to the referenced record, when present.
        #[serde(default)]
        link: Option<String>,
    },
}

impl FieldValue {
    /// Returns the human-readable rendering, falling back to the raw value.
    ///
    /// Empty strings (ServiceNow's encoding of "no value") map to `None`.
    pub fn display(&self) -> Option<&str> {
        let s = match self {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Reference {
                display_value,
                value,
                ..
            } => display_value
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(value.as_deref())?,
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Returns the raw stored value, falling back to the display value.
    pub fn value(&self) -> Option<&str> {
        let s = match self {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Reference {
                display_value,
                value,
                ..
            } => value
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(display_value.as_deref())?,
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Parses the raw value as a float (costs, payment amounts).
    pub fn as_f64(&self) -> Option<f64> {
        self.value()?.trim().parse::<f64>().ok()
    }

    /// Parses the raw value as an integer (seat counts).
    ///
    /// Goes through `f64` first because the instance sometimes serializes
    /// integers as `"5.0"`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|f| f as i64)
    }

    /// Parses the raw value as a calendar date.
    ///
    /// ServiceNow date and datetime fields both start with `YYYY-MM-DD`;
    /// any time-of-day suffix is ignored.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let s = self.value()?;
        let prefix = s.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// Display rendering of an optional field.
pub(crate) fn display_of(field: &Option<FieldValue>) -> Option<&str> {
    field.as_ref().and_then(FieldValue::display)
}

/// Raw value of an optional field.
pub(crate) fn value_of(field: &Option<FieldValue>) -> Option<&str> {
    field.as_ref().and_then(FieldValue::value)
}

/// Float parse of an optional field.
pub(crate) fn f64_of(field: &Option<FieldValue>) -> Option<f64> {
    field.as_ref().and_then(FieldValue::as_f64)
}

/// Integer parse of an optional field.
pub(crate) fn i64_of(field: &Option<FieldValue>) -> Option<i64> {
    field.as_ref().and_then(FieldValue::as_i64)
}

/// Date parse of an optional field.
pub(crate) fn date_of(field: &Option<FieldValue>) -> Option<NaiveDate> {
    field.as_ref().and_then(FieldValue::as_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(display: &str, value: &str) -> FieldValue {
        FieldValue::Reference {
            display_value: Some(display.to_string()),
            value: Some(value.to_string()),
            link: None,
        }
    }

    #[test]
    fn test_text_field() {
        let f = FieldValue::Text("Dell Latitude".to_string());
        assert_eq!(f.display(), Some("Dell Latitude"));
        assert_eq!(f.value(), Some("Dell Latitude"));
    }

    #[test]
    fn test_empty_text_is_none() {
        let f = FieldValue::Text(String::new());
        assert_eq!(f.display(), None);
        assert_eq!(f.value(), None);
    }

    #[test]
    fn test_reference_field() {
        let f = reference("Dell Latitude 7440", "00a9e80d3790200044e0bfc8bcbe5d79");
        assert_eq!(f.display(), Some("Dell Latitude 7440"));
        assert_eq!(f.value(), Some("00a9e80d3790200044e0bfc8bcbe5d79"));
    }

    #[test]
    fn test_reference_falls_back_to_value() {
        let f = FieldValue::Reference {
            display_value: None,
            value: Some("abc123".to_string()),
            link: None,
        };
        assert_eq!(f.display(), Some("abc123"));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(FieldValue::Text("1500.50".to_string()).as_f64(), Some(1500.5));
        assert_eq!(FieldValue::Text("not a number".to_string()).as_f64(), None);
        assert_eq!(FieldValue::Text(String::new()).as_f64(), None);
    }

    #[test]
    fn test_as_i64_handles_float_encoding() {
        assert_eq!(FieldValue::Text("5.0".to_string()).as_i64(), Some(5));
        assert_eq!(FieldValue::Text("50".to_string()).as_i64(), Some(50));
    }

    #[test]
    fn test_as_date() {
        let f = FieldValue::Text("2024-03-15".to_string());
        assert_eq!(f.as_date(), Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
    }

    #[test]
    fn test_as_date_strips_time_suffix() {
        let f = FieldValue::Text("2024-03-15 08:30:00".to_string());
        assert_eq!(f.as_date(), Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
    }

    #[test]
    fn test_as_date_invalid() {
        assert_eq!(FieldValue::Text("soon".to_string()).as_date(), None);
    }

    #[test]
    fn test_deserialize_both_shapes() {
        let plain: FieldValue = serde_json::from_str(r#""PC-001""#).unwrap();
        assert_eq!(plain.value(), Some("PC-001"));

        let object: FieldValue = serde_json::from_str(
            r#"{"display_value": "Computer", "value": "comp_cat"}"#,
        )
        .unwrap();
        assert_eq!(object.display(), Some("Computer"));
        assert_eq!(object.value(), Some("comp_cat"));

        let link: FieldValue = serde_json::from_str(
            r#"{"link": "https://x/api/now/table/cmdb_ci/abc", "value": "abc"}"#,
        )
        .unwrap();
        assert_eq!(link.value(), Some("abc"));
    }
}

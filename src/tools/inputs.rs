//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Input parameters for the query_hardware_assets tool.
///
/// All fields are optional - use them to filter the results.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QueryHardwareAssetsInput {
    /// Filter by install status (e.g., "In use", "In stock", "Retired").
    #[serde(default)]
    pub status: Option<String>,

    /// Filter by department name.
    #[serde(default)]
    pub department: Option<String>,

    /// Filter by model name (substring match).
    #[serde(default)]
    pub model: Option<String>,

    /// Filter by model category (e.g., "Computer", "Server").
    #[serde(default)]
    pub model_category: Option<String>,

    /// Filter by assigned user name (substring match).
    #[serde(default)]
    pub assigned_to: Option<String>,

    /// Filter by location name (substring match).
    #[serde(default)]
    pub location: Option<String>,

    /// Maximum number of assets to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl QueryHardwareAssetsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            status: trim_option(&self.status),
            department: trim_option(&self.department),
            model: trim_option(&self.model),
            model_category: trim_option(&self.model_category),
            assigned_to: trim_option(&self.assigned_to),
            location: trim_option(&self.location),
            limit: self.limit,
        }
    }
}

/// Input parameters for the query_software_licenses tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QuerySoftwareLicensesInput {
    /// Filter by vendor name (substring match).
    #[serde(default)]
    pub vendor: Option<String>,

    /// Filter by licensed product name (substring match).
    #[serde(default)]
    pub product: Option<String>,

    /// Only return licenses whose coverage ends within this many days.
    #[serde(default)]
    pub expiring_within_days: Option<u32>,

    /// Maximum number of licenses to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl QuerySoftwareLicensesInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            vendor: trim_option(&self.vendor),
            product: trim_option(&self.product),
            expiring_within_days: self.expiring_within_days,
            limit: self.limit,
        }
    }
}

/// Input parameters for the get_asset_details tool.
///
/// Provide either sys_id or asset_tag.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetAssetDetailsInput {
    /// The 32-character sys_id of the asset.
    #[serde(default)]
    pub sys_id: Option<String>,

    /// The asset tag (e.g., "P1000001"). Used when sys_id is not given.
    #[serde(default)]
    pub asset_tag: Option<String>,
}

impl GetAssetDetailsInput {
    /// Returns true if at least one identifier is set.
    pub fn has_identifier(&self) -> bool {
        self.sys_id.is_some() || self.asset_tag.is_some()
    }

    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            sys_id: trim_option(&self.sys_id),
            asset_tag: trim_option(&self.asset_tag),
        }
    }
}

/// Input parameters for the get_asset_lifecycle tool.
///
/// Provide either sys_id or asset_tag.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetAssetLifecycleInput {
    /// The 32-character sys_id of the asset.
    #[serde(default)]
    pub sys_id: Option<String>,

    /// The asset tag. Used when sys_id is not given.
    #[serde(default)]
    pub asset_tag: Option<String>,
}

impl GetAssetLifecycleInput {
    /// Returns true if at least one identifier is set.
    pub fn has_identifier(&self) -> bool {
        self.sys_id.is_some() || self.asset_tag.is_some()
    }

    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            sys_id: trim_option(&self.sys_id),
            asset_tag: trim_option(&self.asset_tag),
        }
    }
}

/// Input parameters for the get_asset_contracts tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetAssetContractsInput {
    /// Limit to contracts covering this asset (32-character sys_id).
    #[serde(default)]
    pub asset_sys_id: Option<String>,

    /// Filter by vendor name (substring match).
    #[serde(default)]
    pub vendor: Option<String>,

    /// Filter by contract state (e.g., "active", "expired").
    #[serde(default)]
    pub state: Option<String>,

    /// Maximum number of contracts to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl GetAssetContractsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            asset_sys_id: trim_option(&self.asset_sys_id),
            vendor: trim_option(&self.vendor),
            state: trim_option(&self.state),
            limit: self.limit,
        }
    }
}

/// Input parameters for the calculate_asset_costs tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CalculateAssetCostsInput {
    /// Scope to a department.
    #[serde(default)]
    pub department: Option<String>,

    /// Scope to a model category.
    #[serde(default)]
    pub model_category: Option<String>,

    /// Maximum number of assets to examine (default: 200, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl CalculateAssetCostsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            department: trim_option(&self.department),
            model_category: trim_option(&self.model_category),
            limit: self.limit,
        }
    }
}

/// Input parameters for the check_license_compliance tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CheckLicenseComplianceInput {
    /// Filter by licensed product name (substring match).
    #[serde(default)]
    pub product: Option<String>,

    /// Filter by vendor name (substring match).
    #[serde(default)]
    pub vendor: Option<String>,

    /// Maximum number of licenses to examine (default: 100, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl CheckLicenseComplianceInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            product: trim_option(&self.product),
            vendor: trim_option(&self.vendor),
            limit: self.limit,
        }
    }
}

/// Input parameters for the get_license_utilization tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetLicenseUtilizationInput {
    /// Filter by licensed product name (substring match).
    #[serde(default)]
    pub product: Option<String>,

    /// Filter by vendor name (substring match).
    #[serde(default)]
    pub vendor: Option<String>,

    /// Maximum number of licenses to examine (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl GetLicenseUtilizationInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            product: trim_option(&self.product),
            vendor: trim_option(&self.vendor),
            limit: self.limit,
        }
    }
}

/// Input parameters for the track_asset_depreciation tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TrackAssetDepreciationInput {
    /// Scope to a model category.
    #[serde(default)]
    pub model_category: Option<String>,

    /// Override the useful life in years (default: by category;
    /// Computer=3, Server=5, Network Gear=5, otherwise 4).
    #[serde(default)]
    pub useful_life_years: Option<u32>,

    /// Maximum number of assets to examine (default: 100, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl TrackAssetDepreciationInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            model_category: trim_option(&self.model_category),
            useful_life_years: self.useful_life_years,
            limit: self.limit,
        }
    }
}

/// Input parameters for the find_underutilized_assets tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FindUnderutilizedAssetsInput {
    /// Flag in-use assets not updated within this many days (default: 90).
    #[serde(default)]
    pub days_threshold: Option<u32>,

    /// Maximum number of assets to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl FindUnderutilizedAssetsInput {
    /// No string fields; sanitize is a no-op kept for uniformity.
    #[must_use]
    pub fn sanitize(self) -> Self {
        self
    }
}

/// Input parameters for the find_expiring_warranties tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FindExpiringWarrantiesInput {
    /// Look this many days ahead (default: 90).
    #[serde(default)]
    pub days_ahead: Option<u32>,

    /// If true, also include warranties that expired in the last 30 days.
    #[serde(default)]
    pub include_expired: Option<bool>,

    /// Maximum number of assets to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl FindExpiringWarrantiesInput {
    /// No string fields; sanitize is a no-op kept for uniformity.
    #[must_use]
    pub fn sanitize(self) -> Self {
        self
    }
}

/// Input parameters for the find_expiring_contracts tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FindExpiringContractsInput {
    /// Look this many days ahead (default: 90).
    #[serde(default)]
    pub days_ahead: Option<u32>,

    /// Filter by vendor name (substring match).
    #[serde(default)]
    pub vendor: Option<String>,

    /// If true, also include contracts that expired in the last 30 days.
    #[serde(default)]
    pub include_expired: Option<bool>,

    /// Maximum number of contracts to return (default: 50, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl FindExpiringContractsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            days_ahead: self.days_ahead,
            vendor: trim_option(&self.vendor),
            include_expired: self.include_expired,
            limit: self.limit,
        }
    }
}

/// Input parameters for the reconcile_assets_to_cis tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ReconcileAssetsInput {
    /// Scope to a model category.
    #[serde(default)]
    pub model_category: Option<String>,

    /// If explicitly true, write a reconciliation status onto each
    /// orphaned asset record. Off by default; this is the only tool
    /// that modifies the instance.
    #[serde(default)]
    pub update_status: Option<bool>,

    /// Maximum number of records to examine per table (default: 200, max: 500).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ReconcileAssetsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            model_category: trim_option(&self.model_category),
            update_status: self.update_status,
            limit: self.limit,
        }
    }
}

/// Input parameters for the get_asset_health_metrics tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetAssetHealthMetricsInput {
    /// Scope to a location (substring match).
    #[serde(default)]
    pub location: Option<String>,

    /// Scope to a model category.
    #[serde(default)]
    pub model_category: Option<String>,
}

impl GetAssetHealthMetricsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            location: trim_option(&self.location),
            model_category: trim_option(&self.model_category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Sanitization tests
    // ========================================================================

    #[test]
    fn test_trim_option_trims_whitespace() {
        let s = Some("  hello  ".to_string());
        assert_eq!(trim_option(&s), Some("hello".to_string()));
    }

    #[test]
    fn test_trim_option_filters_empty() {
        let s = Some("   ".to_string());
        assert_eq!(trim_option(&s), None);
    }

    #[test]
    fn test_trim_option_none_stays_none() {
        let s: Option<String> = None;
        assert_eq!(trim_option(&s), None);
    }

    #[test]
    fn test_query_hardware_input_sanitize() {
        let input = QueryHardwareAssetsInput {
            status: Some("  In use  ".to_string()),
            department: Some("".to_string()),
            assigned_to: Some("  Jane Smith  ".to_string()),
            limit: Some(10),
            ..Default::default()
        };
        let sanitized = input.sanitize();
        assert_eq!(sanitized.status, Some("In use".to_string()));
        assert_eq!(sanitized.department, None); // Empty string becomes None
        assert_eq!(sanitized.assigned_to, Some("Jane Smith".to_string()));
        assert_eq!(sanitized.limit, Some(10));
    }

    #[test]
    fn test_get_asset_details_input_sanitize() {
        let input = GetAssetDetailsInput {
            sys_id: Some("  00a9e80d3790200044e0bfc8bcbe5d79  ".to_string()),
            asset_tag: None,
        };
        let sanitized = input.sanitize();
        assert_eq!(
            sanitized.sys_id,
            Some("00a9e80d3790200044e0bfc8bcbe5d79".to_string())
        );
    }

    #[test]
    fn test_get_asset_details_has_identifier() {
        let input = GetAssetDetailsInput::default();
        assert!(!input.has_identifier());

        let input = GetAssetDetailsInput {
            asset_tag: Some("P1000001".to_string()),
            ..Default::default()
        };
        assert!(input.has_identifier());
    }

    // ========================================================================
    // Deserialization tests
    // ========================================================================

    #[test]
    fn test_query_hardware_input_deserialize_empty() {
        let json = "{}";
        let input: QueryHardwareAssetsInput = serde_json::from_str(json).unwrap();
        assert!(input.status.is_none());
        assert!(input.limit.is_none());
    }

    #[test]
    fn test_query_hardware_input_deserialize_with_filters() {
        let json = r#"{"status": "In use", "model_category": "Computer", "limit": 25}"#;
        let input: QueryHardwareAssetsInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.status.as_deref(), Some("In use"));
        assert_eq!(input.model_category.as_deref(), Some("Computer"));
        assert_eq!(input.limit, Some(25));
    }

    #[test]
    fn test_query_licenses_input_deserialize() {
        let json = r#"{"vendor": "Microsoft", "expiring_within_days": 60}"#;
        let input: QuerySoftwareLicensesInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.vendor.as_deref(), Some("Microsoft"));
        assert_eq!(input.expiring_within_days, Some(60));
    }

    #[test]
    fn test_depreciation_input_deserialize() {
        let json = r#"{"model_category": "Server", "useful_life_years": 7}"#;
        let input: TrackAssetDepreciationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.model_category.as_deref(), Some("Server"));
        assert_eq!(input.useful_life_years, Some(7));
    }

    #[test]
    fn test_expiring_contracts_input_deserialize() {
        let json = r#"{"days_ahead": 60, "include_expired": true}"#;
        let input: FindExpiringContractsInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.days_ahead, Some(60));
        assert_eq!(input.include_expired, Some(true));
        assert!(input.vendor.is_none());
    }

    #[test]
    fn test_reconcile_input_update_defaults_off() {
        let json = r#"{"model_category": "Computer"}"#;
        let input: ReconcileAssetsInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.update_status, None);
    }

    #[test]
    fn test_health_metrics_input_deserialize() {
        let json = r#"{"location": "Copenhagen"}"#;
        let input: GetAssetHealthMetricsInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.location.as_deref(), Some("Copenhagen"));
        assert!(input.model_category.is_none());
    }
}

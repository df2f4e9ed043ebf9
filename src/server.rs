//! MCP server implementation for Amber.
//!
//! This module defines the `AmberServer` struct that implements the MCP
//! `ServerHandler` trait, exposing ServiceNow asset-management operations
//! as tools.

use chrono::{Duration as ChronoDuration, NaiveDate};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};

use crate::error::AmberError;
use crate::models::{
    age_in_years, straight_line_book_value, useful_life_years, AssetRecord, ComplianceEntry,
    ComplianceStatus, ComplianceSummary, ConfigurationItem, Contract, DepreciationEntry,
    HardwareAsset, HealthMetrics, MatchBasis, ReconciliationMatch, ReconciliationReport,
    SoftwareLicense, Urgency, UtilizationEntry,
};
use crate::snow_client::{SnowClient, SnowQuery, Table};
use crate::tools::{
    CalculateAssetCostsInput, CheckLicenseComplianceInput, FindExpiringContractsInput,
    FindExpiringWarrantiesInput, FindUnderutilizedAssetsInput, GetAssetContractsInput,
    GetAssetDetailsInput, GetAssetHealthMetricsInput, GetAssetLifecycleInput,
    GetLicenseUtilizationInput, QueryHardwareAssetsInput, QuerySoftwareLicensesInput,
    ReconcileAssetsInput, TrackAssetDepreciationInput,
};

/// Default row limit for list-style queries.
const DEFAULT_QUERY_LIMIT: u32 = 50;

/// Default row limit for the compliance scan.
const DEFAULT_COMPLIANCE_LIMIT: u32 = 100;

/// Default row limit for cost aggregation.
const DEFAULT_COST_LIMIT: u32 = 200;

/// Default row limit for the depreciation scan.
const DEFAULT_DEPRECIATION_LIMIT: u32 = 100;

/// Default per-table row limit for reconciliation.
const DEFAULT_RECONCILE_LIMIT: u32 = 200;

/// Row limit for the health-metrics scans.
const HEALTH_SCAN_LIMIT: u32 = 500;

/// Days of history included when `include_expired` is set.
const EXPIRED_LOOKBACK_DAYS: i64 = 30;

/// Maximum entries printed per list section in reconciliation output.
const MAX_LISTED_ITEMS: usize = 25;

/// The Amber MCP server.
///
/// This server exposes ServiceNow IT Asset Management operations as MCP
/// tools.
#[derive(Clone)]
pub struct AmberServer {
    /// ServiceNow client for Table API operations.
    snow_client: SnowClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AmberServer {
    /// Creates a new Amber server instance.
    ///
    /// # Arguments
    ///
    /// * `snow_client` - The ServiceNow client for Table API operations
    pub fn new(snow_client: SnowClient) -> Self {
        Self {
            snow_client,
            tool_router: Self::tool_router(),
        }
    }

    /// Verify connectivity and credentials against the instance.
    ///
    /// Performs a lightweight authenticated round-trip and reports the
    /// elapsed time. Fails when the instance is unreachable or the
    /// credentials are rejected.
    #[tool(description = "Check that the Amber MCP server can reach the ServiceNow instance with valid credentials. Reports server version, instance, and response time.")]
    async fn health_check(&self) -> Result<String, String> {
        tracing::debug!("health_check tool called");

        let ping = self.snow_client.ping().await;
        if ping.ok {
            Ok(format!(
                "{} v{} - healthy\nInstance: {}\nResponse time: {} ms",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.snow_client.base_url(),
                ping.response_time.as_millis()
            ))
        } else {
            let detail = ping.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::error!(error = %detail, "Health check failed");
            Err(format!(
                "{} v{} - unhealthy\nInstance: {}\nError: {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.snow_client.base_url(),
                detail
            ))
        }
    }

    /// Search hardware assets with optional filters.
    #[tool(description = "Search hardware assets (alm_hardware). Filter by status, department, model, model category, assigned user, or location. Returns asset tag, name, model, status, and assignee.")]
    async fn query_hardware_assets(
        &self,
        Parameters(input): Parameters<QueryHardwareAssetsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "query_hardware_assets tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(status) = &input.status {
            query = query.eq("install_status", status);
        }
        if let Some(department) = &input.department {
            query = query.eq("department", department);
        }
        if let Some(model) = &input.model {
            query = query.like("model", model);
        }
        if let Some(category) = &input.model_category {
            query = query.eq("model_category", category);
        }
        if let Some(assigned_to) = &input.assigned_to {
            query = query.like("assigned_to", assigned_to);
        }
        if let Some(location) = &input.location {
            query = query.like("location", location);
        }

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Hardware, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to query hardware assets");
                format!("Failed to query hardware assets: {}", sanitized)
            })?;

        let assets: Vec<HardwareAsset> = self.parse_rows(rows, "hardware assets")?;
        Ok(format_hardware_list(&assets))
    }

    /// Search software licenses with optional filters.
    #[tool(description = "Search software licenses (alm_license). Filter by vendor, product, or coverage ending within a number of days. Returns product, vendor, seat counts, and end date.")]
    async fn query_software_licenses(
        &self,
        Parameters(input): Parameters<QuerySoftwareLicensesInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "query_software_licenses tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(vendor) = &input.vendor {
            query = query.like("vendor", vendor);
        }
        if let Some(product) = &input.product {
            query = query.like("software_model", product);
        }
        if let Some(days) = input.expiring_within_days {
            if days == 0 {
                return Err("expiring_within_days must be >= 1.".to_string());
            }
            let today = today();
            let future = today + ChronoDuration::days(i64::from(days));
            query = query
                .ge("end_date", today.to_string())
                .le("end_date", future.to_string());
        }

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::License, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to query software licenses");
                format!("Failed to query software licenses: {}", sanitized)
            })?;

        let licenses: Vec<SoftwareLicense> = self.parse_rows(rows, "software licenses")?;
        Ok(format_license_list(&licenses))
    }

    /// Get the full record for a single asset.
    ///
    /// Looks up the base asset table, so it works for hardware,
    /// software, and every other asset class.
    #[tool(description = "Get full details of a single asset (alm_asset) by sys_id or asset_tag. One of the two identifiers is required.")]
    async fn get_asset_details(
        &self,
        Parameters(input): Parameters<GetAssetDetailsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "get_asset_details tool called");

        if !input.has_identifier() {
            return Err("Provide either sys_id or asset_tag.".to_string());
        }

        let asset = self
            .fetch_asset(input.sys_id.as_deref(), input.asset_tag.as_deref())
            .await?;
        Ok(format_asset_details(&asset))
    }

    /// Get lifecycle stage information for an asset.
    #[tool(description = "Get the lifecycle stage of an asset (Procurement, Active/Deployed, Retired, ...) and how many days it has been in that stage. Identify the asset by sys_id or asset_tag.")]
    async fn get_asset_lifecycle(
        &self,
        Parameters(input): Parameters<GetAssetLifecycleInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "get_asset_lifecycle tool called");

        if !input.has_identifier() {
            return Err("Provide either sys_id or asset_tag.".to_string());
        }

        let asset = self
            .fetch_asset(input.sys_id.as_deref(), input.asset_tag.as_deref())
            .await?;
        Ok(format_lifecycle(&asset, today()))
    }

    /// List contracts, optionally scoped to one asset.
    #[tool(description = "List contracts (ast_contract), optionally scoped to one asset by sys_id, or filtered by vendor or state. Returns number, vendor, state, end date, and cost.")]
    async fn get_asset_contracts(
        &self,
        Parameters(input): Parameters<GetAssetContractsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "get_asset_contracts tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(asset_sys_id) = &input.asset_sys_id {
            SnowClient::validate_sys_id(asset_sys_id, "asset_sys_id")
                .map_err(|e| e.to_string())?;
            query = query.eq("asset", asset_sys_id);
        }
        if let Some(vendor) = &input.vendor {
            query = query.like("vendor", vendor);
        }
        if let Some(state) = &input.state {
            query = query.eq("state", state);
        }

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Contract, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to list contracts");
                format!("Failed to list contracts: {}", sanitized)
            })?;

        let contracts: Vec<Contract> = self.parse_rows(rows, "contracts")?;
        Ok(format_contract_list(&contracts, today()))
    }

    /// Calculate total cost of ownership for hardware assets.
    #[tool(description = "Calculate total cost of ownership for hardware assets, scoped by department or model category. TCO = purchase cost + estimated annual maintenance (15% of purchase).")]
    async fn calculate_asset_costs(
        &self,
        Parameters(input): Parameters<CalculateAssetCostsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "calculate_asset_costs tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(department) = &input.department {
            query = query.eq("department", department);
        }
        if let Some(category) = &input.model_category {
            query = query.eq("model_category", category);
        }

        let limit = input.limit.unwrap_or(DEFAULT_COST_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Hardware, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to calculate asset costs");
                format!("Failed to calculate asset costs: {}", sanitized)
            })?;

        let assets: Vec<HardwareAsset> = self.parse_rows(rows, "hardware assets")?;
        Ok(format_cost_report(&assets))
    }

    /// Classify license compliance by seats purchased vs. allocated.
    #[tool(description = "Check software license compliance. Classifies each license as compliant, under-licensed (more seats allocated than purchased), over-licensed (fewer than half the seats in use), or unknown.")]
    async fn check_license_compliance(
        &self,
        Parameters(input): Parameters<CheckLicenseComplianceInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "check_license_compliance tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(product) = &input.product {
            query = query.like("software_model", product);
        }
        if let Some(vendor) = &input.vendor {
            query = query.like("vendor", vendor);
        }

        let limit = input.limit.unwrap_or(DEFAULT_COMPLIANCE_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::License, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to check license compliance");
                format!("Failed to check license compliance: {}", sanitized)
            })?;

        let licenses: Vec<SoftwareLicense> = self.parse_rows(rows, "software licenses")?;

        let mut entries = Vec::with_capacity(licenses.len());
        let mut summary = ComplianceSummary::default();
        for license in &licenses {
            let rights = license.rights();
            let allocated = license.allocated();
            let (status, delta) = ComplianceStatus::classify(rights, allocated);
            summary.record(status);
            entries.push(ComplianceEntry {
                product: license.product().unwrap_or("(unknown product)").to_string(),
                rights,
                allocated,
                status,
                delta,
            });
        }

        Ok(format_compliance_report(&entries, &summary))
    }

    /// Report seat utilization per license, sorted by usage.
    #[tool(description = "Get license seat utilization (allocated / purchased) per license, sorted from highest to lowest utilization.")]
    async fn get_license_utilization(
        &self,
        Parameters(input): Parameters<GetLicenseUtilizationInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "get_license_utilization tool called");
        validate_limit(input.limit)?;

        let mut query = SnowQuery::new();
        if let Some(product) = &input.product {
            query = query.like("software_model", product);
        }
        if let Some(vendor) = &input.vendor {
            query = query.like("vendor", vendor);
        }

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::License, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to get license utilization");
                format!("Failed to get license utilization: {}", sanitized)
            })?;

        let licenses: Vec<SoftwareLicense> = self.parse_rows(rows, "software licenses")?;

        let mut entries: Vec<UtilizationEntry> = licenses
            .iter()
            .map(|license| UtilizationEntry {
                product: license.product().unwrap_or("(unknown product)").to_string(),
                rights: license.rights(),
                allocated: license.allocated(),
                utilization_pct: license.utilization_pct(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.utilization_pct
                .partial_cmp(&a.utilization_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(format_utilization_report(&entries))
    }

    /// Compute straight-line depreciation for hardware assets.
    #[tool(description = "Track straight-line depreciation of hardware assets. Useful life defaults per category (Computer=3y, Server=5y, Network Gear=5y, otherwise 4y) and can be overridden.")]
    async fn track_asset_depreciation(
        &self,
        Parameters(input): Parameters<TrackAssetDepreciationInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "track_asset_depreciation tool called");
        validate_limit(input.limit)?;
        if input.useful_life_years == Some(0) {
            return Err("useful_life_years must be >= 1.".to_string());
        }

        let mut query = SnowQuery::new();
        if let Some(category) = &input.model_category {
            query = query.eq("model_category", category);
        }

        let limit = input.limit.unwrap_or(DEFAULT_DEPRECIATION_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Hardware, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to track depreciation");
                format!("Failed to track depreciation: {}", sanitized)
            })?;

        let assets: Vec<HardwareAsset> = self.parse_rows(rows, "hardware assets")?;

        let today = today();
        let mut entries = Vec::new();
        for asset in &assets {
            let (Some(cost), Some(purchased)) = (asset.cost(), asset.purchase_date()) else {
                continue;
            };
            if cost <= 0.0 {
                continue;
            }
            let category = asset.model_category();
            let life = input
                .useful_life_years
                .map(f64::from)
                .unwrap_or_else(|| useful_life_years(category.unwrap_or("")));
            let age = age_in_years(purchased, today);
            let book_value = straight_line_book_value(cost, life, age);
            entries.push(DepreciationEntry {
                name: asset.display_name().to_string(),
                asset_tag: asset.asset_tag().map(str::to_string),
                category: category.map(str::to_string),
                purchase_cost: cost,
                useful_life_years: life,
                age_years: age,
                book_value,
                depreciated_amount: cost - book_value,
            });
        }

        Ok(format_depreciation_report(&entries))
    }

    /// Find in-use assets that look idle or unassigned.
    #[tool(description = "Find underutilized hardware: in-use assets not updated within a threshold of days, or marked in-use with no assigned user. Includes an estimated waste cost.")]
    async fn find_underutilized_assets(
        &self,
        Parameters(input): Parameters<FindUnderutilizedAssetsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "find_underutilized_assets tool called");
        validate_limit(input.limit)?;

        let days_threshold = input.days_threshold.unwrap_or(90);
        if days_threshold == 0 {
            return Err("days_threshold must be >= 1.".to_string());
        }

        let cutoff = today() - ChronoDuration::days(i64::from(days_threshold));
        let query = SnowQuery::new()
            .is_in("install_status", &["In use", "Installed"])
            .lt("sys_updated_on", cutoff.to_string());

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Hardware, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to find underutilized assets");
                format!("Failed to find underutilized assets: {}", sanitized)
            })?;

        let assets: Vec<HardwareAsset> = self.parse_rows(rows, "hardware assets")?;
        Ok(format_underutilized_report(&assets, days_threshold))
    }

    /// Find hardware warranties ending inside a window.
    #[tool(description = "Find hardware assets whose warranty expires within a number of days ahead (default 90). Optionally include warranties that already expired in the last 30 days.")]
    async fn find_expiring_warranties(
        &self,
        Parameters(input): Parameters<FindExpiringWarrantiesInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "find_expiring_warranties tool called");
        validate_limit(input.limit)?;

        let days_ahead = input.days_ahead.unwrap_or(90);
        if days_ahead == 0 {
            return Err("days_ahead must be >= 1.".to_string());
        }

        let today = today();
        let start = if input.include_expired == Some(true) {
            today - ChronoDuration::days(EXPIRED_LOOKBACK_DAYS)
        } else {
            today
        };
        let end = today + ChronoDuration::days(i64::from(days_ahead));

        // Closed interval on both ends.
        let query = SnowQuery::new()
            .ge("warranty_expiration", start.to_string())
            .le("warranty_expiration", end.to_string());

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Hardware, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to find expiring warranties");
                format!("Failed to find expiring warranties: {}", sanitized)
            })?;

        let mut assets: Vec<HardwareAsset> = self.parse_rows(rows, "hardware assets")?;
        assets.sort_by_key(|a| {
            a.warranty_expiration()
                .map(|d| (d - today).num_days())
                .unwrap_or(i64::MAX)
        });

        Ok(format_expiring_warranties(&assets, today))
    }

    /// Find contracts ending inside a window, bucketed by urgency.
    #[tool(description = "Find contracts expiring within a number of days ahead (default 90), sorted soonest first and bucketed by urgency (EXPIRED, CRITICAL <=30d, WARNING <=60d, NOTICE <=90d). Optionally include contracts expired in the last 30 days.")]
    async fn find_expiring_contracts(
        &self,
        Parameters(input): Parameters<FindExpiringContractsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "find_expiring_contracts tool called");
        validate_limit(input.limit)?;

        let days_ahead = input.days_ahead.unwrap_or(90);
        if days_ahead == 0 {
            return Err("days_ahead must be >= 1.".to_string());
        }

        let today = today();
        let start = if input.include_expired == Some(true) {
            today - ChronoDuration::days(EXPIRED_LOOKBACK_DAYS)
        } else {
            today
        };
        let end = today + ChronoDuration::days(i64::from(days_ahead));

        let mut query = SnowQuery::new()
            .ge("ends", start.to_string())
            .le("ends", end.to_string());
        if let Some(vendor) = &input.vendor {
            query = query.like("vendor", vendor);
        }

        let limit = input.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let rows = self
            .snow_client
            .get_records(Table::Contract, &query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to find expiring contracts");
                format!("Failed to find expiring contracts: {}", sanitized)
            })?;

        let mut contracts: Vec<Contract> = self.parse_rows(rows, "contracts")?;
        contracts.sort_by_key(|c| c.days_remaining(today).unwrap_or(i64::MAX));

        Ok(format_expiring_contracts(&contracts, today))
    }

    /// Reconcile hardware assets against CMDB configuration items.
    ///
    /// Matching tries the asset's CI reference first, then asset tag,
    /// then serial number. Writes happen only when `update_status` is
    /// explicitly true.
    #[tool(description = "Reconcile hardware assets (alm_hardware) against CMDB configuration items (cmdb_ci). Reports matched pairs, orphaned assets (no CI), and untracked CIs (no asset). Set update_status=true to stamp a reconciliation status on orphaned assets; read-only by default.")]
    async fn reconcile_assets_to_cis(
        &self,
        Parameters(input): Parameters<ReconcileAssetsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "reconcile_assets_to_cis tool called");
        validate_limit(input.limit)?;

        let mut asset_query = SnowQuery::new();
        if let Some(category) = &input.model_category {
            asset_query = asset_query.eq("model_category", category);
        }

        let limit = input.limit.unwrap_or(DEFAULT_RECONCILE_LIMIT);
        let asset_rows = self
            .snow_client
            .get_records(Table::Hardware, &asset_query, None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to fetch assets for reconciliation");
                format!("Failed to fetch assets for reconciliation: {}", sanitized)
            })?;
        let ci_rows = self
            .snow_client
            .get_records(Table::ConfigurationItem, &SnowQuery::new(), None, limit)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to fetch CIs for reconciliation");
                format!("Failed to fetch CIs for reconciliation: {}", sanitized)
            })?;

        let assets: Vec<HardwareAsset> = self.parse_rows(asset_rows, "hardware assets")?;
        let cis: Vec<ConfigurationItem> = self.parse_rows(ci_rows, "configuration items")?;

        let (report, orphan_ids) = reconcile(&assets, &cis);

        let mut updated = None;
        if input.update_status == Some(true) {
            let mut count = 0usize;
            for sys_id in &orphan_ids {
                self.snow_client
                    .update_record(
                        Table::Hardware,
                        sys_id,
                        serde_json::json!({ "u_reconciliation_status": "orphaned" }),
                    )
                    .await
                    .map_err(|e| {
                        let sanitized = self.sanitize_error(&e);
                        tracing::error!(
                            error = %sanitized,
                            sys_id = %sys_id,
                            "Failed to stamp reconciliation status"
                        );
                        format!(
                            "Stamped {} of {} orphaned assets, then failed on {}: {}",
                            count,
                            orphan_ids.len(),
                            sys_id,
                            sanitized
                        )
                    })?;
                count += 1;
            }
            updated = Some(count);
        }

        Ok(format_reconciliation_report(&report, updated))
    }

    /// Aggregate health dashboard over assets, licenses, and contracts.
    #[tool(description = "Get an asset estate health dashboard: status counts, total value, contracts expiring within 30 days, and a weighted overall score from utilization, license compliance, and contract health.")]
    async fn get_asset_health_metrics(
        &self,
        Parameters(input): Parameters<GetAssetHealthMetricsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "get_asset_health_metrics tool called");

        let mut asset_query = SnowQuery::new();
        if let Some(location) = &input.location {
            asset_query = asset_query.like("location", location);
        }
        if let Some(category) = &input.model_category {
            asset_query = asset_query.eq("model_category", category);
        }

        let asset_rows = self
            .snow_client
            .get_records(Table::Asset, &asset_query, None, HEALTH_SCAN_LIMIT)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to fetch assets for health metrics");
                format!("Failed to fetch assets for health metrics: {}", sanitized)
            })?;
        let license_rows = self
            .snow_client
            .get_records(Table::License, &SnowQuery::new(), None, HEALTH_SCAN_LIMIT)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to fetch licenses for health metrics");
                format!("Failed to fetch licenses for health metrics: {}", sanitized)
            })?;
        let contract_rows = self
            .snow_client
            .get_records(Table::Contract, &SnowQuery::new(), None, HEALTH_SCAN_LIMIT)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to fetch contracts for health metrics");
                format!("Failed to fetch contracts for health metrics: {}", sanitized)
            })?;

        let assets: Vec<AssetRecord> = self.parse_rows(asset_rows, "assets")?;
        let licenses: Vec<SoftwareLicense> = self.parse_rows(license_rows, "software licenses")?;
        let contracts: Vec<Contract> = self.parse_rows(contract_rows, "contracts")?;

        let metrics = compute_health_metrics(&assets, &licenses, &contracts, today());
        Ok(format_health_metrics(&metrics))
    }

    /// Sanitizes an error message to remove the instance password.
    fn sanitize_error(&self, error: &AmberError) -> String {
        error.sanitized_display(self.snow_client.password_for_sanitization())
    }

    /// Deserializes raw Table API rows into typed records.
    fn parse_rows<T: DeserializeOwned>(
        &self,
        rows: Vec<serde_json::Value>,
        what: &str,
    ) -> Result<Vec<T>, String> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(AmberError::Serialization))
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to parse {}", what);
                format!("Failed to parse {}: {}", what, sanitized)
            })
    }

    /// Fetches one base asset record by sys_id or asset_tag.
    async fn fetch_asset(
        &self,
        sys_id: Option<&str>,
        asset_tag: Option<&str>,
    ) -> Result<AssetRecord, String> {
        let row = match (sys_id, asset_tag) {
            (Some(sys_id), _) => self
                .snow_client
                .get_record(Table::Asset, sys_id)
                .await
                .map_err(|e| {
                    let sanitized = self.sanitize_error(&e);
                    tracing::error!(error = %sanitized, sys_id = %sys_id, "Failed to fetch asset");
                    format!("Failed to fetch asset {}: {}", sys_id, sanitized)
                })?,
            (None, Some(tag)) => {
                let query = SnowQuery::new().eq("asset_tag", tag);
                let rows = self
                    .snow_client
                    .get_records(Table::Asset, &query, None, 1)
                    .await
                    .map_err(|e| {
                        let sanitized = self.sanitize_error(&e);
                        tracing::error!(error = %sanitized, asset_tag = %tag, "Failed to fetch asset");
                        format!("Failed to fetch asset {}: {}", tag, sanitized)
                    })?;
                rows.into_iter()
                    .next()
                    .ok_or_else(|| format!("Asset not found: asset_tag={}", tag))?
            }
            (None, None) => return Err("Provide either sys_id or asset_tag.".to_string()),
        };

        let asset: Vec<AssetRecord> = self.parse_rows(vec![row], "asset record")?;
        asset
            .into_iter()
            .next()
            .ok_or_else(|| "Asset record was empty.".to_string())
    }
}

#[tool_handler]
impl ServerHandler for AmberServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.instructions = Some(
            "Amber provides IT Asset Management data from ServiceNow. \
             Use query_hardware_assets and query_software_licenses to search, \
             get_asset_details and get_asset_lifecycle for single assets, \
             and get_asset_contracts for contract coverage. Analysis tools: \
             calculate_asset_costs, check_license_compliance, \
             get_license_utilization, track_asset_depreciation, \
             find_underutilized_assets, find_expiring_warranties, \
             find_expiring_contracts, reconcile_assets_to_cis, and \
             get_asset_health_metrics. Start with health_check to verify \
             connectivity."
                .into(),
        );
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info
    }
}

/// Today's date in the server's local timezone.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rejects an explicit zero limit before it reaches the client clamp.
fn validate_limit(limit: Option<u32>) -> Result<(), String> {
    if limit == Some(0) {
        return Err("limit must be >= 1.".to_string());
    }
    Ok(())
}

/// Matches hardware assets against configuration items.
///
/// Tries the asset's CI reference first, then asset tag, then serial
/// number. Returns the report plus the sys_ids of orphaned assets (for
/// the optional status write-back).
fn reconcile(
    assets: &[HardwareAsset],
    cis: &[ConfigurationItem],
) -> (ReconciliationReport, Vec<String>) {
    let mut ci_by_id: HashMap<&str, usize> = HashMap::new();
    let mut ci_by_tag: HashMap<&str, usize> = HashMap::new();
    let mut ci_by_serial: HashMap<&str, usize> = HashMap::new();
    for (idx, ci) in cis.iter().enumerate() {
        if let Some(id) = ci.sys_id() {
            ci_by_id.insert(id, idx);
        }
        if let Some(tag) = ci.asset_tag() {
            ci_by_tag.insert(tag, idx);
        }
        if let Some(serial) = ci.serial_number() {
            ci_by_serial.insert(serial, idx);
        }
    }

    let mut report = ReconciliationReport::default();
    let mut orphan_ids = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();

    for asset in assets {
        let hit = asset
            .ci_sys_id()
            .and_then(|id| ci_by_id.get(id).map(|&i| (i, MatchBasis::CiReference)))
            .or_else(|| {
                asset
                    .asset_tag()
                    .and_then(|tag| ci_by_tag.get(tag).map(|&i| (i, MatchBasis::AssetTag)))
            })
            .or_else(|| {
                asset.serial_number().and_then(|serial| {
                    ci_by_serial.get(serial).map(|&i| (i, MatchBasis::SerialNumber))
                })
            });

        match hit {
            Some((idx, basis)) => {
                seen.insert(idx);
                let ci = &cis[idx];
                report.matched.push(ReconciliationMatch {
                    asset_sys_id: asset.sys_id().unwrap_or_default().to_string(),
                    asset_name: asset.display_name().to_string(),
                    ci_sys_id: ci.sys_id().unwrap_or_default().to_string(),
                    ci_name: ci.name().to_string(),
                    basis,
                });
            }
            None => {
                report.orphaned_assets.push(asset.display_name().to_string());
                if let Some(sys_id) = asset.sys_id() {
                    orphan_ids.push(sys_id.to_string());
                }
            }
        }
    }

    for (idx, ci) in cis.iter().enumerate() {
        if !seen.contains(&idx) {
            report.untracked_cis.push(ci.name().to_string());
        }
    }

    (report, orphan_ids)
}

/// Aggregates the health dashboard from raw record sets.
fn compute_health_metrics(
    assets: &[AssetRecord],
    licenses: &[SoftwareLicense],
    contracts: &[Contract],
    today: NaiveDate,
) -> HealthMetrics {
    let mut metrics = HealthMetrics {
        total_assets: assets.len(),
        ..Default::default()
    };

    for asset in assets {
        match asset
            .install_status()
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "in use" | "installed" => {
                metrics.active_assets += 1;
                if asset.assigned_to().is_none() {
                    metrics.unassigned_active += 1;
                }
            }
            "retired" => metrics.retired_assets += 1,
            "missing" | "absent" => metrics.missing_assets += 1,
            "in stock" => metrics.in_stock_assets += 1,
            _ => {}
        }
        metrics.total_asset_value += asset.cost().unwrap_or(0.0);
    }

    metrics.utilization_rate = if metrics.active_assets == 0 {
        1.0
    } else {
        (metrics.active_assets - metrics.unassigned_active) as f64
            / metrics.active_assets as f64
    };

    let mut summary = ComplianceSummary::default();
    for license in licenses {
        let (status, _) = ComplianceStatus::classify(license.rights(), license.allocated());
        summary.record(status);
    }
    metrics.compliance_rate = summary.compliance_rate();

    let mut dated = 0usize;
    let mut live = 0usize;
    for contract in contracts {
        if let Some(days) = contract.days_remaining(today) {
            dated += 1;
            if days >= 0 {
                live += 1;
                if days <= 30 {
                    metrics.expiring_contracts_30d += 1;
                }
            }
        }
    }
    metrics.contract_health = if dated == 0 {
        1.0
    } else {
        live as f64 / dated as f64
    };

    metrics.overall_score = HealthMetrics::score(
        metrics.utilization_rate,
        metrics.compliance_rate,
        metrics.contract_health,
    );

    metrics
}

// ============================================================================
// Response formatting helpers
// ============================================================================

/// Formats a list of hardware assets as human-readable text.
fn format_hardware_list(assets: &[HardwareAsset]) -> String {
    if assets.is_empty() {
        return "No hardware assets found matching the criteria.".to_string();
    }

    let mut output = format!("Found {} hardware asset(s):\n\n", assets.len());

    for asset in assets {
        output.push_str(&format!(
            "{} - {}\n",
            asset.asset_tag().unwrap_or("(no tag)"),
            asset.display_name()
        ));
        output.push_str(&format!(
            "   Model: {} | Category: {} | Status: {}\n",
            asset.model().unwrap_or("unknown"),
            asset.model_category().unwrap_or("unknown"),
            asset.install_status().unwrap_or("unknown")
        ));
        output.push_str(&format!(
            "   Assigned to: {} | Location: {}\n",
            asset.assigned_to().unwrap_or("(unassigned)"),
            asset.location().unwrap_or("unknown")
        ));
        if let Some(cost) = asset.cost() {
            output.push_str(&format!("   Cost: {:.2}\n", cost));
        }
        output.push('\n');
    }

    output
}

/// Formats a list of software licenses as human-readable text.
fn format_license_list(licenses: &[SoftwareLicense]) -> String {
    if licenses.is_empty() {
        return "No software licenses found matching the criteria.".to_string();
    }

    let mut output = format!("Found {} software license(s):\n\n", licenses.len());

    for license in licenses {
        output.push_str(&format!(
            "{} ({})\n",
            license.product().unwrap_or("(unknown product)"),
            license.vendor().unwrap_or("unknown vendor")
        ));
        output.push_str(&format!(
            "   Seats: {} allocated of {} purchased",
            license.allocated(),
            license.rights()
        ));
        if let Some(end) = license.end_date() {
            output.push_str(&format!(" | Coverage ends: {}", end));
        }
        output.push('\n');
        if let Some(cost) = license.cost() {
            output.push_str(&format!("   Cost: {:.2}\n", cost));
        }
        output.push('\n');
    }

    output
}

/// Formats full asset details as human-readable text.
fn format_asset_details(asset: &AssetRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Asset {}: {}\n",
        asset.asset_tag().unwrap_or("(no tag)"),
        asset.display_name()
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    output.push_str(&format!(
        "\nStatus: {}",
        asset.install_status().unwrap_or("unknown")
    ));
    if let Some(substatus) = asset.substatus() {
        output.push_str(&format!(" ({})", substatus));
    }
    output.push('\n');

    if let Some(model) = asset.model() {
        output.push_str(&format!("Model: {}\n", model));
    }
    if let Some(category) = asset.model_category() {
        output.push_str(&format!("Category: {}\n", category));
    }
    if let Some(serial) = asset.serial_number() {
        output.push_str(&format!("Serial number: {}\n", serial));
    }

    output.push_str(&format!(
        "\nAssigned to: {}\n",
        asset.assigned_to().unwrap_or("(unassigned)")
    ));
    if let Some(department) = asset.department() {
        output.push_str(&format!("Department: {}\n", department));
    }
    if let Some(location) = asset.location() {
        output.push_str(&format!("Location: {}\n", location));
    }

    output.push_str("\n--- Financials ---\n");
    if let Some(cost) = asset.cost() {
        output.push_str(&format!("Purchase cost: {:.2}\n", cost));
    }
    if let Some(purchased) = asset.purchase_date() {
        output.push_str(&format!("Purchased: {}\n", purchased));
    }
    if let Some(installed) = asset.install_date() {
        output.push_str(&format!("Installed: {}\n", installed));
    }
    if let Some(retired) = asset.retired_date() {
        output.push_str(&format!("Retired: {}\n", retired));
    }

    if let Some(sys_id) = asset.sys_id() {
        output.push_str(&format!("\nsys_id: {}\n", sys_id));
    }

    output
}

/// Formats lifecycle stage information as human-readable text.
fn format_lifecycle(asset: &AssetRecord, today: NaiveDate) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Lifecycle for {} ({})\n\n",
        asset.display_name(),
        asset.asset_tag().unwrap_or("no tag")
    ));
    output.push_str(&format!("Stage: {}\n", asset.lifecycle_stage()));
    output.push_str(&format!(
        "Install status: {}\n",
        asset.install_status().unwrap_or("unknown")
    ));

    match asset.days_in_stage(today) {
        Some(days) => output.push_str(&format!("Days in current stage: {}\n", days)),
        None => output.push_str("Days in current stage: unknown (no update timestamp)\n"),
    }

    if let Some(purchased) = asset.purchase_date() {
        output.push_str(&format!("Purchased: {}\n", purchased));
    }
    if let Some(installed) = asset.install_date() {
        output.push_str(&format!("Installed: {}\n", installed));
    }
    if let Some(retired) = asset.retired_date() {
        output.push_str(&format!("Retired: {}\n", retired));
    }

    output
}

/// Formats a list of contracts as human-readable text.
fn format_contract_list(contracts: &[Contract], today: NaiveDate) -> String {
    if contracts.is_empty() {
        return "No contracts found matching the criteria.".to_string();
    }

    let mut output = format!("Found {} contract(s):\n\n", contracts.len());

    for contract in contracts {
        output.push_str(contract.number());
        if let Some(description) = contract.short_description() {
            output.push_str(&format!(" - {}", description));
        }
        output.push('\n');
        output.push_str(&format!(
            "   Vendor: {} | State: {}\n",
            contract.vendor().unwrap_or("unknown"),
            contract.state().unwrap_or("unknown")
        ));
        if let Some(ends) = contract.ends() {
            let days = contract.days_remaining(today).unwrap_or(0);
            output.push_str(&format!("   Ends: {} ({} day(s) remaining)\n", ends, days));
        }
        if let Some(cost) = contract.cost() {
            output.push_str(&format!("   Cost: {:.2}\n", cost));
        }
        output.push('\n');
    }

    output
}

/// Formats the TCO report.
///
/// Maintenance is estimated at 15% of purchase cost annually.
fn format_cost_report(assets: &[HardwareAsset]) -> String {
    if assets.is_empty() {
        return "No hardware assets found matching the criteria.".to_string();
    }

    let mut total_purchase = 0.0f64;
    let mut lines = String::new();

    for asset in assets {
        let purchase = asset.cost().unwrap_or(0.0);
        let maintenance = purchase * crate::models::reports::MAINTENANCE_RATE;
        total_purchase += purchase;
        lines.push_str(&format!(
            "{} - {}: purchase {:.2}, annual maintenance {:.2}, TCO {:.2}\n",
            asset.asset_tag().unwrap_or("(no tag)"),
            asset.display_name(),
            purchase,
            maintenance,
            purchase + maintenance
        ));
    }

    let total_maintenance = total_purchase * crate::models::reports::MAINTENANCE_RATE;
    let mut output = format!(
        "Cost of ownership for {} asset(s):\n\n\
         Total purchase cost: {:.2}\n\
         Total annual maintenance (est. 15%): {:.2}\n\
         Total TCO: {:.2}\n\n",
        assets.len(),
        total_purchase,
        total_maintenance,
        total_purchase + total_maintenance
    );
    output.push_str(&lines);
    output
}

/// Formats the license compliance report.
fn format_compliance_report(entries: &[ComplianceEntry], summary: &ComplianceSummary) -> String {
    if entries.is_empty() {
        return "No software licenses found matching the criteria.".to_string();
    }

    let mut output = format!(
        "License compliance for {} license(s):\n\
         Compliant: {} | Under-licensed: {} | Over-licensed: {} | Unknown: {}\n\n",
        summary.total, summary.compliant, summary.under_licensed, summary.over_licensed,
        summary.unknown
    );

    for entry in entries {
        output.push_str(&format!(
            "{}: {} allocated of {} purchased - {}",
            entry.product,
            entry.allocated,
            entry.rights,
            entry.status.label()
        ));
        if entry.status == ComplianceStatus::UnderLicensed {
            output.push_str(&format!(" (short {} seat(s))", entry.delta));
        }
        output.push('\n');
    }

    output
}

/// Formats the license utilization report.
fn format_utilization_report(entries: &[UtilizationEntry]) -> String {
    if entries.is_empty() {
        return "No software licenses found matching the criteria.".to_string();
    }

    let mut output = format!("Seat utilization for {} license(s):\n\n", entries.len());

    for entry in entries {
        output.push_str(&format!(
            "{}: {:.1}% ({} of {} seats)\n",
            entry.product, entry.utilization_pct, entry.allocated, entry.rights
        ));
    }

    output
}

/// Formats the depreciation report.
fn format_depreciation_report(entries: &[DepreciationEntry]) -> String {
    if entries.is_empty() {
        return "No hardware assets with a cost and purchase date were found.".to_string();
    }

    let total_depreciated: f64 = entries.iter().map(|e| e.depreciated_amount).sum();
    let total_book: f64 = entries.iter().map(|e| e.book_value).sum();

    let mut output = format!(
        "Depreciation for {} asset(s):\n\
         Total accumulated depreciation: {:.2}\n\
         Total remaining book value: {:.2}\n\n",
        entries.len(),
        total_depreciated,
        total_book
    );

    for entry in entries {
        output.push_str(&format!(
            "{} ({}): cost {:.2}, life {:.0}y, age {:.1}y, book value {:.2}\n",
            entry.name,
            entry.asset_tag.as_deref().unwrap_or("no tag"),
            entry.purchase_cost,
            entry.useful_life_years,
            entry.age_years,
            entry.book_value
        ));
    }

    output
}

/// Formats the underutilized-assets report.
fn format_underutilized_report(assets: &[HardwareAsset], days_threshold: u32) -> String {
    if assets.is_empty() {
        return format!(
            "No in-use assets older than {} day(s) without activity were found.",
            days_threshold
        );
    }

    let waste: f64 = assets.iter().map(|a| a.cost().unwrap_or(0.0)).sum();
    let mut output = format!(
        "Found {} potentially underutilized asset(s) (threshold: {} days):\n\
         Estimated waste cost: {:.2}\n\n",
        assets.len(),
        days_threshold,
        waste
    );

    for asset in assets {
        let reason = if asset.is_unassigned() {
            "unassigned"
        } else {
            "inactive"
        };
        output.push_str(&format!(
            "{} - {} [{}]\n   Status: {} | Assigned to: {}\n",
            asset.asset_tag().unwrap_or("(no tag)"),
            asset.display_name(),
            reason,
            asset.install_status().unwrap_or("unknown"),
            asset.assigned_to().unwrap_or("(nobody)")
        ));
        if let Some(updated) = asset.updated_on() {
            output.push_str(&format!("   Last updated: {}\n", updated));
        }
        output.push('\n');
    }

    output
}

/// Formats the expiring-warranties report.
fn format_expiring_warranties(assets: &[HardwareAsset], today: NaiveDate) -> String {
    if assets.is_empty() {
        return "No warranties expiring in the given window.".to_string();
    }

    let mut output = format!("Found {} asset(s) with expiring warranties:\n\n", assets.len());

    for asset in assets {
        let Some(expires) = asset.warranty_expiration() else {
            continue;
        };
        let days = (expires - today).num_days();
        let urgency = Urgency::classify(days);
        output.push_str(&format!(
            "[{}] {} - {}: warranty ends {} ({} day(s))\n",
            urgency.label(),
            asset.asset_tag().unwrap_or("(no tag)"),
            asset.display_name(),
            expires,
            days
        ));
    }

    output
}

/// Formats the expiring-contracts report.
fn format_expiring_contracts(contracts: &[Contract], today: NaiveDate) -> String {
    if contracts.is_empty() {
        return "No contracts expiring in the given window.".to_string();
    }

    let value_at_risk: f64 = contracts.iter().map(|c| c.cost().unwrap_or(0.0)).sum();
    let mut output = format!(
        "Found {} expiring contract(s):\n\
         Total value at risk: {:.2}\n\n",
        contracts.len(),
        value_at_risk
    );

    for contract in contracts {
        let Some(days) = contract.days_remaining(today) else {
            continue;
        };
        let urgency = Urgency::classify(days);
        output.push_str(&format!(
            "[{}] {}: {} ({} day(s) remaining)",
            urgency.label(),
            contract.number(),
            contract.ends().map(|d| d.to_string()).unwrap_or_default(),
            days
        ));
        if let Some(vendor) = contract.vendor() {
            output.push_str(&format!(" - {}", vendor));
        }
        output.push('\n');
    }

    output
}

/// Appends a bounded name list, eliding the tail when long.
fn push_name_list(output: &mut String, names: &[String]) {
    for name in names.iter().take(MAX_LISTED_ITEMS) {
        output.push_str(&format!("   - {}\n", name));
    }
    if names.len() > MAX_LISTED_ITEMS {
        output.push_str(&format!(
            "   ... and {} more\n",
            names.len() - MAX_LISTED_ITEMS
        ));
    }
}

/// Formats the asset/CI reconciliation report.
fn format_reconciliation_report(report: &ReconciliationReport, updated: Option<usize>) -> String {
    let mut output = format!(
        "Reconciliation: {} matched, {} orphaned asset(s), {} untracked CI(s)\n\
         Match rate: {:.1}%\n\n",
        report.matched.len(),
        report.orphaned_assets.len(),
        report.untracked_cis.len(),
        report.match_rate() * 100.0
    );

    if !report.matched.is_empty() {
        output.push_str("Matched pairs:\n");
        for m in report.matched.iter().take(MAX_LISTED_ITEMS) {
            let basis = match m.basis {
                MatchBasis::CiReference => "CI reference",
                MatchBasis::AssetTag => "asset tag",
                MatchBasis::SerialNumber => "serial number",
            };
            output.push_str(&format!(
                "   - {} <-> {} (via {})\n",
                m.asset_name, m.ci_name, basis
            ));
        }
        if report.matched.len() > MAX_LISTED_ITEMS {
            output.push_str(&format!(
                "   ... and {} more\n",
                report.matched.len() - MAX_LISTED_ITEMS
            ));
        }
        output.push('\n');
    }

    if !report.orphaned_assets.is_empty() {
        output.push_str("Orphaned assets (no CI):\n");
        push_name_list(&mut output, &report.orphaned_assets);
        output.push('\n');
    }

    if !report.untracked_cis.is_empty() {
        output.push_str("Untracked CIs (no asset):\n");
        push_name_list(&mut output, &report.untracked_cis);
        output.push('\n');
    }

    match updated {
        Some(count) => output.push_str(&format!(
            "Stamped reconciliation status on {} orphaned asset(s).\n",
            count
        )),
        None => {
            if !report.orphaned_assets.is_empty() {
                output.push_str(
                    "No records were modified. Re-run with update_status=true to stamp \
                     orphaned assets.\n",
                );
            }
        }
    }

    output
}

/// Formats the health dashboard.
fn format_health_metrics(metrics: &HealthMetrics) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Asset estate health - overall score: {:.1}/100\n",
        metrics.overall_score
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    output.push_str(&format!("\nTotal assets: {}\n", metrics.total_assets));
    output.push_str(&format!(
        "   Active: {} | In stock: {} | Retired: {} | Missing: {}\n",
        metrics.active_assets,
        metrics.in_stock_assets,
        metrics.retired_assets,
        metrics.missing_assets
    ));
    output.push_str(&format!(
        "   Active but unassigned: {}\n",
        metrics.unassigned_active
    ));
    output.push_str(&format!(
        "Total asset value: {:.2}\n",
        metrics.total_asset_value
    ));
    output.push_str(&format!(
        "Contracts expiring within 30 days: {}\n",
        metrics.expiring_contracts_30d
    ));

    output.push_str("\n--- Score components ---\n");
    output.push_str(&format!(
        "Utilization (weight 0.4): {:.1}%\n",
        metrics.utilization_rate * 100.0
    ));
    output.push_str(&format!(
        "License compliance (weight 0.4): {:.1}%\n",
        metrics.compliance_rate * 100.0
    ));
    output.push_str(&format!(
        "Contract health (weight 0.2): {:.1}%\n",
        metrics.contract_health * 100.0
    ));

    output
}

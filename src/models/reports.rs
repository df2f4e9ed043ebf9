//! Derived asset-management computations.
//!
//! Everything here is pure: the server gathers records through the
//! client, then feeds them into these functions. Keeping the math out
//! of the tool handlers makes the classification rules testable
//! without an instance.

use chrono::NaiveDate;
use serde::Serialize;

/// Depreciable life in years when the model category gives no hint.
pub const DEFAULT_USEFUL_LIFE_YEARS: f64 = 4.0;

/// Weight of license utilization in the overall health score.
pub const HEALTH_WEIGHT_UTILIZATION: f64 = 0.4;
/// Weight of license compliance in the overall health score.
pub const HEALTH_WEIGHT_COMPLIANCE: f64 = 0.4;
/// Weight of contract coverage in the overall health score.
pub const HEALTH_WEIGHT_CONTRACT: f64 = 0.2;

/// Annual maintenance estimate as a fraction of purchase cost.
pub const MAINTENANCE_RATE: f64 = 0.15;

/// License seat-count compliance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    /// Allocation sits within the purchased entitlement.
    Compliant,
    /// More seats allocated than purchased.
    UnderLicensed,
    /// Fewer than half the purchased seats are allocated.
    OverLicensed,
    /// No entitlement count on record; nothing to compare against.
    Unknown,
}

impl ComplianceStatus {
    /// Classifies a license by purchased rights vs. allocated seats.
    ///
    /// Returns the status together with the seat delta: for an
    /// under-licensed product this is the shortfall (allocated minus
    /// rights), otherwise 0.
    pub fn classify(rights: i64, allocated: i64) -> (Self, i64) {
        if rights <= 0 {
            return (ComplianceStatus::Unknown, 0);
        }
        if allocated > rights {
            return (ComplianceStatus::UnderLicensed, allocated - rights);
        }
        if allocated * 2 < rights {
            return (ComplianceStatus::OverLicensed, 0);
        }
        (ComplianceStatus::Compliant, 0)
    }

    /// Short label for report output.
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::UnderLicensed => "under-licensed",
            ComplianceStatus::OverLicensed => "over-licensed",
            ComplianceStatus::Unknown => "unknown",
        }
    }
}

/// Urgency bucket for an expiring contract or warranty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Already past its end date.
    Expired,
    /// Ends within 30 days.
    Critical,
    /// Ends within 60 days.
    Warning,
    /// Ends within 90 days.
    Notice,
    /// Ends later than 90 days out.
    Info,
}

impl Urgency {
    /// Buckets a days-remaining count.
    pub fn classify(days_remaining: i64) -> Self {
        if days_remaining < 0 {
            Urgency::Expired
        } else if days_remaining <= 30 {
            Urgency::Critical
        } else if days_remaining <= 60 {
            Urgency::Warning
        } else if days_remaining <= 90 {
            Urgency::Notice
        } else {
            Urgency::Info
        }
    }

    /// Short label for report output.
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Expired => "EXPIRED",
            Urgency::Critical => "CRITICAL",
            Urgency::Warning => "WARNING",
            Urgency::Notice => "NOTICE",
            Urgency::Info => "INFO",
        }
    }
}

/// Useful life in years for a model category, used when the caller
/// supplies no override.
pub fn useful_life_years(model_category: &str) -> f64 {
    match model_category {
        "Computer" | "Computers" => 3.0,
        "Server" | "Servers" => 5.0,
        "Network Gear" => 5.0,
        _ => DEFAULT_USEFUL_LIFE_YEARS,
    }
}

/// Straight-line book value after `age_years` of service.
///
/// The value depreciates by `cost / useful_life_years` per year and
/// never drops below zero.
pub fn straight_line_book_value(cost: f64, useful_life_years: f64, age_years: f64) -> f64 {
    if cost <= 0.0 || useful_life_years <= 0.0 {
        return 0.0;
    }
    let annual = cost / useful_life_years;
    (cost - annual * age_years).max(0.0)
}

/// Asset age in fractional years between two dates.
pub fn age_in_years(purchase_date: NaiveDate, today: NaiveDate) -> f64 {
    (today - purchase_date).num_days() as f64 / 365.25
}

/// One asset's depreciation line.
#[derive(Debug, Clone, Serialize)]
pub struct DepreciationEntry {
    /// Asset display name.
    pub name: String,
    /// Asset tag, when present.
    pub asset_tag: Option<String>,
    /// Model category used to pick the useful life.
    pub category: Option<String>,
    /// Original purchase cost.
    pub purchase_cost: f64,
    /// Useful life applied, in years.
    pub useful_life_years: f64,
    /// Age at evaluation time, in fractional years.
    pub age_years: f64,
    /// Current straight-line book value.
    pub book_value: f64,
    /// Cost minus book value.
    pub depreciated_amount: f64,
}

/// One classified license in a compliance report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceEntry {
    /// Licensed product name.
    pub product: String,
    /// Purchased seats.
    pub rights: i64,
    /// Allocated seats.
    pub allocated: i64,
    /// Classification.
    pub status: ComplianceStatus,
    /// Seat shortfall when under-licensed, otherwise 0.
    pub delta: i64,
}

/// One license's seat utilization.
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationEntry {
    /// Licensed product name.
    pub product: String,
    /// Purchased seats.
    pub rights: i64,
    /// Allocated seats.
    pub allocated: i64,
    /// Allocated over purchased as a percentage; 0 when no seats owned.
    pub utilization_pct: f64,
}

/// Aggregate license compliance report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplianceSummary {
    /// Licenses examined.
    pub total: usize,
    /// Count per status.
    pub compliant: usize,
    /// Licenses with more seats allocated than purchased.
    pub under_licensed: usize,
    /// Licenses with fewer than half their seats allocated.
    pub over_licensed: usize,
    /// Licenses with no entitlement count.
    pub unknown: usize,
}

impl ComplianceSummary {
    /// Folds one classified license into the summary.
    pub fn record(&mut self, status: ComplianceStatus) {
        self.total += 1;
        match status {
            ComplianceStatus::Compliant => self.compliant += 1,
            ComplianceStatus::UnderLicensed => self.under_licensed += 1,
            ComplianceStatus::OverLicensed => self.over_licensed += 1,
            ComplianceStatus::Unknown => self.unknown += 1,
        }
    }

    /// Fraction of classifiable licenses that are compliant, 0..=1.
    ///
    /// Unknowns are excluded from the denominator; with nothing
    /// classifiable the rate is 1.0 (no evidence of a problem).
    pub fn compliance_rate(&self) -> f64 {
        let classifiable = self.total - self.unknown;
        if classifiable == 0 {
            return 1.0;
        }
        self.compliant as f64 / classifiable as f64
    }
}

/// Overall estate health, combining utilization, compliance, and
/// contract coverage into one weighted score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthMetrics {
    /// Assets examined.
    pub total_assets: usize,
    /// Assets in an active status ("In use" or "Installed").
    pub active_assets: usize,
    /// Retired assets.
    pub retired_assets: usize,
    /// Missing assets.
    pub missing_assets: usize,
    /// Assets sitting in stock.
    pub in_stock_assets: usize,
    /// Active assets with no assigned user.
    pub unassigned_active: usize,
    /// Sum of purchase costs across the examined assets.
    pub total_asset_value: f64,
    /// Contracts ending within the next 30 days.
    pub expiring_contracts_30d: usize,
    /// Fraction of active assets that are assigned, 0..=1.
    pub utilization_rate: f64,
    /// Fraction of classifiable licenses that are compliant, 0..=1.
    pub compliance_rate: f64,
    /// Fraction of dated contracts not yet expired, 0..=1.
    pub contract_health: f64,
    /// Weighted overall score, 0..=100.
    pub overall_score: f64,
}

impl HealthMetrics {
    /// Combines the three rates into the weighted overall score.
    pub fn score(utilization_rate: f64, compliance_rate: f64, contract_health: f64) -> f64 {
        (utilization_rate * HEALTH_WEIGHT_UTILIZATION
            + compliance_rate * HEALTH_WEIGHT_COMPLIANCE
            + contract_health * HEALTH_WEIGHT_CONTRACT)
            * 100.0
    }
}

/// How an asset was matched to a configuration item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    /// The asset's CI reference resolved directly.
    CiReference,
    /// Asset tag matched a CI's asset tag.
    AssetTag,
    /// Serial number matched a CI's serial number.
    SerialNumber,
}

/// One matched asset/CI pair in a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationMatch {
    /// Asset sys_id.
    pub asset_sys_id: String,
    /// Asset display name.
    pub asset_name: String,
    /// Matched CI sys_id.
    pub ci_sys_id: String,
    /// Matched CI name.
    pub ci_name: String,
    /// Which identity field produced the match.
    pub basis: MatchBasis,
}

/// Outcome of matching hardware assets against the CMDB.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    /// Asset/CI pairs that matched.
    pub matched: Vec<ReconciliationMatch>,
    /// Assets with no corresponding CI.
    pub orphaned_assets: Vec<String>,
    /// CIs with no corresponding asset.
    pub untracked_cis: Vec<String>,
}

impl ReconciliationReport {
    /// Match rate over the examined assets, 0..=1.
    pub fn match_rate(&self) -> f64 {
        let total = self.matched.len() + self.orphaned_assets.len();
        if total == 0 {
            return 1.0;
        }
        self.matched.len() as f64 / total as f64
    }
}

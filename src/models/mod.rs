//! Typed views over ServiceNow Table API records.
//!
//! Every record model keeps its fields as optional [`FieldValue`]s and
//! exposes typed accessors; rows with missing or oddly-shaped fields
//! never fail to deserialize. The `reports` module holds the pure
//! computations the analysis tools run on top of these records.

pub mod asset;
pub mod ci;
pub mod common;
pub mod contract;
pub mod hardware;
pub mod license;
pub mod reports;

pub use asset::{lifecycle_stage, AssetRecord};
pub use ci::ConfigurationItem;
pub use common::FieldValue;
pub use contract::Contract;
pub use hardware::HardwareAsset;
pub use license::SoftwareLicense;
pub use reports::{
    age_in_years, straight_line_book_value, useful_life_years, ComplianceEntry,
    ComplianceStatus, ComplianceSummary, DepreciationEntry, HealthMetrics, MatchBasis,
    ReconciliationMatch, ReconciliationReport, Urgency, UtilizationEntry,
};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::VehicleRecord;

/// Lowest, median and highest price over a set of records.
///
/// All three are zero for an empty set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceStats {
    pub lowest: Decimal,
    pub median: Decimal,
    pub highest: Decimal,
}

/// Response for one search.
///
/// The engine always fills every field. Serialization leaves out zero
/// values and an empty suggestion list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Vehicles matching at least one present facet
    #[serde(skip_serializing_if = "is_zero")]
    pub total_vehicles: u64,

    /// Vehicles matching both the make and the model facet
    #[serde(skip_serializing_if = "is_zero")]
    pub make_model_total_vehicles: u64,

    #[serde(with = "rust_decimal::serde::float", skip_serializing_if = "Decimal::is_zero")]
    pub lowest: Decimal,

    #[serde(with = "rust_decimal::serde::float", skip_serializing_if = "Decimal::is_zero")]
    pub median: Decimal,

    #[serde(with = "rust_decimal::serde::float", skip_serializing_if = "Decimal::is_zero")]
    pub highest: Decimal,

    /// Up to five budget matches, cheapest first, one per make
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<VehicleRecord>,
}

impl QueryResult {
    pub fn stats(&self) -> PriceStats {
        PriceStats {
            lowest: self.lowest,
            median: self.median,
            highest: self.highest,
        }
    }

    pub(crate) fn set_stats(&mut self, stats: PriceStats) {
        self.lowest = stats.lowest;
        self.median = stats.median;
        self.highest = stats.highest;
    }
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

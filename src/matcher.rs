//! Per-record predicates.
//!
//! Each matcher tests one record against one query facet and returns
//! `false` when the facet is absent. Absence is normally handled one level
//! up, where the filter stage turns an absent facet into a pass-through; the
//! combined OR predicate is the one place an absent facet counts as `false`.

use rust_decimal::Decimal;

use crate::model::{Query, VehicleRecord};

/// 90% of the budget, exclusive lower edge of the price band.
const BAND_LOWER: Decimal = Decimal::from_parts(90, 0, 0, false, 2);
/// 110% of the budget, exclusive upper edge of the price band.
const BAND_UPPER: Decimal = Decimal::from_parts(110, 0, 0, false, 2);

/// A single facet of a query, borrowed for the lifetime of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion<'q> {
    Make(&'q str),
    Model(&'q str),
    Budget(Decimal),
    Year(u32),
}

impl<'q> Criterion<'q> {
    /// True when the facet holds its "absent" sentinel.
    pub fn is_absent(&self) -> bool {
        match self {
            Criterion::Make(s) | Criterion::Model(s) => s.is_empty(),
            Criterion::Budget(b) => *b <= Decimal::ZERO,
            Criterion::Year(y) => *y == 0,
        }
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        match *self {
            Criterion::Make(make) => make_match(record, make),
            Criterion::Model(model) => model_match(record, model),
            Criterion::Budget(budget) => budget_match(record, budget),
            Criterion::Year(year) => year_match(record, year),
        }
    }

    /// Stage name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Make(_) => "make",
            Criterion::Model(_) => "model",
            Criterion::Budget(_) => "budget",
            Criterion::Year(_) => "year",
        }
    }
}

/// Case-sensitive substring test on the make.
pub fn make_match(record: &VehicleRecord, make: &str) -> bool {
    !make.is_empty() && record.make.contains(make)
}

/// Case-sensitive substring test on the model.
pub fn model_match(record: &VehicleRecord, model: &str) -> bool {
    !model.is_empty() && record.model.contains(model)
}

/// Price strictly inside `(budget * 0.90, budget * 1.10)`.
///
/// # Examples
///
/// ```
/// use carserv::VehicleRecord;
/// use carserv::matcher::budget_match;
/// use rust_decimal::Decimal;
///
/// let budget = Decimal::from(40000);
/// let at = |price: i64| VehicleRecord::new("Kia", "Rio", Decimal::from(price), 2020, 1);
///
/// assert!(budget_match(&at(43999), budget));
/// assert!(!budget_match(&at(44000), budget));
/// assert!(!budget_match(&at(36000), budget));
/// ```
pub fn budget_match(record: &VehicleRecord, budget: Decimal) -> bool {
    if budget <= Decimal::ZERO {
        return false;
    }
    let lower = budget * BAND_LOWER;
    // An overflowing upper edge leaves the band open-ended.
    let below_upper = budget
        .checked_mul(BAND_UPPER)
        .is_none_or(|upper| record.price < upper);
    record.price > lower && below_upper
}

/// Exact model-year equality.
pub fn year_match(record: &VehicleRecord, year: u32) -> bool {
    year > 0 && record.year == year
}

/// True if any present facet of `query` matches.
///
/// A query with every facet absent matches nothing.
pub fn any_match(record: &VehicleRecord, query: &Query) -> bool {
    make_match(record, &query.make)
        || model_match(record, &query.model)
        || budget_match(record, query.budget)
        || year_match(record, query.year)
}

/// True if both the make and the model facet hold, treating an absent facet
/// as satisfied.
pub fn make_model_match(record: &VehicleRecord, query: &Query) -> bool {
    (!query.has_make() || make_match(record, &query.make))
        && (!query.has_model() || model_match(record, &query.model))
}

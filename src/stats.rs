//! Price ordering and summary statistics.

use crate::model::{PriceStats, VehicleRecord};

/// Stable merge sort by ascending price.
///
/// The input is left untouched; a sorted copy of the references is returned.
/// Records with equal prices keep their original relative order.
///
/// # Examples
///
/// ```
/// use carserv::VehicleRecord;
/// use carserv::stats::merge_sort_by_price;
/// use rust_decimal::Decimal;
///
/// let a = VehicleRecord::new("Kia", "Rio", Decimal::from(300), 2020, 1);
/// let b = VehicleRecord::new("Audi", "A4", Decimal::from(100), 2020, 1);
/// let c = VehicleRecord::new("BMW", "X1", Decimal::from(300), 2020, 1);
///
/// let sorted = merge_sort_by_price(&[&a, &b, &c]);
/// let makes: Vec<&str> = sorted.iter().map(|r| r.make.as_str()).collect();
/// assert_eq!(makes, ["Audi", "Kia", "BMW"]);
/// ```
pub fn merge_sort_by_price<'a>(records: &[&'a VehicleRecord]) -> Vec<&'a VehicleRecord> {
    if records.len() <= 1 {
        return records.to_vec();
    }

    let middle = records.len() / 2;
    let left = merge_sort_by_price(&records[..middle]);
    let right = merge_sort_by_price(&records[middle..]);
    merge(left, right)
}

fn merge<'a>(left: Vec<&'a VehicleRecord>, right: Vec<&'a VehicleRecord>) -> Vec<&'a VehicleRecord> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let next = match (left.peek().copied(), right.peek().copied()) {
            // Ties go to the left half so equal prices stay in input order.
            (Some(l), Some(r)) if r.price < l.price => right.next(),
            (Some(_), _) => left.next(),
            (None, Some(_)) => right.next(),
            (None, None) => break,
        };
        result.extend(next);
    }

    result
}

impl PriceStats {
    /// Sorts a copy of `records` and summarizes it.
    pub fn compute(records: &[&VehicleRecord]) -> Self {
        Self::from_sorted(&merge_sort_by_price(records))
    }

    /// Summarizes records already in ascending price order.
    ///
    /// The median is the element at `len / 2`, which for an even count is
    /// the upper of the two middle records rather than their average.
    pub fn from_sorted(sorted: &[&VehicleRecord]) -> Self {
        match (sorted.first(), sorted.get(sorted.len() / 2), sorted.last()) {
            (Some(lowest), Some(median), Some(highest)) => PriceStats {
                lowest: lowest.price,
                median: median.price,
                highest: highest.price,
            },
            _ => PriceStats::default(),
        }
    }
}

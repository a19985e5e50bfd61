use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One logical catalog entry.
///
/// A record stands for `count` physical vehicles sharing the same make,
/// model, price and year. Records are identified by their position in the
/// [`RecordStore`](crate::RecordStore), never by their content.
///
/// # Examples
///
/// ```
/// use carserv::VehicleRecord;
/// use rust_decimal::Decimal;
///
/// let record = VehicleRecord::new("Honda", "Civic", Decimal::from(36052), 2017, 24);
/// assert_eq!(record.make, "Honda");
/// assert_eq!(record.count, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Manufacturer name, matched by substring
    pub make: String,

    /// Model name, matched by substring
    pub model: String,

    /// Listing price, never negative
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Model year
    pub year: u32,

    /// Number of physical vehicles this record represents
    #[serde(rename = "vehicle_count")]
    pub count: u64,
}

impl VehicleRecord {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        price: Decimal,
        year: u32,
        count: u64,
    ) -> Self {
        VehicleRecord {
            make: make.into(),
            model: model.into(),
            price,
            year,
            count,
        }
    }
}

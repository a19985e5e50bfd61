//! Read-only vehicle catalog.
//!
//! The store is loaded once, before any query runs, and is never mutated
//! afterwards. Pipeline stages share it by reference without locking.

use std::{collections::BTreeSet, fs, io, path::Path, sync::OnceLock};

use rust_decimal::Decimal;

use crate::model::VehicleRecord;

/// Catalog shipped with the crate.
const EMBEDDED_DATASET: &str = include_str!("../data/vehicles.json");

static EMBEDDED: OnceLock<RecordStore> = OnceLock::new();

/// Errors raised while loading a dataset.
#[derive(Debug)]
pub enum LoadError {
    /// Dataset file could not be read
    Io(io::Error),
    /// Dataset is not a JSON array of vehicle records
    Json(serde_json::Error),
    /// A record carries a negative price
    NegativePrice { index: usize, price: Decimal },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Cannot read dataset: {}", e),
            LoadError::Json(e) => write!(f, "Malformed dataset: {}", e),
            LoadError::NegativePrice { index, price } => {
                write!(f, "Record {} has a negative price: {}", index, price)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::NegativePrice { .. } => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

/// Fixed-order, immutable sequence of vehicle records.
///
/// A record's index is its identity for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<VehicleRecord>,
}

impl RecordStore {
    /// Builds a store from in-memory records, rejecting negative prices.
    pub fn new(records: Vec<VehicleRecord>) -> Result<Self, LoadError> {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.price < Decimal::ZERO)
        {
            return Err(LoadError::NegativePrice {
                index,
                price: record.price,
            });
        }
        Ok(RecordStore { records })
    }

    /// Parses a JSON array of records.
    ///
    /// # Examples
    ///
    /// ```
    /// use carserv::RecordStore;
    ///
    /// let json = r#"[{"make":"Audi","model":"A7","price":36027,"year":2021,"vehicle_count":1358}]"#;
    /// let store = RecordStore::from_json_str(json).unwrap();
    /// assert_eq!(store.len(), 1);
    /// assert_eq!(store.total_vehicles(), 1358);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let records: Vec<VehicleRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Reads and parses a dataset file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let store = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), records = store.len(), "loaded dataset");
        Ok(store)
    }

    /// The process-wide embedded catalog, parsed on first use.
    pub fn embedded() -> Result<&'static RecordStore, LoadError> {
        if let Some(store) = EMBEDDED.get() {
            return Ok(store);
        }
        let store = Self::from_json_str(EMBEDDED_DATASET)?;
        tracing::info!(records = store.len(), "loaded embedded dataset");
        Ok(EMBEDDED.get_or_init(|| store))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&VehicleRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    /// Sum of `count` over every record.
    pub fn total_vehicles(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Distinct makes, sorted.
    pub fn makes(&self) -> Vec<&str> {
        let makes: BTreeSet<&str> = self.records.iter().map(|r| r.make.as_str()).collect();
        makes.into_iter().collect()
    }
}

#[test]
fn test_embedded_dataset_loads() {
    let store = RecordStore::embedded().unwrap();
    assert_eq!(store.len(), 30);
    assert_eq!(store.total_vehicles(), 244020);
    assert_eq!(store.makes().len(), 22);
}

#[test]
fn test_negative_price_rejected() {
    let json = r#"[
        {"make":"Audi","model":"A7","price":36027,"year":2021,"vehicle_count":1},
        {"make":"Kia","model":"Rio","price":-5,"year":2021,"vehicle_count":1}
    ]"#;
    match RecordStore::from_json_str(json) {
        Err(LoadError::NegativePrice { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected negative price error, got {:?}", other),
    }
}

#[test]
fn test_negative_count_rejected() {
    let json = r#"[{"make":"Kia","model":"Rio","price":5,"year":2021,"vehicle_count":-1}]"#;
    assert!(matches!(
        RecordStore::from_json_str(json),
        Err(LoadError::Json(_))
    ));
}

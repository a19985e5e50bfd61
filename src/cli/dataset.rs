//! Load-time dataset validation

use std::path::Path;

use super::CliError;
use crate::RecordStore;

/// Summary of a dataset that loaded cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub records: usize,
    pub vehicles: u64,
    pub makes: usize,
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} vehicles, {} makes",
            self.records, self.vehicles, self.makes
        )
    }
}

/// Load a dataset file, or the embedded catalog when `path` is `None`
pub fn check_dataset(path: Option<&Path>) -> Result<DatasetSummary, CliError> {
    let owned;
    let store = match path {
        Some(path) => {
            owned = RecordStore::from_path(path)?;
            &owned
        }
        None => RecordStore::embedded()?,
    };

    Ok(DatasetSummary {
        records: store.len(),
        vehicles: store.total_vehicles(),
        makes: store.makes().len(),
    })
}

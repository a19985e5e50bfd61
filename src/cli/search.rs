//! Execute one search from raw parameters

use std::{path::PathBuf, time::Duration};

use super::{CliError, params};
use crate::{CancellationToken, Engine, QueryResult, RecordStore, output};

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Raw `make` parameter
    pub make: Option<String>,
    /// Raw `model` parameter
    pub model: Option<String>,
    /// Raw `budget` parameter
    pub budget: Option<String>,
    /// Raw `year` parameter
    pub year: Option<String>,
    /// Dataset file; the embedded catalog when `None`
    pub dataset: Option<PathBuf>,
    /// Abort the search after this long
    pub timeout: Option<Duration>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Result of a search command
#[derive(Debug)]
pub struct SearchOutput {
    pub result: QueryResult,
    /// Serialized response, compact or pretty per the options
    pub json: String,
}

/// Validate the parameters, run the search and serialize the response
pub fn execute_search(options: &SearchOptions) -> Result<SearchOutput, CliError> {
    let query = params::build_query(
        options.make.as_deref(),
        options.model.as_deref(),
        options.budget.as_deref(),
        options.year.as_deref(),
    )?;

    let owned;
    let store = match &options.dataset {
        Some(path) => {
            owned = RecordStore::from_path(path)?;
            &owned
        }
        None => RecordStore::embedded()?,
    };

    let result = Engine::new(store).search_with(query, CancellationToken::new(), options.timeout)?;

    let json = if options.pretty {
        output::to_json_pretty(&result)
    } else {
        output::to_json(&result)
    }?;

    Ok(SearchOutput { result, json })
}

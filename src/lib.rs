pub mod cancel;
pub mod cli;
pub mod engine;
pub mod matcher;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod stats;
pub mod store;

pub use cancel::CancellationToken;
pub use engine::{Engine, EngineError, SUGGESTION_LIMIT};
pub use model::{PriceStats, Query, QueryResult, VehicleRecord};
pub use output::{to_json, to_json_pretty};
pub use pipeline::{DistinctMakes, IndexStream, Pipeline};
pub use store::{LoadError, RecordStore};

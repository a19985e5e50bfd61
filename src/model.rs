//! # Vehicle Search Data Model
//!
//! The three value types that cross the engine boundary:
//!
//! - **[record]** - [`VehicleRecord`], one immutable catalog row owned by the record store
//! - **[query]** - [`Query`], the validated facets a caller searches by
//! - **[result]** - [`QueryResult`], the totals, price statistics and suggestions returned
//!
//! ## Absent Fields
//!
//! A query facet is absent when it holds its zero value (empty string, zero
//! budget, zero year). Absent facets are skipped by the pipeline; they are
//! never evaluated as "match nothing".
//!
//! ```
//! use carserv::Query;
//! use rust_decimal::Decimal;
//!
//! let query = Query::new().with_make("Ford").with_budget(Decimal::from(40000));
//! assert!(query.has_make());
//! assert!(!query.has_model());
//! assert!(query.has_budget());
//! ```
//!
//! ## Serialized Form
//!
//! ```text
//! {
//!   "total_vehicles": 147420,
//!   "make_model_total_vehicles": 16,
//!   "lowest": 36003.0,
//!   "median": 39616.0,
//!   "highest": 43665.0,
//!   "suggestions": [
//!     { "make": "Cadillac", "model": "Escalade", "price": 36003.0, "year": 2021, "vehicle_count": 1358 }
//!   ]
//! }
//! ```
//!
//! Zero totals, zero statistics and an empty suggestion list are left out of
//! the serialized object.
pub mod query;
pub mod record;
pub mod result;

pub use query::Query;
pub use record::VehicleRecord;
pub use result::{PriceStats, QueryResult};

//! In-memory permit dataset and the search engine that runs over it.
//!
//! [`DatasetStore`] owns the published snapshot and refreshes it from a
//! [`RecordSource`]; [`query::execute`] runs name, street and proximity
//! searches against a snapshot without touching I/O.

pub mod error;
pub mod geo;
pub mod mapper;
pub mod query;
pub mod source;
pub mod store;

pub use error::{EngineError, ErrorKind};
pub use geo::distance_km;
pub use mapper::{map_row, RawRow};
pub use query::{build_query, execute};
pub use source::{CsvFileSource, MemorySource, RecordSource, SourceRows};
pub use store::{Dataset, DatasetStore, LoadOutcome, StoreStatus};

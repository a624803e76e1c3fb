//! Parallel top-10 summaries of certified applications in large `;`-delimited
//! record files.
//!
//! The input is split into line-aligned byte chunks ([`process::split`]),
//! each chunk is cleaned and counted independently ([`process::chunk`]), the
//! partial counts are merged ([`tally::Merge`]) and the merged counts are
//! ranked ([`summary`]).

pub mod config;
pub mod error;
pub mod process;
pub mod record;
pub mod schema;
pub mod summary;
pub mod tally;

pub use config::Config;
pub use error::{Error, Result};
pub use process::{run, Aggregate};
pub use schema::{ColumnResolution, Field};
pub use summary::{select, write_results, RankedEntry, RankedResult};

pub mod resolve;
pub mod types;

pub use resolve::{ColumnResolution, DELIMITER};
pub use types::{ColumnRule, Field};

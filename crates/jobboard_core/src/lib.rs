//! Job board core: canonical record shape, merged table and configuration.
mod config;
mod record;
mod table;

pub use config::{AggregatorConfig, ConfigError, Filters, SourceEntry, SourceSettings};
pub use record::{JobRecord, COLUMNS};
pub use table::JobTable;

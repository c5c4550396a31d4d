//! Job board engine: fetch client, board adapters, registry and the
//! coordinator that merges every board into one table.
mod coordinator;
mod fetch;
mod normalize;
mod registry;
mod sources;
mod text;
mod types;

pub use coordinator::{Coordinator, FetchReport, SourceOutcome, SourceStatus};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use registry::{AdapterConstructor, SourceRegistry};
pub use sources::{
    JobicyAdapter, RawPayload, RemoteOkAdapter, SourceAdapter, DEFAULT_JOBICY_URL,
    DEFAULT_RELEVANCE_KEYWORDS, DEFAULT_REMOTEOK_URL, JOBICY, REMOTEOK,
};
pub use text::{html_to_block_text, html_to_text, keyword_pattern, strip_boilerplate};
pub use types::{FailureKind, FetchError, SourceError};

pub use jobboard_core::{
    AggregatorConfig, ConfigError, Filters, JobRecord, JobTable, SourceEntry, SourceSettings,
};

//! Board adapters: one per job board, each turning that board's API into
//! canonical [`JobRecord`]s.
mod jobicy;
mod remoteok;

use std::sync::Arc;

use jobboard_core::{JobRecord, SourceSettings};
use serde_json::Value;
use url::Url;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::SourceError;

pub use jobicy::{JobicyAdapter, DEFAULT_JOBICY_URL, JOBICY};
pub use remoteok::{RemoteOkAdapter, DEFAULT_RELEVANCE_KEYWORDS, DEFAULT_REMOTEOK_URL, REMOTEOK};

/// Undecoded board response, as returned by [`SourceAdapter::fetch_raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload(pub Value);

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Label stamped into every record's `source` field.
    fn name(&self) -> &str;

    async fn fetch_raw(&self, keywords: &[String]) -> Result<RawPayload, SourceError>;

    fn normalize(&self, raw: RawPayload) -> Result<Vec<JobRecord>, SourceError>;

    async fn fetch_records(&self, keywords: &[String]) -> Result<Vec<JobRecord>, SourceError> {
        let raw = self.fetch_raw(keywords).await?;
        self.normalize(raw)
    }
}

/// Endpoint override from settings, or the board default; must be absolute http(s).
pub(crate) fn resolve_endpoint(
    source_name: &str,
    settings: &SourceSettings,
    default: &str,
) -> Result<String, SourceError> {
    let endpoint = settings
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(default);
    let parsed = Url::parse(endpoint).map_err(|err| {
        SourceError::configuration(source_name, format!("invalid url '{endpoint}': {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SourceError::configuration(
            source_name,
            format!("unsupported url scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(endpoint.to_string())
}

pub(crate) fn fetch_settings(
    source_name: &str,
    settings: &SourceSettings,
) -> Result<FetchSettings, SourceError> {
    let request_timeout = settings
        .request_timeout()
        .map_err(|err| SourceError::configuration(source_name, err))?;
    let min_delay = settings
        .min_delay()
        .map_err(|err| SourceError::configuration(source_name, err))?;
    Ok(FetchSettings {
        request_timeout,
        min_delay,
        ..FetchSettings::default()
    })
}

pub(crate) fn default_fetcher(
    source_name: &str,
    settings: &SourceSettings,
) -> Result<Arc<dyn Fetcher>, SourceError> {
    let fetcher = ReqwestFetcher::new(fetch_settings(source_name, settings)?)
        .map_err(|err| SourceError::configuration(source_name, err))?;
    Ok(Arc::new(fetcher))
}

use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use jobboard_core::{JobRecord, SourceSettings};
use regex::Regex;
use serde_json::Value;

use super::{default_fetcher, fetch_settings, resolve_endpoint, RawPayload, SourceAdapter};
use crate::fetch::Fetcher;
use crate::normalize::{
    epoch_seconds, has_any_field, iso_date_prefix, joined_list, json_kind, list_items,
    number_or_zero, text_or_empty, JsonObject,
};
use crate::text::{html_to_block_text, keyword_pattern, strip_boilerplate};
use crate::SourceError;

pub const REMOTEOK: &str = "RemoteOK";
pub const DEFAULT_REMOTEOK_URL: &str = "https://remoteok.com/api";
pub const DEFAULT_RELEVANCE_KEYWORDS: [&str; 4] =
    ["analy", "data", "machine learning", "intelligence"];

const DESIRED_FIELDS: [&str; 10] = [
    "id",
    "url",
    "company",
    "position",
    "tags",
    "location",
    "description",
    "salary_min",
    "salary_max",
    "epoch",
];
const BOILERPLATE: &str = "Please mention the word.*";

/// RemoteOK returns every listing in one list, led by a legal-notice object.
/// Relevance filtering happens here, on title and tags.
pub struct RemoteOkAdapter {
    endpoint: String,
    fetcher: Arc<dyn Fetcher>,
    relevance: Option<Regex>,
    boilerplate: Regex,
}

impl RemoteOkAdapter {
    pub fn new(settings: &SourceSettings) -> Result<Self, SourceError> {
        let fetcher = default_fetcher(REMOTEOK, settings)?;
        Self::with_fetcher(settings, fetcher)
    }

    pub fn with_fetcher(
        settings: &SourceSettings,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, SourceError> {
        let endpoint = resolve_endpoint(REMOTEOK, settings, DEFAULT_REMOTEOK_URL)?;
        fetch_settings(REMOTEOK, settings)?;

        let relevance = match settings.relevance_keywords.as_deref() {
            Some(keywords) => keyword_pattern(keywords),
            None => keyword_pattern(&DEFAULT_RELEVANCE_KEYWORDS),
        }
        .map_err(|err| SourceError::configuration(REMOTEOK, err))?;
        let boilerplate =
            Regex::new(BOILERPLATE).map_err(|err| SourceError::configuration(REMOTEOK, err))?;

        Ok(Self {
            endpoint,
            fetcher,
            relevance,
            boilerplate,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_relevant(&self, job: &JsonObject) -> bool {
        let Some(pattern) = &self.relevance else {
            return false;
        };
        pattern.is_match(&text_or_empty(job, "position"))
            || list_items(job, "tags")
                .iter()
                .any(|tag| pattern.is_match(tag))
    }

    fn to_record(&self, job: &JsonObject) -> JobRecord {
        let description = html_to_block_text(&text_or_empty(job, "description"));

        let mut record = JobRecord::new(REMOTEOK);
        record.id = text_or_empty(job, "id");
        record.url = text_or_empty(job, "url").trim().to_string();
        record.company = text_or_empty(job, "company");
        record.position = text_or_empty(job, "position");
        record.description = strip_boilerplate(&description, &self.boilerplate);
        record.location = text_or_empty(job, "location");
        record.pub_date =
            epoch_seconds(job.get("epoch")).or_else(|| iso_date_prefix(job.get("date")));
        record.salary_min = number_or_zero(job, "salary_min");
        record.salary_max = number_or_zero(job, "salary_max");
        record.tags = joined_list(job, "tags");
        record
    }
}

#[async_trait::async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn name(&self) -> &str {
        REMOTEOK
    }

    /// One request for the whole board; `keywords` are not sent upstream.
    async fn fetch_raw(&self, _keywords: &[String]) -> Result<RawPayload, SourceError> {
        engine_info!(source: REMOTEOK, "Fetching data from {}", self.endpoint);
        let body = self.fetcher.get_json(&self.endpoint, &[]).await?;
        Ok(RawPayload(body))
    }

    fn normalize(&self, raw: RawPayload) -> Result<Vec<JobRecord>, SourceError> {
        let items = match raw.0 {
            Value::Array(items) => items,
            other => {
                engine_warn!(
                    source: REMOTEOK,
                    "Unexpected API response format, expected a list, got {}",
                    json_kind(&other)
                );
                return Ok(Vec::new());
            }
        };

        let jobs = match items.first().and_then(|first| first.get("legal")) {
            Some(notice) if !notice.is_null() => {
                engine_info!(source: REMOTEOK, "Legal notice: {}", notice);
                &items[1..]
            }
            _ if items.is_empty() => &items[..],
            _ => {
                engine_warn!(
                    source: REMOTEOK,
                    "First element does not appear to be metadata, processing all elements as jobs"
                );
                &items[..]
            }
        };

        if jobs.is_empty() {
            engine_warn!(source: REMOTEOK, "API returned an empty list of jobs");
            return Ok(Vec::new());
        }

        if !has_any_field(jobs, &DESIRED_FIELDS) {
            return Err(SourceError::schema_mismatch(REMOTEOK));
        }

        let mut dropped = 0usize;
        let mut records = Vec::new();
        for job in jobs.iter().filter_map(Value::as_object) {
            if !self.is_relevant(job) {
                continue;
            }
            let record = self.to_record(job);
            if record.is_usable() {
                records.push(record);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            engine_debug!(source: REMOTEOK, "Dropped {} relevant jobs without a url", dropped);
        }
        if records.is_empty() {
            engine_info!(source: REMOTEOK, "No relevant jobs found in listings");
        } else {
            engine_info!(
                source: REMOTEOK,
                "Kept {} relevant jobs out of {} listings",
                records.len(),
                jobs.len()
            );
        }
        Ok(records)
    }
}

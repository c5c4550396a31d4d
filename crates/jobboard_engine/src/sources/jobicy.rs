use std::collections::HashSet;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use jobboard_core::{JobRecord, SourceSettings};
use serde_json::{Map, Value};

use super::{default_fetcher, fetch_settings, resolve_endpoint, RawPayload, SourceAdapter};
use crate::fetch::Fetcher;
use crate::normalize::{
    has_any_field, iso_date_prefix, joined_list, json_kind, number_or_zero, text_field,
    text_or_empty, JsonObject,
};
use crate::text::html_to_text;
use crate::{FetchError, SourceError};

pub const JOBICY: &str = "Jobicy";
pub const DEFAULT_JOBICY_URL: &str = "https://jobicy.com/api/v2/remote-jobs";

const DESIRED_FIELDS: [&str; 16] = [
    "id",
    "url",
    "companyName",
    "jobTitle",
    "jobIndustry",
    "jobType",
    "jobGeo",
    "jobLevel",
    "jobDescription",
    "pubDate",
    "tags",
    "location",
    "salaryMin",
    "salaryMax",
    "salaryCurrency",
    "salaryPeriod",
];
const NOTICE_KEY: &str = "friendlyNotice";
const JOBS_KEY: &str = "jobs";
const ANY_LEVEL: &str = "Any";

/// Jobicy answers one `tag` per request, so every keyword is queried on its
/// own and the job lists are concatenated.
pub struct JobicyAdapter {
    endpoint: String,
    fetcher: Arc<dyn Fetcher>,
}

impl JobicyAdapter {
    pub fn new(settings: &SourceSettings) -> Result<Self, SourceError> {
        let fetcher = default_fetcher(JOBICY, settings)?;
        Self::with_fetcher(settings, fetcher)
    }

    pub fn with_fetcher(
        settings: &SourceSettings,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, SourceError> {
        let endpoint = resolve_endpoint(JOBICY, settings, DEFAULT_JOBICY_URL)?;
        fetch_settings(JOBICY, settings)?;
        Ok(Self { endpoint, fetcher })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn to_record(job: &JsonObject) -> JobRecord {
        let level = text_or_empty(job, "jobLevel");

        let mut record = JobRecord::new(JOBICY);
        record.id = text_or_empty(job, "id");
        record.url = text_or_empty(job, "url").trim().to_string();
        record.company = text_or_empty(job, "companyName");
        record.position = text_or_empty(job, "jobTitle");
        record.industry = joined_list(job, "jobIndustry").replace(" &amp;", ",");
        record.job_type = joined_list(job, "jobType");
        record.location = text_field(job, "jobGeo")
            .or_else(|| text_field(job, "location"))
            .unwrap_or_default();
        record.job_level = if level.trim() == ANY_LEVEL {
            String::new()
        } else {
            level
        };
        record.description = html_to_text(&text_or_empty(job, "jobDescription"));
        record.pub_date = iso_date_prefix(job.get("pubDate"));
        record.tags = joined_list(job, "tags");
        record.salary_min = number_or_zero(job, "salaryMin");
        record.salary_max = number_or_zero(job, "salaryMax");
        record.currency = text_or_empty(job, "salaryCurrency");
        record.salary_period = text_or_empty(job, "salaryPeriod");
        record
    }
}

#[async_trait::async_trait]
impl SourceAdapter for JobicyAdapter {
    fn name(&self) -> &str {
        JOBICY
    }

    /// Queries each keyword in turn. A failed keyword is logged and skipped;
    /// the call only fails when every request failed.
    async fn fetch_raw(&self, keywords: &[String]) -> Result<RawPayload, SourceError> {
        engine_info!(source: JOBICY, "Fetching data from {}", self.endpoint);

        let mut notice = String::new();
        let mut jobs = Vec::new();
        let mut succeeded = 0usize;
        let mut last_error: Option<FetchError> = None;

        for keyword in keywords {
            engine_info!(source: JOBICY, "Fetching jobs for keyword: {}", keyword);
            let body = match self
                .fetcher
                .get_json(&self.endpoint, &[("tag", keyword.as_str())])
                .await
            {
                Ok(body) => body,
                Err(err) => {
                    engine_warn!(
                        source: JOBICY,
                        "No data received for keyword '{}': {}",
                        keyword,
                        err
                    );
                    last_error = Some(err);
                    continue;
                }
            };
            succeeded += 1;

            match body {
                Value::Object(map) if map.is_empty() => {
                    engine_info!(source: JOBICY, "Found no '{}' jobs", keyword);
                }
                Value::Object(mut map) => {
                    if let Some(Value::String(text)) = map.remove(NOTICE_KEY) {
                        notice = text;
                    }
                    let found = match map.remove(JOBS_KEY) {
                        Some(Value::Array(found)) => found,
                        _ => Vec::new(),
                    };
                    engine_info!(
                        source: JOBICY,
                        "Found {} jobs for keyword '{}'",
                        found.len(),
                        keyword
                    );
                    jobs.extend(found);
                }
                other => {
                    engine_error!(
                        source: JOBICY,
                        "Unexpected API response format, expected an object, got {}",
                        json_kind(&other)
                    );
                }
            }
        }

        if succeeded == 0 {
            if let Some(err) = last_error {
                return Err(err.into());
            }
        }
        if jobs.is_empty() {
            engine_warn!(source: JOBICY, "No jobs found for any keyword");
        }

        let mut envelope = Map::new();
        envelope.insert(NOTICE_KEY.to_string(), Value::String(notice));
        envelope.insert(JOBS_KEY.to_string(), Value::Array(jobs));
        Ok(RawPayload(Value::Object(envelope)))
    }

    fn normalize(&self, raw: RawPayload) -> Result<Vec<JobRecord>, SourceError> {
        let mut envelope = match raw.0 {
            Value::Object(envelope) => envelope,
            other => {
                engine_warn!(
                    source: JOBICY,
                    "Unexpected payload, expected an object, got {}",
                    json_kind(&other)
                );
                return Ok(Vec::new());
            }
        };

        if let Some(notice) = envelope
            .get(NOTICE_KEY)
            .and_then(Value::as_str)
            .filter(|notice| !notice.is_empty())
        {
            engine_info!(source: JOBICY, "Notice: {}", notice);
        }

        let jobs = match envelope.remove(JOBS_KEY) {
            Some(Value::Array(jobs)) => jobs,
            _ => Vec::new(),
        };
        if jobs.is_empty() {
            engine_warn!(source: JOBICY, "No job data provided");
            return Ok(Vec::new());
        }
        engine_info!(source: JOBICY, "Normalizing {} job entries", jobs.len());

        if !has_any_field(&jobs, &DESIRED_FIELDS) {
            return Err(SourceError::schema_mismatch(JOBICY));
        }

        let (unique, repeated) = collapse_repeated_ids(&jobs);
        if repeated > 0 {
            engine_debug!(source: JOBICY, "Collapsed {} repeated job entries", repeated);
        }

        let mut dropped = 0usize;
        let mut records = Vec::with_capacity(unique.len());
        for job in unique {
            let record = Self::to_record(job);
            if record.is_usable() {
                records.push(record);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            engine_debug!(source: JOBICY, "Dropped {} jobs without a url", dropped);
        }
        if records.is_empty() {
            engine_info!(source: JOBICY, "No unique jobs found after deduplication");
        }
        Ok(records)
    }
}

/// Keeps the first job object per board id and reports how many repeats were
/// collapsed. The same posting comes back under several keywords. Entries
/// without an id are all kept and non-object entries are skipped.
fn collapse_repeated_ids(jobs: &[Value]) -> (Vec<&JsonObject>, usize) {
    let objects: Vec<&JsonObject> = jobs.iter().filter_map(Value::as_object).collect();
    let total = objects.len();
    let mut seen_ids = HashSet::new();
    let unique: Vec<&JsonObject> = objects
        .into_iter()
        .filter(|job| match text_field(job, "id") {
            Some(id) => seen_ids.insert(id),
            None => true,
        })
        .collect();
    let repeated = total - unique.len();
    (unique, repeated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeats_exclude_non_object_entries() {
        let jobs = vec![
            json!({"id": 1, "url": "a"}),
            json!("not a job"),
            json!({"id": 1, "url": "a"}),
            json!(null),
            json!({"url": "no-id"}),
            json!({"url": "no-id"}),
        ];
        let (unique, repeated) = collapse_repeated_ids(&jobs);
        assert_eq!(repeated, 1);
        assert_eq!(unique.len(), 3);
    }
}

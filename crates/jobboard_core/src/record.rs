use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical column names, in the order downstream consumers expect them.
pub const COLUMNS: [&str; 16] = [
    "id",
    "url",
    "company",
    "position",
    "description",
    "location",
    "pubDate",
    "salaryMin",
    "salaryMax",
    "industry",
    "jobType",
    "jobLevel",
    "tags",
    "currency",
    "salaryPeriod",
    "source",
];

/// One job posting in the shape shared by every board.
///
/// Every field is always present. Missing board data is represented by the
/// field default: empty strings, `0.0` salaries (meaning unknown, not unpaid)
/// and `None` for an unknown publication date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Board-local identifier. Not unique across boards.
    pub id: String,
    /// Identity key used for cross-board deduplication.
    pub url: String,
    pub company: String,
    pub position: String,
    /// Plain text with markup and board boilerplate removed.
    pub description: String,
    pub location: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub salary_min: f64,
    pub salary_max: f64,
    pub currency: String,
    pub salary_period: String,
    /// Comma-joined when the board returns a list.
    pub industry: String,
    /// Comma-joined when the board returns a list.
    pub job_type: String,
    pub job_level: String,
    /// Comma-joined tag list.
    pub tags: String,
    /// Name of the adapter that produced the record.
    pub source: String,
}

impl JobRecord {
    /// Creates a record with every field at its default, stamped with `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            url: String::new(),
            company: String::new(),
            position: String::new(),
            description: String::new(),
            location: String::new(),
            pub_date: None,
            salary_min: 0.0,
            salary_max: 0.0,
            currency: String::new(),
            salary_period: String::new(),
            industry: String::new(),
            job_type: String::new(),
            job_level: String::new(),
            tags: String::new(),
            source: source.into(),
        }
    }

    /// A record without a url cannot take part in deduplication.
    pub fn is_usable(&self) -> bool {
        !self.url.trim().is_empty() && !self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{JobRecord, COLUMNS};

    #[test]
    fn new_record_carries_defaults_and_source() {
        let record = JobRecord::new("Jobicy");
        assert_eq!(record.source, "Jobicy");
        assert_eq!(record.salary_min, 0.0);
        assert_eq!(record.salary_max, 0.0);
        assert!(record.pub_date.is_none());
        assert!(record.job_level.is_empty());
        assert!(!record.is_usable());
    }

    #[test]
    fn serialized_record_has_every_canonical_column() {
        let value = serde_json::to_value(JobRecord::new("RemoteOK")).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(object.contains_key(column), "missing column {column}");
        }
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

pub(crate) type JsonObject = Map<String, Value>;

/// Scalar field rendered as text. Numbers and booleans are stringified;
/// null, lists and objects count as missing.
pub(crate) fn text_field(job: &JsonObject, key: &str) -> Option<String> {
    match job.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(crate) fn text_or_empty(job: &JsonObject, key: &str) -> String {
    text_field(job, key).unwrap_or_default()
}

/// List field flattened to a comma-joined string. A plain string is kept as is.
pub(crate) fn joined_list(job: &JsonObject, key: &str) -> String {
    match job.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(text)) => text.trim().to_string(),
        _ => String::new(),
    }
}

pub(crate) fn list_items(job: &JsonObject, key: &str) -> Vec<String> {
    match job.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => vec![text.clone()],
        _ => Vec::new(),
    }
}

/// Numeric field, accepting numbers or numeric strings. Anything else,
/// including non-finite values, is the "unknown" default of `0.0`.
pub(crate) fn number_or_zero(job: &JsonObject, key: &str) -> f64 {
    let parsed = match job.get(key) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Epoch seconds given as a number or numeric string.
pub(crate) fn epoch_seconds(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let seconds = match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    DateTime::from_timestamp(seconds, 0)
}

/// Midnight UTC of the `YYYY-MM-DD` prefix of a date or datetime string.
pub(crate) fn iso_date_prefix(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let text = value?.as_str()?.trim();
    let prefix = text.get(..10)?;
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// True when at least one job object carries at least one of `fields`.
pub(crate) fn has_any_field(jobs: &[Value], fields: &[&str]) -> bool {
    jobs.iter()
        .filter_map(Value::as_object)
        .any(|job| fields.iter().any(|field| job.contains_key(*field)))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn ids_are_rendered_as_text() {
        let job = object(json!({"id": 42, "slug": "x", "missing": null}));
        assert_eq!(text_field(&job, "id").as_deref(), Some("42"));
        assert_eq!(text_field(&job, "slug").as_deref(), Some("x"));
        assert_eq!(text_field(&job, "missing"), None);
        assert_eq!(text_or_empty(&job, "absent"), "");
    }

    #[test]
    fn lists_are_comma_joined() {
        let job = object(json!({"tags": ["data", " sql ", "", 3], "single": "ops", "other": {}}));
        assert_eq!(joined_list(&job, "tags"), "data, sql, 3");
        assert_eq!(joined_list(&job, "single"), "ops");
        assert_eq!(joined_list(&job, "other"), "");
        assert_eq!(joined_list(&job, "absent"), "");
    }

    #[test]
    fn salaries_coerce_or_default_to_zero() {
        let job = object(json!({"a": 50000, "b": "70,000", "c": "n/a", "d": null}));
        assert_eq!(number_or_zero(&job, "a"), 50000.0);
        assert_eq!(number_or_zero(&job, "b"), 70000.0);
        assert_eq!(number_or_zero(&job, "c"), 0.0);
        assert_eq!(number_or_zero(&job, "d"), 0.0);
        assert_eq!(number_or_zero(&job, "absent"), 0.0);
    }

    #[test]
    fn epoch_seconds_parse_numbers_and_strings() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(epoch_seconds(Some(&json!(1_700_000_000))), expected);
        assert_eq!(epoch_seconds(Some(&json!("1700000000"))), expected);
        assert_eq!(epoch_seconds(Some(&json!("soon"))), None);
        assert_eq!(epoch_seconds(None), None);
    }

    #[test]
    fn iso_prefix_ignores_time_part() {
        let parsed = iso_date_prefix(Some(&json!("2024-03-05 14:22:01"))).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T00:00:00+00:00");
        assert_eq!(iso_date_prefix(Some(&json!("2024-13-40"))), None);
        assert_eq!(iso_date_prefix(Some(&json!("short"))), None);
        assert_eq!(iso_date_prefix(Some(&json!(12))), None);
    }
}

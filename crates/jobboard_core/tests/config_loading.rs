use std::fs;

use jobboard_core::{AggregatorConfig, ConfigError, SourceSettings};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SAMPLE: &str = r#"
(
    sources: [
        (name: "remoteok", settings: (enabled: true, timeout: 15.0, rate_limit_delay: 0.5)),
        (name: "jobicy", settings: (enabled: false, url: "https://jobicy.example/api")),
        (name: "jooble"),
    ],
    filters: (keywords: ["data", "analyst"]),
    max_concurrent_sources: 2,
)
"#;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

#[test]
fn parses_sources_in_configured_order() {
    init_logging();
    let config = AggregatorConfig::from_ron_str(SAMPLE).unwrap();

    assert_eq!(
        config.available_sources(),
        vec!["remoteok", "jobicy", "jooble"]
    );
    assert_eq!(config.enabled_sources(), vec!["remoteok"]);
    assert_eq!(config.filters.keywords, vec!["data", "analyst"]);
    assert_eq!(config.max_concurrent_sources, 2);
    assert_eq!(config.source_deadline_secs, 120.0);

    let jobicy = config.source("jobicy").unwrap();
    assert_eq!(jobicy.url.as_deref(), Some("https://jobicy.example/api"));
    assert_eq!(jobicy.timeout, 10.0);

    let remoteok = config.source("remoteok").unwrap();
    assert_eq!(remoteok.request_timeout().unwrap().as_secs(), 15);
    assert_eq!(remoteok.min_delay().unwrap().as_millis(), 500);
}

#[test]
fn missing_blocks_fall_back_to_defaults() {
    let config = AggregatorConfig::from_ron_str("()").unwrap();
    assert!(config.sources.is_empty());
    assert_eq!(config.filters.keywords, vec!["data"]);
    assert_eq!(config.max_concurrent_sources, 4);
    assert!(config.enabled_sources().is_empty());
}

#[test]
fn rejects_duplicate_source_names() {
    let err = AggregatorConfig::from_ron_str(
        r#"(sources: [(name: "jobicy"), (name: "jobicy")])"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("more than once")));
}

#[test]
fn rejects_negative_delay_and_zero_parallelism() {
    let config = AggregatorConfig::default().with_source(
        "remoteok",
        SourceSettings {
            rate_limit_delay: -1.0,
            ..SourceSettings::enabled()
        },
    );
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = AggregatorConfig {
        max_concurrent_sources: 0,
        ..AggregatorConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn malformed_ron_is_a_parse_error() {
    let err = AggregatorConfig::from_ron_str("(sources: [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file_and_reports_missing_path() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sources.ron");
    fs::write(&path, SAMPLE).unwrap();

    let config = AggregatorConfig::load(&path).unwrap();
    assert_eq!(config.sources.len(), 3);

    let err = AggregatorConfig::load(&temp.path().join("missing.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

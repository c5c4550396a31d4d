use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use futures_util::future::join_all;
use jobboard_core::{AggregatorConfig, ConfigError, JobRecord, JobTable, SourceSettings};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::registry::SourceRegistry;
use crate::sources::SourceAdapter;
use crate::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Fetched(usize),
    Empty,
    Failed(String),
    NotConfigured,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub name: String,
    pub status: SourceStatus,
}

impl SourceOutcome {
    fn new(name: &str, status: SourceStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Result of one aggregation run. Only `table` is data; the rest is for
/// observability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub table: JobTable,
    pub contributing_sources: usize,
    pub duplicates_removed: usize,
    /// One entry per resolved source name, in resolution order.
    pub outcomes: Vec<SourceOutcome>,
}

enum Slot {
    Resolved(SourceOutcome),
    Running(String),
}

type SourceTask = JoinHandle<Result<Vec<JobRecord>, SourceError>>;

/// Runs every resolved source in isolation and merges their records.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: AggregatorConfig,
    registry: Arc<SourceRegistry>,
    deadline: Duration,
}

impl Coordinator {
    pub fn new(config: AggregatorConfig) -> Result<Self, ConfigError> {
        Self::with_registry(config, SourceRegistry::with_builtin())
    }

    pub fn with_registry(
        config: AggregatorConfig,
        registry: SourceRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let deadline = config.source_deadline()?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
            deadline,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn available_sources(&self) -> Vec<String> {
        self.config.available_sources()
    }

    pub fn enabled_sources(&self) -> Vec<String> {
        self.config.enabled_sources()
    }

    /// Fetches from `source_names`, or from every enabled source when `None`.
    ///
    /// Never fails: a source that cannot be built, fetched or normalized is
    /// logged and contributes zero records. Sources run concurrently, but
    /// records are merged in the order of the resolved names so the
    /// keep-first url dedup is deterministic.
    pub async fn fetch_all(&self, source_names: Option<&[String]>) -> FetchReport {
        let names = match source_names {
            Some(names) => names.to_vec(),
            None => self.config.enabled_sources(),
        };
        if names.is_empty() {
            engine_warn!("No sources enabled or specified");
            return FetchReport::default();
        }
        engine_info!("Starting job collection from sources: {:?}", names);

        let keywords: Arc<[String]> = self.config.filters.keywords.clone().into();
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent_sources.max(1)));
        let deadline = self.deadline;

        let mut slots = Vec::with_capacity(names.len());
        let mut tasks: Vec<SourceTask> = Vec::new();
        for name in &names {
            match self.start_source(name, &keywords, &limiter, deadline) {
                Ok(task) => {
                    tasks.push(task);
                    slots.push(Slot::Running(name.clone()));
                }
                Err(outcome) => slots.push(Slot::Resolved(outcome)),
            }
        }

        let mut results = join_all(tasks).await.into_iter();
        let mut outcomes = Vec::with_capacity(slots.len());
        let mut parts = Vec::new();
        for slot in slots {
            let name = match slot {
                Slot::Resolved(outcome) => {
                    outcomes.push(outcome);
                    continue;
                }
                Slot::Running(name) => name,
            };
            let result = match results.next() {
                Some(Ok(result)) => result,
                Some(Err(join_err)) => Err(SourceError::Task {
                    source_name: name.clone(),
                    message: join_err.to_string(),
                }),
                None => Err(SourceError::Task {
                    source_name: name.clone(),
                    message: "task result missing".into(),
                }),
            };
            let status = match result {
                Ok(records) if !records.is_empty() => {
                    engine_info!(source: name, "Successfully fetched {} jobs", records.len());
                    let count = records.len();
                    parts.push(records);
                    SourceStatus::Fetched(count)
                }
                Ok(_) => {
                    engine_warn!(source: name, "No jobs returned");
                    SourceStatus::Empty
                }
                Err(err) => {
                    engine_error!(source: name, "Error fetching jobs: {}", err);
                    SourceStatus::Failed(err.to_string())
                }
            };
            outcomes.push(SourceOutcome { name, status });
        }

        if parts.is_empty() {
            engine_warn!("No jobs were successfully fetched from any source");
            return FetchReport {
                outcomes,
                ..FetchReport::default()
            };
        }

        let contributing_sources = parts.len();
        let mut table = JobTable::concat(parts);
        let duplicates_removed = table.dedup_by_url();
        if duplicates_removed > 0 {
            engine_info!("Removed {} duplicate jobs", duplicates_removed);
        }
        engine_info!(
            "Successfully collected {} unique jobs from {} sources",
            table.len(),
            contributing_sources
        );

        FetchReport {
            table,
            contributing_sources,
            duplicates_removed,
            outcomes,
        }
    }

    /// Runs [`Coordinator::fetch_all`] on a fresh Tokio runtime. Must not be
    /// called from inside another runtime.
    pub fn fetch_all_blocking(
        &self,
        source_names: Option<&[String]>,
    ) -> std::io::Result<FetchReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.fetch_all(source_names)))
    }

    /// Resolves one name to a spawned task, or to the outcome explaining why
    /// it was not started.
    fn start_source(
        &self,
        name: &str,
        keywords: &Arc<[String]>,
        limiter: &Arc<Semaphore>,
        deadline: Duration,
    ) -> Result<SourceTask, SourceOutcome> {
        let Some(settings) = self.config.source(name) else {
            engine_error!(source: name, "Source not found in configuration");
            return Err(SourceOutcome::new(name, SourceStatus::NotConfigured));
        };
        if !settings.enabled {
            engine_info!(source: name, "Skipping disabled source");
            return Err(SourceOutcome::new(name, SourceStatus::Disabled));
        }

        Ok(tokio::spawn(run_source(
            name.to_string(),
            self.registry.clone(),
            settings.clone(),
            keywords.clone(),
            limiter.clone(),
            deadline,
        )))
    }
}

/// Builds the adapter and runs it under the concurrency limit and deadline.
/// Construction happens inside the task so a panicking constructor is
/// isolated like a panicking fetch.
async fn run_source(
    name: String,
    registry: Arc<SourceRegistry>,
    settings: SourceSettings,
    keywords: Arc<[String]>,
    limiter: Arc<Semaphore>,
    deadline: Duration,
) -> Result<Vec<JobRecord>, SourceError> {
    engine_info!(source: name, "Initializing adapter");
    let adapter: Box<dyn SourceAdapter> = registry.create(&name, &settings)?;

    let _permit = limiter
        .acquire_owned()
        .await
        .map_err(|err| SourceError::Task {
            source_name: name.clone(),
            message: err.to_string(),
        })?;

    engine_info!(source: name, "Fetching jobs from {}", adapter.name());
    match tokio::time::timeout(deadline, adapter.fetch_records(&keywords)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::DeadlineExceeded {
            source_name: name,
            after: deadline,
        }),
    }
}

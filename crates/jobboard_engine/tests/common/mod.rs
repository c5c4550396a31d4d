#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use jobboard_engine::{FailureKind, FetchError, Fetcher};
use serde_json::Value;

/// In-memory fetcher keyed by the `tag` query parameter ("" when absent).
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Result<Value, FetchError>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, tag: &str, body: Value) -> Self {
        self.responses.insert(tag.to_string(), Ok(body));
        self
    }

    pub fn fail(mut self, tag: &str, kind: FailureKind) -> Self {
        self.responses.insert(
            tag.to_string(),
            Err(FetchError {
                kind,
                message: "stubbed failure".to_string(),
            }),
        );
        self
    }

    /// Tags requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn get_json(&self, _url: &str, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let tag = params
            .iter()
            .find(|(key, _)| *key == "tag")
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(tag.clone());
        self.responses.get(&tag).cloned().unwrap_or_else(|| {
            Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: format!("no stub for tag '{tag}'"),
            })
        })
    }
}

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

use std::collections::HashMap;

use jobboard_core::SourceSettings;

use crate::sources::{JobicyAdapter, RemoteOkAdapter, SourceAdapter};
use crate::SourceError;

pub type AdapterConstructor = fn(&SourceSettings) -> Result<Box<dyn SourceAdapter>, SourceError>;

/// Static mapping from configured source name to adapter constructor.
#[derive(Clone)]
pub struct SourceRegistry {
    constructors: HashMap<String, AdapterConstructor>,
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with the `remoteok` and `jobicy` boards.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("remoteok", build_remoteok);
        registry.register("jobicy", build_jobicy);
        registry
    }

    /// Adds or replaces the constructor for `name`.
    pub fn register(&mut self, name: &str, constructor: AdapterConstructor) {
        self.constructors.insert(registry_key(name), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&registry_key(name))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn create(
        &self,
        name: &str,
        settings: &SourceSettings,
    ) -> Result<Box<dyn SourceAdapter>, SourceError> {
        let constructor = self
            .constructors
            .get(&registry_key(name))
            .ok_or_else(|| SourceError::UnknownSource(name.to_string()))?;
        constructor(settings)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("names", &self.names())
            .finish()
    }
}

fn registry_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn build_remoteok(settings: &SourceSettings) -> Result<Box<dyn SourceAdapter>, SourceError> {
    Ok(Box::new(RemoteOkAdapter::new(settings)?))
}

fn build_jobicy(settings: &SourceSettings) -> Result<Box<dyn SourceAdapter>, SourceError> {
    Ok(Box::new(JobicyAdapter::new(settings)?))
}

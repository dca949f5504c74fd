use crate::engine_trait::RecognizerEngine;
use std::collections::HashMap;
use talkwire_core::{EngineError, ModelSource};

pub type EngineFactory = fn(&ModelSource) -> Result<Box<dyn RecognizerEngine>, EngineError>;

/// Maps model type names to engine factories. Concrete bindings (sherpa,
/// whisper, ...) register themselves here; `scripted` is built in.
#[derive(Clone)]
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("scripted", crate::scripted::ScriptedEngine::from_source);
        registry
    }

    pub fn register(&mut self, name: &str, factory: EngineFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, source: &ModelSource) -> Result<Box<dyn RecognizerEngine>, EngineError> {
        self.factories
            .get(&source.model)
            .ok_or_else(|| EngineError::NotFound(source.model.clone()))
            .and_then(|factory| factory(source))
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

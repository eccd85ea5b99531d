use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{Program, Prompt};
use crate::collections::ConcurrentMap;
use crate::error::Result;

/// Name → prompt table consulted by `use` statements.
///
/// Registration may race with execution: lookups hand out an `Arc` snapshot of the
/// prompt, so a concurrent overwrite never tears a prompt that is already running.
#[derive(Default)]
pub struct PromptRegistry {
    prompts: ConcurrentMap<String, Arc<Prompt>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Registers the program's entry prompt under `name`; the last registration wins.
    pub fn register(&self, name: impl Into<String>, program: &Program) -> Result<()> {
        let Some(entry) = program.entry() else {
            crate::bail!("cannot register an empty program");
        };
        let name = name.into();
        if self
            .prompts
            .insert(name.clone(), Arc::new(entry.clone()))
            .is_some()
        {
            tracing::debug!("prompt '{}' re-registered", name);
        }
        Ok(())
    }

    /// Registers a prompt under its own declared name.
    pub fn register_prompt(&self, prompt: Prompt) {
        let name = prompt.name.clone();
        if self.prompts.insert(name.clone(), Arc::new(prompt)).is_some() {
            tracing::debug!("prompt '{}' re-registered", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Prompt>> {
        self.prompts.get_cloned(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn snapshot(&self) -> HashMap<String, Arc<Prompt>> {
        self.prompts.snapshot()
    }

    pub fn reset(&self) {
        self.prompts.clear();
    }
}

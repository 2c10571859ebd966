use std::collections::HashMap;

use tracing::{debug, warn};

use crate::block::Block;

type Factory = Box<dyn Fn() -> Box<dyn Block>>;

/// Maps block names to factories. Every block occurrence gets a fresh
/// handler, so no state leaks between instances.
#[derive(Default)]
pub struct BlockRegistry {
    factories: HashMap<&'static str, Factory>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        BlockRegistry::default()
    }

    /// Register `factory` under `name`. A later registration of the same
    /// name replaces the earlier one.
    pub fn register<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn Block> + 'static,
    {
        if self.factories.insert(name, Box::new(factory)).is_some() {
            warn!(block = name, "block registered twice, replacing previous handler");
        } else {
            debug!(block = name, "registered block");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Block>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("names", &self.names())
            .finish()
    }
}

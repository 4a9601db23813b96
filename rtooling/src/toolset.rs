//! Registry paired with the adapters that back each entry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::{
    FunctionAdapter, Parameters, RegistryError, ToolAdapter, ToolDescriptor, ToolError,
    ToolExecutionContext, ToolRegistry,
};

#[derive(Clone, Default)]
pub struct ToolSet {
    registry: Arc<ToolRegistry>,
    adapters: HashMap<String, Arc<dyn ToolAdapter>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A>(&mut self, adapter: A) -> Result<(), RegistryError>
    where
        A: ToolAdapter + 'static,
    {
        self.register_shared(Arc::new(adapter))
    }

    pub fn register_shared(&mut self, adapter: Arc<dyn ToolAdapter>) -> Result<(), RegistryError> {
        let descriptor = adapter.descriptor();
        let name = descriptor.name.clone();
        Arc::make_mut(&mut self.registry).register(descriptor)?;
        self.adapters.insert(name, adapter);
        Ok(())
    }

    pub fn register_fn<F, Fut>(
        &mut self,
        descriptor: ToolDescriptor,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Parameters, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionAdapter::new(descriptor, handler))
    }

    pub fn with<A>(mut self, adapter: A) -> Result<Self, RegistryError>
    where
        A: ToolAdapter + 'static,
    {
        self.register(adapter)?;
        Ok(self)
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn adapter(&self, name: &str) -> Option<Arc<dyn ToolAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field(
                "tools",
                &self
                    .registry
                    .list()
                    .map(|descriptor| descriptor.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

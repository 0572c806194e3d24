//! Process-wide resource registry.
//!
//! # Responsibilities
//! - Own every descriptor for the lifetime of the process
//! - Resolve parent names at registration time
//! - Build the dispatcher tree (roots with their children)
//!
//! # Design Decisions
//! - Parents must be registered before their children
//! - Registration order is mount order

use std::sync::Arc;

use crate::config::ResourceConfig;
use crate::resource::descriptor::{ResourceDescriptor, ResourceSpec};
use crate::resource::dispatch::Dispatcher;
use crate::resource::error::ResourceError;
use crate::store::{DocumentStore, Schema};

/// Owns the store handle and all registered descriptors.
pub struct ResourceRegistry {
    store: Arc<dyn DocumentStore>,
    resources: Vec<Arc<ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            resources: Vec::new(),
        }
    }

    /// Build a registry from configured resources, in file order.
    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        resources: &[ResourceConfig],
    ) -> Result<Self, ResourceError> {
        let mut registry = Self::new(store);
        for config in resources {
            registry.register(ResourceSpec::from(config), config.parent.as_deref())?;
        }
        Ok(registry)
    }

    /// Register a resource, optionally under the parent named `parent`.
    pub fn register(
        &mut self,
        spec: ResourceSpec,
        parent: Option<&str>,
    ) -> Result<Arc<ResourceDescriptor>, ResourceError> {
        let parent = match parent {
            Some(parent_name) => {
                let parent_name = parent_name.trim().to_lowercase();
                let found = self.get(&parent_name).cloned().ok_or_else(|| {
                    ResourceError::UnknownParent {
                        name: spec
                            .title
                            .as_deref()
                            .unwrap_or_default()
                            .trim()
                            .to_lowercase(),
                        parent: parent_name,
                    }
                })?;
                Some(found)
            }
            None => None,
        };

        let descriptor = ResourceDescriptor::new(spec, parent.as_ref(), &self.store)?;
        self.resources.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.resources.iter().find(|r| r.name() == name)
    }

    pub fn resources(&self) -> &[Arc<ResourceDescriptor>] {
        &self.resources
    }

    /// One dispatcher per root resource, each carrying its child dispatchers.
    pub fn mounts(&self) -> Vec<Arc<Dispatcher>> {
        self.resources
            .iter()
            .filter(|r| !r.has_parent())
            .map(|r| self.build_dispatcher(r))
            .collect()
    }

    fn build_dispatcher(&self, descriptor: &Arc<ResourceDescriptor>) -> Arc<Dispatcher> {
        let children = self
            .resources
            .iter()
            .filter(|r| {
                r.parent()
                    .map(|p| Arc::ptr_eq(&p, descriptor))
                    .unwrap_or(false)
            })
            .map(|r| self.build_dispatcher(r))
            .collect();
        Arc::new(Dispatcher::new(Arc::clone(descriptor), children))
    }
}

impl From<&ResourceConfig> for ResourceSpec {
    fn from(config: &ResourceConfig) -> Self {
        Self {
            title: config.title.clone(),
            methods: config.methods.clone(),
            schema: Schema::new(config.schema.clone()),
            fields: config.fields.clone(),
            detail_url: config.detail_url.clone(),
            excludes: config.excludes.clone(),
        }
    }
}

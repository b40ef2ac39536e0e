//! Plugin-based adapter registry
//!
//! Adapters are registered by type-name suffix instead of being listed in
//! a hardcoded match. Schemas can be served straight from the factories,
//! before any client exists; instances are only built once the provider is
//! configured and the shared client is available.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loopia_core::registry::{AdapterFactory, AdapterRegistry};
//! use loopia_core::adapters::SubdomainResource;
//!
//! let mut registry = AdapterRegistry::new();
//! registry.register_resource(Box::new(AdapterFactory::<SubdomainResource>::new()));
//!
//! let schema = registry.resource_schema("subdomain");
//! let adapters = registry.instantiate(client);
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::host::Schema;
use crate::traits::{Adapter, DataSource, Resource, SharedClient};

/// Factory for one resource type
pub trait ResourceFactory: Send + Sync {
    /// Type-name suffix
    fn type_name(&self) -> &'static str;

    /// Schema declared to the host
    fn schema(&self) -> Schema;

    /// Build an instance around the shared client
    fn create(&self, client: SharedClient) -> Arc<dyn Resource>;
}

/// Factory for one data-source type
pub trait DataSourceFactory: Send + Sync {
    /// Type-name suffix
    fn type_name(&self) -> &'static str;

    /// Schema declared to the host
    fn schema(&self) -> Schema;

    /// Build an instance around the shared client
    fn create(&self, client: SharedClient) -> Arc<dyn DataSource>;
}

/// Generic factory for any [`Adapter`]
pub struct AdapterFactory<T>(PhantomData<fn() -> T>);

impl<T> AdapterFactory<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for AdapterFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceFactory for AdapterFactory<T>
where
    T: Adapter + Resource + 'static,
{
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        T::schema()
    }

    fn create(&self, client: SharedClient) -> Arc<dyn Resource> {
        Arc::new(T::with_client(client))
    }
}

impl<T> DataSourceFactory for AdapterFactory<T>
where
    T: Adapter + DataSource + 'static,
{
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        T::schema()
    }

    fn create(&self, client: SharedClient) -> Arc<dyn DataSource> {
        Arc::new(T::with_client(client))
    }
}

/// Adapter instances bound to one client
#[derive(Clone, Default)]
pub struct Adapters {
    pub resources: BTreeMap<String, Arc<dyn Resource>>,
    pub data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

/// Registry of adapter factories keyed by type-name suffix
#[derive(Default)]
pub struct AdapterRegistry {
    resources: BTreeMap<String, Box<dyn ResourceFactory>>,
    data_sources: BTreeMap<String, Box<dyn DataSourceFactory>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource factory. A later registration under the same
    /// name replaces the earlier one.
    pub fn register_resource(&mut self, factory: Box<dyn ResourceFactory>) {
        self.resources
            .insert(factory.type_name().to_string(), factory);
    }

    /// Register a data-source factory
    pub fn register_data_source(&mut self, factory: Box<dyn DataSourceFactory>) {
        self.data_sources
            .insert(factory.type_name().to_string(), factory);
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn has_data_source(&self, name: &str) -> bool {
        self.data_sources.contains_key(name)
    }

    /// Registered resource type-name suffixes, sorted
    pub fn list_resources(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    /// Registered data-source type-name suffixes, sorted
    pub fn list_data_sources(&self) -> Vec<String> {
        self.data_sources.keys().cloned().collect()
    }

    pub fn resource_schema(&self, name: &str) -> Option<Schema> {
        self.resources.get(name).map(|f| f.schema())
    }

    pub fn data_source_schema(&self, name: &str) -> Option<Schema> {
        self.data_sources.get(name).map(|f| f.schema())
    }

    /// Build every registered adapter around the same client
    pub fn instantiate(&self, client: SharedClient) -> Adapters {
        let resources = self
            .resources
            .iter()
            .map(|(name, f)| (name.clone(), f.create(client.clone())))
            .collect();

        let data_sources = self
            .data_sources
            .iter()
            .map(|(name, f)| (name.clone(), f.create(client.clone())))
            .collect();

        Adapters {
            resources,
            data_sources,
        }
    }
}

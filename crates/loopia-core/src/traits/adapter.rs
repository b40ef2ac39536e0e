// # Adapter Traits
//
// Each remote concept is exposed to the host as a resource (full lifecycle)
// or a data source (read only). Capabilities are split so that an adapter
// only implements what it supports:
//
// - [`Adapter`]: type name, schema, and construction from the shared client
// - [`DataSource`]: read-only projection
// - [`Resource`]: create, read, update, delete
//
// The client is injected at construction. An adapter instance never exists
// without one, so there is no "not configured yet" state to check for.

use async_trait::async_trait;

use crate::host::{Diagnostics, Schema, State};
use crate::traits::loopia_api::SharedClient;

/// Static description and construction of an adapter
pub trait Adapter: Sized {
    /// Type name suffix, joined to the provider type name with `_`
    const TYPE_NAME: &'static str;

    /// The schema declared to the host
    fn schema() -> Schema;

    /// Build the adapter around the shared client
    fn with_client(client: SharedClient) -> Self;
}

/// A read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch from the remote API and project into state
    async fn read(&self, config: &State) -> Result<State, Diagnostics>;
}

/// A managed resource
#[async_trait]
pub trait Resource: Send + Sync {
    /// Create the remote object and return the initial state
    async fn create(&self, plan: &State) -> Result<State, Diagnostics>;

    /// Refresh state from the remote object.
    ///
    /// `Ok(None)` tells the host the object is gone and the resource should
    /// be dropped from state.
    async fn read(&self, state: &State) -> Result<Option<State>, Diagnostics>;

    /// Apply an in-place change and return the new state
    async fn update(&self, plan: &State, prior: &State) -> Result<State, Diagnostics>;

    /// Remove the remote object
    async fn delete(&self, state: &State) -> Result<(), Diagnostics>;
}

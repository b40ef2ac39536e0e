//! Subdomain resource: `loopia_subdomain`
//!
//! The API can add, list and remove subdomains but not update them, so both
//! attributes force replacement and update never reaches the API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::host::{Attribute, Diagnostics, Schema, State, Value};
use crate::traits::{Adapter, Resource, SharedClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubdomainModel {
    #[serde(default)]
    pub domain: Value<String>,
    #[serde(default)]
    pub subdomain: Value<String>,
}

pub struct SubdomainResource {
    client: SharedClient,
}

impl Adapter for SubdomainResource {
    const TYPE_NAME: &'static str = "subdomain";

    fn schema() -> Schema {
        Schema::new([
            (
                "domain",
                Attribute::string()
                    .required()
                    .requires_replace()
                    .describe("The domain name to create the subdomain for"),
            ),
            (
                "subdomain",
                Attribute::string()
                    .required()
                    .requires_replace()
                    .describe("The subdomain to create"),
            ),
        ])
        .describe("Manages a subdomain of a Loopia domain.")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for SubdomainResource {
    async fn create(&self, plan: &State) -> Result<State, Diagnostics> {
        let plan: SubdomainModel = plan.get()?;

        tracing::debug!(
            domain = plan.domain.as_str(),
            subdomain = plan.subdomain.as_str(),
            "Creating subdomain"
        );

        self.client
            .add_subdomain(plan.domain.as_str(), plan.subdomain.as_str())
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error creating subdomain",
                    format!("Could not create subdomain, unexpected error: {e}"),
                )
            })?;

        // Nothing comes back from the API; the plan is the state.
        State::from_model(&plan)
    }

    async fn read(&self, state: &State) -> Result<Option<State>, Diagnostics> {
        let current: SubdomainModel = state.get()?;

        let found = self
            .client
            .find_subdomain(current.domain.as_str(), current.subdomain.as_str())
            .await
            .map_err(|e| Diagnostics::error("Unable to Read Subdomains", e.to_string()))?;

        if found.is_none() {
            tracing::warn!(
                domain = current.domain.as_str(),
                subdomain = current.subdomain.as_str(),
                "Subdomain no longer exists, removing from state"
            );
            return Ok(None);
        }

        Ok(Some(state.clone()))
    }

    async fn update(&self, plan: &State, _prior: &State) -> Result<State, Diagnostics> {
        // Every attribute requires replacement, so the host never plans an
        // in-place change for this resource.
        Ok(plan.clone())
    }

    async fn delete(&self, state: &State) -> Result<(), Diagnostics> {
        let current: SubdomainModel = state.get()?;

        tracing::debug!(
            domain = current.domain.as_str(),
            subdomain = current.subdomain.as_str(),
            "Deleting subdomain"
        );

        self.client
            .remove_subdomain(current.domain.as_str(), current.subdomain.as_str())
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Deleting Loopia Subdomain",
                    format!("Could not delete subdomain, unexpected error: {e}"),
                )
            })
    }
}

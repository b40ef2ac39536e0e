//! Subdomain listing: `loopia_subdomains`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::host::{Attribute, AttributeKind, Diagnostics, Schema, State, Value};
use crate::traits::{Adapter, DataSource, SharedClient};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubdomainsModel {
    #[serde(default)]
    pub domain: Value<String>,
    #[serde(default)]
    pub subdomains: Value<Vec<String>>,
}

pub struct SubdomainsDataSource {
    client: SharedClient,
}

impl Adapter for SubdomainsDataSource {
    const TYPE_NAME: &'static str = "subdomains";

    fn schema() -> Schema {
        Schema::new([
            (
                "domain",
                Attribute::string()
                    .required()
                    .describe("The domain name to retrieve subdomains for"),
            ),
            (
                "subdomains",
                Attribute::list(AttributeKind::String)
                    .computed()
                    .describe("List of subdomain names"),
            ),
        ])
        .describe("Fetches the names of all subdomains of a domain.")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for SubdomainsDataSource {
    async fn read(&self, config: &State) -> Result<State, Diagnostics> {
        let mut state: SubdomainsModel = config.get()?;

        let subdomains = self
            .client
            .get_subdomains(state.domain.as_str())
            .await
            .map_err(|e| Diagnostics::error("Unable to Read Loopia Subdomains", e.to_string()))?;

        state.subdomains = subdomains
            .into_iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
            .into();

        State::from_model(&state)
    }
}

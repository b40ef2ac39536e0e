//! Domain data sources: `loopia_domain` and `loopia_domains`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::host::{Attribute, Diagnostics, Schema, State, Value};
use crate::traits::{Adapter, DataSource, Domain, SharedClient};

/// A domain as projected into host state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainModel {
    #[serde(default)]
    pub name: Value<String>,
    #[serde(default)]
    pub paid: Value<bool>,
    #[serde(default)]
    pub registered: Value<bool>,
    #[serde(default)]
    pub renewal_status: Value<String>,
    #[serde(default)]
    pub expiration_date: Value<String>,
    #[serde(default)]
    pub reference_number: Value<i32>,
}

impl From<&Domain> for DomainModel {
    fn from(domain: &Domain) -> Self {
        Self {
            name: domain.name.clone().into(),
            paid: domain.paid.into(),
            registered: domain.registered.into(),
            renewal_status: domain.renewal_status.clone().into(),
            expiration_date: domain.expiration_date.clone().into(),
            reference_number: domain.reference_number.into(),
        }
    }
}

/// Fetches details about a single domain
pub struct DomainDataSource {
    client: SharedClient,
}

impl Adapter for DomainDataSource {
    const TYPE_NAME: &'static str = "domain";

    fn schema() -> Schema {
        Schema::new([
            (
                "name",
                Attribute::string()
                    .required()
                    .describe("The domain name to retrieve data for"),
            ),
            (
                "paid",
                Attribute::bool()
                    .computed()
                    .describe("Whether the domain is paid for"),
            ),
            (
                "registered",
                Attribute::bool()
                    .computed()
                    .describe("Whether the domain is registered"),
            ),
            (
                "renewal_status",
                Attribute::string()
                    .computed()
                    .describe("The renewal status of the domain"),
            ),
            (
                "expiration_date",
                Attribute::string()
                    .computed()
                    .describe("The expiration date of the domain"),
            ),
            (
                "reference_number",
                Attribute::int32()
                    .computed()
                    .describe("The reference number of the domain"),
            ),
        ])
        .describe("Fetches details about a specific domain.")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for DomainDataSource {
    async fn read(&self, config: &State) -> Result<State, Diagnostics> {
        let config: DomainModel = config.get()?;
        let name = config.name.as_str();

        tracing::debug!(domain = name, "Reading domain");

        let domain = self
            .client
            .get_domain(name)
            .await
            .map_err(|e| Diagnostics::error("Unable to Read Loopia Domain", e.to_string()))?;

        State::from_model(&DomainModel::from(&domain))
    }
}

/// Every domain on the account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainsModel {
    #[serde(default)]
    pub domains: Value<Vec<DomainModel>>,
}

/// Fetches every domain on the account
pub struct DomainsDataSource {
    client: SharedClient,
}

impl Adapter for DomainsDataSource {
    const TYPE_NAME: &'static str = "domains";

    fn schema() -> Schema {
        Schema::new([(
            "domains",
            Attribute::object_list([
                ("name", Attribute::string().computed()),
                ("paid", Attribute::bool().computed()),
                ("registered", Attribute::bool().computed()),
                ("renewal_status", Attribute::string().computed()),
                ("expiration_date", Attribute::string().computed()),
                ("reference_number", Attribute::int32().computed()),
            ])
            .computed(),
        )])
        .describe("Fetches details about all domains on the account.")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for DomainsDataSource {
    async fn read(&self, _config: &State) -> Result<State, Diagnostics> {
        tracing::debug!("Reading domains");

        let domains = self
            .client
            .get_domains()
            .await
            .map_err(|e| Diagnostics::error("Unable to Read Loopia Domains", e.to_string()))?;

        let state = DomainsModel {
            domains: domains.iter().map(DomainModel::from).collect::<Vec<_>>().into(),
        };
        State::from_model(&state)
    }
}

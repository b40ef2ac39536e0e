//! Zone record listing: `loopia_zone_records`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::zone_record::RecordModel;
use crate::host::{Attribute, Diagnostics, Schema, State, Value};
use crate::traits::{Adapter, DataSource, SharedClient};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneRecordsModel {
    #[serde(default)]
    pub domain: Value<String>,
    #[serde(default)]
    pub subdomain: Value<String>,
    #[serde(default)]
    pub zone_records: Value<Vec<RecordModel>>,
}

pub struct ZoneRecordsDataSource {
    client: SharedClient,
}

impl Adapter for ZoneRecordsDataSource {
    const TYPE_NAME: &'static str = "zone_records";

    fn schema() -> Schema {
        Schema::new([
            (
                "domain",
                Attribute::string()
                    .required()
                    .describe("The domain name to retrieve records for."),
            ),
            (
                "subdomain",
                Attribute::string()
                    .required()
                    .describe("The subdomain to retrieve records for."),
            ),
            (
                "zone_records",
                Attribute::object_list([
                    ("type", Attribute::string().computed()),
                    ("ttl", Attribute::int32().computed()),
                    ("priority", Attribute::int32().computed()),
                    ("value", Attribute::string().computed()),
                    ("record_id", Attribute::int64().computed()),
                ])
                .computed()
                .describe("The zone records, in the order Loopia lists them."),
            ),
        ])
        .describe("Fetches DNS zone records for a specific domain and subdomain")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ZoneRecordsDataSource {
    async fn read(&self, config: &State) -> Result<State, Diagnostics> {
        let mut state: ZoneRecordsModel = config.get()?;

        let records = self
            .client
            .get_zone_records(state.domain.as_str(), state.subdomain.as_str())
            .await
            .map_err(|e| Diagnostics::error("Unable to Read Loopia Zone Records", e.to_string()))?;

        state.zone_records = records
            .iter()
            .map(RecordModel::from)
            .collect::<Vec<_>>()
            .into();

        State::from_model(&state)
    }
}

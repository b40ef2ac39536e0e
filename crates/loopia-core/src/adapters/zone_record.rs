// # Zone Record Resource
//
// `loopia_zone_record` manages one DNS record under a subdomain.
//
// ## Identity after create
//
// `addZoneRecord` does not report the id Loopia assigned. After a
// successful add we list the subdomain's records and adopt the id of the
// record whose type, value, TTL and priority equal what we submitted.
//
// - exactly one match: adopt it
// - no match (e.g. Loopia normalized the value on storage): fail
// - several matches: fail rather than guess which one is ours
//
// ## Missing records
//
// Read reports a missing record as an error instead of dropping it from
// state. The subdomain resource drops silently in the same situation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::host::{Attribute, Diagnostics, Schema, State, Value};
use crate::traits::{Adapter, Resource, SharedClient, ZoneRecord};

/// TTL submitted when the configuration leaves it unset
pub const DEFAULT_TTL: i32 = 3600;

/// Priority submitted when the configuration leaves it unset
pub const DEFAULT_PRIORITY: i32 = 0;

/// A zone record as projected into host state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordModel {
    #[serde(rename = "type", default)]
    pub record_type: Value<String>,
    #[serde(default)]
    pub ttl: Value<i32>,
    #[serde(default)]
    pub priority: Value<i32>,
    #[serde(default)]
    pub value: Value<String>,
    #[serde(default)]
    pub record_id: Value<i64>,
}

impl RecordModel {
    /// Build the API record, filling unset TTL and priority with defaults
    pub fn to_client_record(&self) -> ZoneRecord {
        ZoneRecord {
            id: self.record_id.value_or_default(),
            record_type: self.record_type.as_str().to_string(),
            ttl: self.ttl.value().copied().unwrap_or(DEFAULT_TTL),
            priority: self.priority.value().copied().unwrap_or(DEFAULT_PRIORITY),
            value: self.value.as_str().to_string(),
        }
    }
}

impl From<&ZoneRecord> for RecordModel {
    fn from(record: &ZoneRecord) -> Self {
        Self {
            record_type: record.record_type.clone().into(),
            ttl: record.ttl.into(),
            priority: record.priority.into(),
            value: record.value.clone().into(),
            record_id: record.id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecordModel {
    #[serde(default)]
    pub domain: Value<String>,
    #[serde(default)]
    pub subdomain: Value<String>,
    #[serde(default)]
    pub record: RecordModel,
}

pub struct ZoneRecordResource {
    client: SharedClient,
}

impl Adapter for ZoneRecordResource {
    const TYPE_NAME: &'static str = "zone_record";

    fn schema() -> Schema {
        Schema::new([
            (
                "domain",
                Attribute::string()
                    .required()
                    .requires_replace()
                    .describe("The domain name to create records for."),
            ),
            (
                "subdomain",
                Attribute::string()
                    .required()
                    .requires_replace()
                    .describe("The subdomain to create records for."),
            ),
            (
                "record",
                Attribute::object([
                    (
                        "type",
                        Attribute::string()
                            .required()
                            .describe("The type of the record (e.g., 'A', 'CNAME', 'MX')."),
                    ),
                    (
                        "value",
                        Attribute::string().required().describe(
                            "The value of the record. For an 'A' record, this is an IPv4 address.",
                        ),
                    ),
                    (
                        "ttl",
                        Attribute::int32()
                            .optional()
                            .computed()
                            .describe("Time-to-live for the record in seconds."),
                    ),
                    (
                        "priority",
                        Attribute::int32()
                            .optional()
                            .computed()
                            .describe("The priority for MX records."),
                    ),
                    (
                        "record_id",
                        Attribute::int64()
                            .computed()
                            .describe("The unique identifier for the record (computed)."),
                    ),
                ])
                .required()
                .describe("The DNS record to manage."),
            ),
        ])
        .describe("Manages a DNS zone record in Loopia.")
    }

    fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

/// Pick the record that was just created out of a fresh listing
pub fn match_created<'a>(
    records: &'a [ZoneRecord],
    submitted: &ZoneRecord,
) -> Result<&'a ZoneRecord, Diagnostics> {
    let mut matches = records.iter().filter(|r| r.same_content(submitted));

    let Some(created) = matches.next() else {
        return Err(Diagnostics::error(
            "Unable to Identify Created Record",
            "Could not find the newly created record in the API response.",
        ));
    };

    let others: Vec<i64> = matches.map(|r| r.id).collect();
    if !others.is_empty() {
        let ids = std::iter::once(created.id)
            .chain(others)
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Diagnostics::error(
            "Ambiguous Created Record",
            format!(
                "Found several records with type {}, value {:?}, TTL {} and priority {} (record ids {ids}). \
                 The API does not report which one was just created, so none was adopted.",
                submitted.record_type, submitted.value, submitted.ttl, submitted.priority
            ),
        ));
    }

    Ok(created)
}

#[async_trait]
impl Resource for ZoneRecordResource {
    async fn create(&self, plan: &State) -> Result<State, Diagnostics> {
        let mut plan: ZoneRecordModel = plan.get()?;
        let domain = plan.domain.as_str().to_string();
        let subdomain = plan.subdomain.as_str().to_string();

        let mut submitted = plan.record.to_client_record();
        submitted.id = 0;

        tracing::debug!(
            domain = %domain,
            subdomain = %subdomain,
            record_type = %submitted.record_type,
            "Creating zone record"
        );

        self.client
            .add_zone_record(&domain, &subdomain, &submitted)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Creating Zone Record",
                    format!("Could not create zone record: {e}"),
                )
            })?;

        let records = self
            .client
            .get_zone_records(&domain, &subdomain)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Fetching Zone Records After Creation",
                    format!("Could not list zone records: {e}"),
                )
            })?;

        let created = match_created(&records, &submitted)?;
        tracing::debug!(record_id = created.id, "Identified created zone record");

        plan.record = RecordModel::from(created);
        State::from_model(&plan)
    }

    async fn read(&self, state: &State) -> Result<Option<State>, Diagnostics> {
        let mut current: ZoneRecordModel = state.get()?;
        let record_id = current.record.record_id.value_or_default();

        let record = self
            .client
            .get_zone_record(current.domain.as_str(), current.subdomain.as_str(), record_id)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Reading Zone Record",
                    format!("Could not read zone record ID {record_id}: {e}"),
                )
            })?;

        current.record = RecordModel::from(&record);
        State::from_model(&current).map(Some)
    }

    async fn update(&self, plan: &State, prior: &State) -> Result<State, Diagnostics> {
        let prior: ZoneRecordModel = prior.get()?;
        let mut plan: ZoneRecordModel = plan.get()?;

        // The id never appears in configuration; carry it over from state.
        plan.record.record_id = prior.record.record_id;
        let record = plan.record.to_client_record();

        tracing::debug!(record_id = record.id, "Updating zone record");

        self.client
            .update_zone_record(plan.domain.as_str(), plan.subdomain.as_str(), &record)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Updating Zone Record",
                    format!("Could not update zone record ID {}: {e}", record.id),
                )
            })?;

        let refreshed = self
            .client
            .get_zone_record(plan.domain.as_str(), plan.subdomain.as_str(), record.id)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Refreshing Zone Record After Update",
                    format!("Could not read updated zone record: {e}"),
                )
            })?;

        plan.record = RecordModel::from(&refreshed);
        State::from_model(&plan)
    }

    async fn delete(&self, state: &State) -> Result<(), Diagnostics> {
        let current: ZoneRecordModel = state.get()?;
        let record_id = current.record.record_id.value_or_default();

        tracing::debug!(record_id, "Deleting zone record");

        self.client
            .remove_zone_record(current.domain.as_str(), current.subdomain.as_str(), record_id)
            .await
            .map_err(|e| {
                Diagnostics::error(
                    "Error Deleting Zone Record",
                    format!("Could not delete zone record ID {record_id}: {e}"),
                )
            })
    }
}

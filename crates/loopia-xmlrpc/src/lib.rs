// # Loopia XML-RPC Client
//
// This crate provides the concrete `LoopiaApi` implementation: XML-RPC over
// HTTPS against the Loopia API endpoint.
//
// ## Implementation Notes
//
// - One HTTP request per trait call (except `get_zone_record`, see below)
// - HTTP timeout configured (30 seconds)
// - Status strings (`AUTH_ERROR`, `RATE_LIMITED`, ...) map to typed errors
// - XML-RPC faults map to `Error::Fault` with code and message
// - NO retry logic, NO backoff, NO caching: failures go straight back to
//   the adapter that made the call
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output
// - Credentials are sent in the request body only, never in the URL
//
// ## API Reference
//
// Every method takes `username`, `password` and `customer_number` first.
// An empty customer number acts on the account's own domains.
//
// - getDomains(...)                             -> array of domain structs
// - getDomain(..., domain)                      -> domain struct
// - getSubdomains(..., domain)                  -> array of strings
// - addSubdomain / removeSubdomain(..., domain, subdomain) -> status
// - getZoneRecords(..., domain, subdomain)      -> array of record structs
// - addZoneRecord(..., domain, subdomain, record)    -> status
// - updateZoneRecord(..., domain, subdomain, record) -> status
// - removeZoneRecord(..., domain, subdomain, record_id) -> status
//
// There is no single-record call; `get_zone_record` lists and filters.

pub mod codec;

use async_trait::async_trait;
use loopia_core::config::{Credentials, ProviderSettings};
use loopia_core::traits::{ClientFactory, Domain, LoopiaApi, SharedClient, Subdomain, ZoneRecord};
use loopia_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use codec::{MethodResponse, XmlValue};

/// Loopia XML-RPC endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.loopia.se/RPCSERV";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Customer number sent with every call; empty means "own account"
const OWN_ACCOUNT: &str = "";

/// Loopia API client
///
/// The Debug implementation does NOT expose the password.
pub struct LoopiaXmlRpcClient {
    credentials: Credentials,

    /// XML-RPC endpoint URL
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for LoopiaXmlRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopiaXmlRpcClient")
            .field("username", &self.credentials.username)
            .field("password", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl LoopiaXmlRpcClient {
    /// Create a client for the given credentials.
    ///
    /// `endpoint` defaults to [`DEFAULT_ENDPOINT`].
    pub fn new(credentials: Credentials, endpoint: Option<String>) -> Result<Self> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Error::config("Loopia API username and password are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            credentials,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform one XML-RPC call, prepending the authentication parameters
    async fn call(&self, method: &'static str, params: Vec<XmlValue>) -> Result<XmlValue> {
        let mut all = Vec::with_capacity(params.len() + 3);
        all.push(XmlValue::string(&self.credentials.username));
        all.push(XmlValue::string(&self.credentials.password));
        all.push(XmlValue::string(OWN_ACCOUNT));
        all.extend(params);

        let body = codec::encode_call(method, &all)
            .map_err(|e| Error::protocol(format!("Failed to encode {method}: {e}")))?;

        debug!(method, endpoint = %self.endpoint, "Calling Loopia API");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::http(format!("{method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::http(format!("{method} failed: {status} - {error_text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {method} response: {e}")))?;

        match codec::decode_response(&text)
            .map_err(|e| Error::protocol(format!("Invalid {method} response: {e}")))?
        {
            MethodResponse::Value(value) => Ok(value),
            MethodResponse::Fault { code, message } => {
                debug!(method, code, "Loopia API fault");
                Err(Error::fault(code, message))
            }
        }
    }

    /// Call a mutation that answers with a status string
    async fn call_status(&self, method: &'static str, params: Vec<XmlValue>) -> Result<()> {
        let value = self.call(method, params).await?;
        match value.as_str() {
            Some(status) => match Error::from_status(status) {
                None => Ok(()),
                Some(err) => Err(err),
            },
            None => Err(Error::protocol(format!(
                "{method} returned {value:?}, expected a status string"
            ))),
        }
    }

    /// Call a query; a status string in place of data is an error
    async fn call_data(&self, method: &'static str, params: Vec<XmlValue>) -> Result<XmlValue> {
        let value = self.call(method, params).await?;
        match value.as_str() {
            Some(status) => Err(Error::from_status(status).unwrap_or_else(|| {
                Error::protocol(format!("{method} returned status {status} instead of data"))
            })),
            None => Ok(value),
        }
    }
}

fn string_member(value: &XmlValue, name: &str) -> Result<String> {
    value
        .member(name)
        .and_then(XmlValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::protocol(format!("missing string member {name}")))
}

fn int_member(value: &XmlValue, name: &str) -> Result<i64> {
    value
        .member(name)
        .and_then(XmlValue::as_i64)
        .ok_or_else(|| Error::protocol(format!("missing integer member {name}")))
}

fn int32_member(value: &XmlValue, name: &str) -> Result<i32> {
    let n = int_member(value, name)?;
    i32::try_from(n).map_err(|_| Error::protocol(format!("member {name} out of range: {n}")))
}

fn bool_member(value: &XmlValue, name: &str) -> Result<bool> {
    value
        .member(name)
        .and_then(XmlValue::as_bool)
        .ok_or_else(|| Error::protocol(format!("missing boolean member {name}")))
}

fn array<'a>(value: &'a XmlValue, method: &str) -> Result<&'a [XmlValue]> {
    value
        .as_array()
        .ok_or_else(|| Error::protocol(format!("{method} did not return an array")))
}

fn decode_domain(value: &XmlValue) -> Result<Domain> {
    Ok(Domain {
        name: string_member(value, "domain")?,
        paid: bool_member(value, "paid")?,
        registered: bool_member(value, "registered")?,
        renewal_status: string_member(value, "renewal_status")?,
        expiration_date: value
            .member("expiration_date")
            .and_then(|v| match v {
                XmlValue::String(s) | XmlValue::DateTime(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_default(),
        reference_number: int32_member(value, "reference_no")?,
    })
}

fn decode_record(value: &XmlValue) -> Result<ZoneRecord> {
    Ok(ZoneRecord {
        id: int_member(value, "record_id")?,
        record_type: string_member(value, "type")?,
        ttl: int32_member(value, "ttl")?,
        priority: int32_member(value, "priority")?,
        value: string_member(value, "rdata")?,
    })
}

fn encode_record(record: &ZoneRecord, with_id: bool) -> XmlValue {
    let mut members = vec![
        ("type".to_string(), XmlValue::string(&record.record_type)),
        ("ttl".to_string(), XmlValue::Int(record.ttl.into())),
        ("priority".to_string(), XmlValue::Int(record.priority.into())),
        ("rdata".to_string(), XmlValue::string(&record.value)),
    ];
    if with_id {
        members.push(("record_id".to_string(), XmlValue::Int(record.id)));
    }
    XmlValue::Struct(members)
}

#[async_trait]
impl LoopiaApi for LoopiaXmlRpcClient {
    async fn get_domain(&self, domain: &str) -> Result<Domain> {
        let value = self
            .call_data("getDomain", vec![XmlValue::string(domain)])
            .await?;
        decode_domain(&value)
    }

    async fn get_domains(&self) -> Result<Vec<Domain>> {
        let value = self.call_data("getDomains", vec![]).await?;
        array(&value, "getDomains")?.iter().map(decode_domain).collect()
    }

    async fn get_subdomains(&self, domain: &str) -> Result<Vec<Subdomain>> {
        let value = self
            .call_data("getSubdomains", vec![XmlValue::string(domain)])
            .await?;
        array(&value, "getSubdomains")?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|name| Subdomain {
                        name: name.to_string(),
                    })
                    .ok_or_else(|| Error::protocol("getSubdomains returned a non-string item"))
            })
            .collect()
    }

    async fn add_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.call_status(
            "addSubdomain",
            vec![XmlValue::string(domain), XmlValue::string(subdomain)],
        )
        .await
    }

    async fn remove_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.call_status(
            "removeSubdomain",
            vec![XmlValue::string(domain), XmlValue::string(subdomain)],
        )
        .await
    }

    async fn get_zone_records(&self, domain: &str, subdomain: &str) -> Result<Vec<ZoneRecord>> {
        let value = self
            .call_data(
                "getZoneRecords",
                vec![XmlValue::string(domain), XmlValue::string(subdomain)],
            )
            .await?;
        array(&value, "getZoneRecords")?
            .iter()
            .map(decode_record)
            .collect()
    }

    async fn get_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_id: i64,
    ) -> Result<ZoneRecord> {
        self.get_zone_records(domain, subdomain)
            .await?
            .into_iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "zone record {record_id} under {subdomain}.{domain}"
                ))
            })
    }

    async fn add_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<()> {
        self.call_status(
            "addZoneRecord",
            vec![
                XmlValue::string(domain),
                XmlValue::string(subdomain),
                encode_record(record, false),
            ],
        )
        .await
    }

    async fn update_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<()> {
        self.call_status(
            "updateZoneRecord",
            vec![
                XmlValue::string(domain),
                XmlValue::string(subdomain),
                encode_record(record, true),
            ],
        )
        .await
    }

    async fn remove_zone_record(&self, domain: &str, subdomain: &str, record_id: i64) -> Result<()> {
        self.call_status(
            "removeZoneRecord",
            vec![
                XmlValue::string(domain),
                XmlValue::string(subdomain),
                XmlValue::Int(record_id),
            ],
        )
        .await
    }
}

/// Factory for creating XML-RPC clients from provider settings
pub struct XmlRpcClientFactory;

impl ClientFactory for XmlRpcClientFactory {
    fn create(&self, settings: &ProviderSettings) -> Result<SharedClient> {
        let client =
            LoopiaXmlRpcClient::new(settings.credentials.clone(), settings.endpoint.clone())?;
        Ok(Arc::new(client))
    }
}

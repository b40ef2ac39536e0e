// # Loopia API Trait
//
// Defines the interface to the remote registrar/DNS API.
//
// ## Implementations
//
// - XML-RPC over HTTPS: `loopia-xmlrpc` crate
// - In-memory test doubles: `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use loopia_core::LoopiaApi;
//
// async fn show(client: &dyn LoopiaApi) -> loopia_core::Result<()> {
//     for record in client.get_zone_records("example.se", "www").await? {
//         println!("{} {} {}", record.id, record.record_type, record.value);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ProviderSettings;

/// A domain registered on the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub paid: bool,
    pub registered: bool,
    pub renewal_status: String,
    pub expiration_date: String,
    pub reference_number: i32,
}

/// A subdomain of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdomain {
    pub name: String,
}

/// A DNS zone record under a subdomain
///
/// `id` is assigned by Loopia after creation; it is zero in creation
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: i64,
    pub record_type: String,
    pub ttl: i32,
    /// Only meaningful for priority-bearing types such as MX and SRV
    pub priority: i32,
    pub value: String,
}

impl ZoneRecord {
    /// Whether two records carry the same type, value, TTL and priority.
    ///
    /// The id is ignored.
    pub fn same_content(&self, other: &ZoneRecord) -> bool {
        self.record_type == other.record_type
            && self.value == other.value
            && self.ttl == other.ttl
            && self.priority == other.priority
    }
}

/// Trait for Loopia API client implementations
///
/// Each method is one remote call (except where noted) and either returns
/// the decoded DTO or an error.
///
/// # Constraints
///
/// - No retries and no backoff: failures go straight back to the caller,
///   which reports them to the host verbatim.
/// - No caching: the remote service is the source of truth on every call.
/// - Credentials are fixed at construction; clients are shared read-only
///   between all adapters.
#[async_trait]
pub trait LoopiaApi: Send + Sync {
    /// Fetch a single domain
    async fn get_domain(&self, domain: &str) -> crate::Result<Domain>;

    /// List every domain on the account
    async fn get_domains(&self) -> crate::Result<Vec<Domain>>;

    /// List the subdomains of a domain
    async fn get_subdomains(&self, domain: &str) -> crate::Result<Vec<Subdomain>>;

    /// Create a subdomain
    async fn add_subdomain(&self, domain: &str, subdomain: &str) -> crate::Result<()>;

    /// Remove a subdomain
    async fn remove_subdomain(&self, domain: &str, subdomain: &str) -> crate::Result<()>;

    /// List the zone records of a subdomain, in the order the API returns them
    async fn get_zone_records(&self, domain: &str, subdomain: &str)
    -> crate::Result<Vec<ZoneRecord>>;

    /// Fetch a single zone record by id
    ///
    /// Returns [`crate::Error::NotFound`] when no record has that id.
    async fn get_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_id: i64,
    ) -> crate::Result<ZoneRecord>;

    /// Create a zone record. The record's `id` is ignored.
    ///
    /// The API does not report the id it assigned.
    async fn add_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> crate::Result<()>;

    /// Replace the zone record identified by `record.id`
    async fn update_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> crate::Result<()>;

    /// Remove a zone record by id
    async fn remove_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_id: i64,
    ) -> crate::Result<()>;

    /// Look up one subdomain by name.
    ///
    /// The API has no single-subdomain call, so this lists and scans.
    async fn find_subdomain(&self, domain: &str, name: &str) -> crate::Result<Option<Subdomain>> {
        let subdomains = self.get_subdomains(domain).await?;
        Ok(subdomains.into_iter().find(|s| s.name == name))
    }
}

/// Shared client handle injected into every adapter
pub type SharedClient = Arc<dyn LoopiaApi>;

/// Helper trait for constructing API clients from resolved provider settings
pub trait ClientFactory: Send + Sync {
    /// Create the client shared by all adapters for this plugin process
    fn create(&self, settings: &ProviderSettings) -> crate::Result<SharedClient>;
}

//! Test doubles and common utilities for contract tests
//!
//! This module provides an in-memory Loopia account that behaves like the
//! remote API closely enough to exercise adapter sequencing: ids are
//! assigned on add, listings keep insertion order, and every call is
//! counted.
#![allow(dead_code)]

use loopia_core::config::ProviderSettings;
use loopia_core::error::{Error, Result};
use loopia_core::host::{Diagnostics, State};
use loopia_core::traits::{ClientFactory, Domain, LoopiaApi, SharedClient, Subdomain, ZoneRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Key = (String, String);

#[derive(Default)]
struct Account {
    domains: Vec<Domain>,
    subdomains: BTreeMap<String, Vec<String>>,
    records: HashMap<Key, Vec<ZoneRecord>>,
    next_id: i64,
}

/// In-memory Loopia account with call counters and failure injection
pub struct MockLoopiaApi {
    account: Mutex<Account>,
    /// Calls per API method name
    calls: Mutex<HashMap<&'static str, usize>>,
    /// Methods that answer with a status error instead of succeeding
    failures: Mutex<HashMap<&'static str, String>>,
    /// Applied to record values on add, like the API rewriting TXT data
    normalize: Mutex<Option<fn(&str) -> String>>,
}

impl MockLoopiaApi {
    pub fn new() -> Self {
        Self {
            account: Mutex::new(Account {
                next_id: 1000,
                ..Account::default()
            }),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            normalize: Mutex::new(None),
        }
    }

    /// Shared client handle backed by this mock
    pub fn client(self: &Arc<Self>) -> SharedClient {
        self.clone()
    }

    /// Number of calls made to one method
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// Number of calls made to any method
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Make every call to `method` fail with the given API status
    pub fn fail(&self, method: &'static str, status: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(method, status.to_string());
    }

    /// Rewrite record values on add
    pub fn normalize_values(&self, f: fn(&str) -> String) {
        *self.normalize.lock().unwrap() = Some(f);
    }

    pub fn add_domain(&self, domain: Domain) {
        self.account.lock().unwrap().domains.push(domain);
    }

    pub fn seed_subdomain(&self, domain: &str, name: &str) {
        self.account
            .lock()
            .unwrap()
            .subdomains
            .entry(domain.to_string())
            .or_default()
            .push(name.to_string());
    }

    /// Store a record directly and return the id it was given
    pub fn seed_record(&self, domain: &str, subdomain: &str, mut record: ZoneRecord) -> i64 {
        let mut account = self.account.lock().unwrap();
        account.next_id += 1;
        record.id = account.next_id;
        account
            .records
            .entry(key(domain, subdomain))
            .or_default()
            .push(record);
        account.next_id
    }

    /// Remove a subdomain behind the plugin's back
    pub fn remove_subdomain_out_of_band(&self, domain: &str, name: &str) {
        if let Some(names) = self.account.lock().unwrap().subdomains.get_mut(domain) {
            names.retain(|n| n != name);
        }
    }

    /// Remove a record behind the plugin's back
    pub fn remove_record_out_of_band(&self, domain: &str, subdomain: &str, id: i64) {
        if let Some(records) = self
            .account
            .lock()
            .unwrap()
            .records
            .get_mut(&key(domain, subdomain))
        {
            records.retain(|r| r.id != id);
        }
    }

    /// Change a stored record behind the plugin's back
    pub fn edit_record_out_of_band(
        &self,
        domain: &str,
        subdomain: &str,
        id: i64,
        edit: impl FnOnce(&mut ZoneRecord),
    ) {
        let mut account = self.account.lock().unwrap();
        if let Some(record) = account
            .records
            .get_mut(&key(domain, subdomain))
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
        {
            edit(record);
        }
    }

    pub fn stored_records(&self, domain: &str, subdomain: &str) -> Vec<ZoneRecord> {
        self.account
            .lock()
            .unwrap()
            .records
            .get(&key(domain, subdomain))
            .cloned()
            .unwrap_or_default()
    }

    pub fn stored_subdomains(&self, domain: &str) -> Vec<String> {
        self.account
            .lock()
            .unwrap()
            .subdomains
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    fn enter(&self, method: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        match self.failures.lock().unwrap().get(method) {
            Some(status) => Err(Error::from_status(status)
                .unwrap_or_else(|| Error::Status(status.clone()))),
            None => Ok(()),
        }
    }
}

fn key(domain: &str, subdomain: &str) -> Key {
    (domain.to_string(), subdomain.to_string())
}

#[async_trait::async_trait]
impl LoopiaApi for MockLoopiaApi {
    async fn get_domain(&self, domain: &str) -> Result<Domain> {
        self.enter("getDomain")?;
        self.account
            .lock()
            .unwrap()
            .domains
            .iter()
            .find(|d| d.name == domain)
            .cloned()
            .ok_or_else(|| Error::Status("UNKNOWN_ERROR".to_string()))
    }

    async fn get_domains(&self) -> Result<Vec<Domain>> {
        self.enter("getDomains")?;
        Ok(self.account.lock().unwrap().domains.clone())
    }

    async fn get_subdomains(&self, domain: &str) -> Result<Vec<Subdomain>> {
        self.enter("getSubdomains")?;
        Ok(self
            .stored_subdomains(domain)
            .into_iter()
            .map(|name| Subdomain { name })
            .collect())
    }

    async fn add_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.enter("addSubdomain")?;
        let mut account = self.account.lock().unwrap();
        let names = account.subdomains.entry(domain.to_string()).or_default();
        if names.iter().any(|n| n == subdomain) {
            return Err(Error::Status("DOMAIN_OCCUPIED".to_string()));
        }
        names.push(subdomain.to_string());
        Ok(())
    }

    async fn remove_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.enter("removeSubdomain")?;
        let mut account = self.account.lock().unwrap();
        let names = account.subdomains.entry(domain.to_string()).or_default();
        let before = names.len();
        names.retain(|n| n != subdomain);
        if names.len() == before {
            return Err(Error::Status("UNKNOWN_ERROR".to_string()));
        }
        account.records.remove(&key(domain, subdomain));
        Ok(())
    }

    async fn get_zone_records(&self, domain: &str, subdomain: &str) -> Result<Vec<ZoneRecord>> {
        self.enter("getZoneRecords")?;
        Ok(self.stored_records(domain, subdomain))
    }

    async fn get_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_id: i64,
    ) -> Result<ZoneRecord> {
        self.enter("getZoneRecords")?;
        self.stored_records(domain, subdomain)
            .into_iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("zone record {record_id}")))
    }

    async fn add_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<()> {
        self.enter("addZoneRecord")?;
        let mut stored = record.clone();
        if let Some(normalize) = *self.normalize.lock().unwrap() {
            stored.value = normalize(&stored.value);
        }
        self.seed_record(domain, subdomain, stored);
        Ok(())
    }

    async fn update_zone_record(
        &self,
        domain: &str,
        subdomain: &str,
        record: &ZoneRecord,
    ) -> Result<()> {
        self.enter("updateZoneRecord")?;
        let mut account = self.account.lock().unwrap();
        let existing = account
            .records
            .get_mut(&key(domain, subdomain))
            .and_then(|records| records.iter_mut().find(|r| r.id == record.id))
            .ok_or_else(|| Error::Status("UNKNOWN_ERROR".to_string()))?;
        *existing = record.clone();
        Ok(())
    }

    async fn remove_zone_record(&self, domain: &str, subdomain: &str, record_id: i64) -> Result<()> {
        self.enter("removeZoneRecord")?;
        let mut account = self.account.lock().unwrap();
        let records = account.records.entry(key(domain, subdomain)).or_default();
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(Error::Status("UNKNOWN_ERROR".to_string()));
        }
        Ok(())
    }
}

/// Client factory handing out one shared mock
pub struct MockClientFactory {
    api: Arc<MockLoopiaApi>,
    create_call_count: AtomicUsize,
    last_settings: Mutex<Option<ProviderSettings>>,
    fail_with: Option<String>,
}

impl MockClientFactory {
    pub fn new(api: Arc<MockLoopiaApi>) -> Self {
        Self {
            api,
            create_call_count: AtomicUsize::new(0),
            last_settings: Mutex::new(None),
            fail_with: None,
        }
    }

    /// A factory whose every `create` fails
    pub fn failing(api: Arc<MockLoopiaApi>, message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(api)
        }
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<ProviderSettings> {
        self.last_settings.lock().unwrap().clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn create(&self, settings: &ProviderSettings) -> Result<SharedClient> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_settings.lock().unwrap() = Some(settings.clone());
        match &self.fail_with {
            Some(message) => Err(Error::config(message.clone())),
            None => Ok(self.api.client()),
        }
    }
}

/// Environment lookup backed by a fixed list of variables
pub fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

/// Build a state payload from JSON
pub fn state(value: serde_json::Value) -> State {
    State::from_json(value)
}

/// Summaries of every diagnostic, in order
pub fn summaries(diags: &Diagnostics) -> Vec<String> {
    diags.iter().map(|d| d.summary.clone()).collect()
}

pub fn a_record(value: &str) -> ZoneRecord {
    ZoneRecord {
        id: 0,
        record_type: "A".to_string(),
        ttl: 3600,
        priority: 0,
        value: value.to_string(),
    }
}

pub fn domain(name: &str) -> Domain {
    Domain {
        name: name.to_string(),
        paid: true,
        registered: true,
        renewal_status: "NORMAL".to_string(),
        expiration_date: "2027-01-15".to_string(),
        reference_number: 4711,
    }
}

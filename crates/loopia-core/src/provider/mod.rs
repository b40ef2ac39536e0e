//! Provider root
//!
//! Declares the provider metadata and schema, resolves credentials, builds
//! the one shared API client and hands it to every adapter.
//!
//! ```text
//! provider block ──┐
//!                  ├─ resolve_settings ─ ClientFactory ─ SharedClient
//! environment ─────┘                                        │
//!                                                           ▼
//!                                      AdapterRegistry::instantiate
//!                                                           │
//!                                                           ▼
//!                                                  ConfiguredProvider
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ENDPOINT_ENV, PASSWORD_ENV, USERNAME_ENV, resolve_settings};
use crate::host::{Attribute, Diagnostics, Schema, State};
use crate::registry::{AdapterRegistry, Adapters};
use crate::traits::{ClientFactory, DataSource, Resource};

/// Provider type name; every adapter type name starts with it
pub const PROVIDER_TYPE_NAME: &str = "loopia";

/// The unconfigured provider
pub struct LoopiaProvider {
    version: String,
    registry: AdapterRegistry,
    client_factory: Arc<dyn ClientFactory>,
}

impl LoopiaProvider {
    pub fn new(
        version: impl Into<String>,
        registry: AdapterRegistry,
        client_factory: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            version: version.into(),
            registry,
            client_factory,
        }
    }

    /// A provider with every built-in adapter registered
    pub fn with_builtin_adapters(
        version: impl Into<String>,
        client_factory: Arc<dyn ClientFactory>,
    ) -> Self {
        let mut registry = AdapterRegistry::new();
        crate::adapters::register(&mut registry);
        Self::new(version, registry, client_factory)
    }

    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Schema of the provider block
    pub fn schema() -> Schema {
        Schema::new([
            (
                "username",
                Attribute::string().optional().describe(format!(
                    "Username for Loopia API. May also be provided via {USERNAME_ENV} environment variable."
                )),
            ),
            (
                "password",
                Attribute::string().optional().sensitive().describe(format!(
                    "Password for Loopia API. May also be provided via {PASSWORD_ENV} environment variable."
                )),
            ),
            (
                "endpoint",
                Attribute::string().optional().describe(format!(
                    "Loopia API endpoint URL. May also be provided via {ENDPOINT_ENV} environment variable."
                )),
            ),
        ])
        .describe("Interact with the Loopia registrar and DNS API.")
    }

    /// Resolve credentials, build the shared client and instantiate every
    /// adapter around it.
    pub fn configure<F>(&self, config: &State, env: F) -> Result<ConfiguredProvider, Diagnostics>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Configuring Loopia client");

        let settings = resolve_settings(config, env)?;

        debug!(
            username = %settings.credentials.username,
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            "Creating Loopia client"
        );

        let client = self.client_factory.create(&settings).map_err(|e| {
            Diagnostics::error(
                "Unable to Create Loopia API Client",
                format!(
                    "An unexpected error occurred when creating the Loopia API client. \
                     If the error is not clear, please contact the provider developers.\n\n\
                     Loopia Client Error: {e}"
                ),
            )
        })?;

        let adapters = self.registry.instantiate(client);

        info!(
            resources = adapters.resources.len(),
            data_sources = adapters.data_sources.len(),
            "Configured Loopia client"
        );

        Ok(ConfiguredProvider { adapters })
    }
}

/// Full host type name for an adapter suffix
pub fn full_type_name(suffix: &str) -> String {
    format!("{PROVIDER_TYPE_NAME}_{suffix}")
}

/// Strip the provider prefix from a full host type name
pub fn type_suffix(full_name: &str) -> Option<&str> {
    full_name
        .strip_prefix(PROVIDER_TYPE_NAME)
        .and_then(|rest| rest.strip_prefix('_'))
}

/// A configured provider owning adapter instances bound to one client
pub struct ConfiguredProvider {
    adapters: Adapters,
}

impl ConfiguredProvider {
    /// Look up a resource by full type name, e.g. `loopia_subdomain`
    pub fn resource(&self, full_name: &str) -> Option<Arc<dyn Resource>> {
        let suffix = type_suffix(full_name)?;
        self.adapters.resources.get(suffix).cloned()
    }

    /// Look up a data source by full type name, e.g. `loopia_domains`
    pub fn data_source(&self, full_name: &str) -> Option<Arc<dyn DataSource>> {
        let suffix = type_suffix(full_name)?;
        self.adapters.data_sources.get(suffix).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_join_with_underscore() {
        assert_eq!(full_type_name("zone_record"), "loopia_zone_record");
        assert_eq!(type_suffix("loopia_zone_records"), Some("zone_records"));
        assert_eq!(type_suffix("loopiazone"), None);
        assert_eq!(type_suffix("other_domain"), None);
    }

    #[test]
    fn password_is_sensitive() {
        let schema = LoopiaProvider::schema();
        let password = schema.attribute("password").unwrap();
        assert!(password.sensitive);
        assert!(password.optional);
        assert!(!schema.attribute("username").unwrap().sensitive);
    }
}

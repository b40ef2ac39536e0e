//! Provider configuration
//!
//! Credentials come from the provider block in the host configuration, with
//! environment variables as fallback. Explicit configuration always wins.
//!
//! Environment lookup is passed in as a function so resolution can be
//! exercised without touching the process environment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::{AttributePath, Diagnostics, State, Value};

/// Environment variable holding the API username
pub const USERNAME_ENV: &str = "LOOPIA_USERNAME";

/// Environment variable holding the API password
pub const PASSWORD_ENV: &str = "LOOPIA_PASSWORD";

/// Environment variable overriding the API endpoint
pub const ENDPOINT_ENV: &str = "LOOPIA_ENDPOINT";

/// Provider block as declared in the host configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderModel {
    #[serde(default)]
    pub username: Value<String>,
    #[serde(default)]
    pub password: Value<String>,
    #[serde(default)]
    pub endpoint: Value<String>,
}

/// Loopia API credentials
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// ⚠️ NEVER log this value
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Everything needed to build the API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub credentials: Credentials,
    /// Endpoint override; `None` means the client's default
    pub endpoint: Option<String>,
}

/// Resolve provider settings from the provider block and the environment.
///
/// Unknown values are rejected first, since nothing can be resolved until
/// they are known. Then each credential is taken from configuration, else
/// from the environment, and must be non-empty. Every failing credential
/// gets its own attribute diagnostic.
pub fn resolve_settings<F>(config: &State, env: F) -> Result<ProviderSettings, Diagnostics>
where
    F: Fn(&str) -> Option<String>,
{
    let model: ProviderModel = config.get()?;
    let mut diags = Diagnostics::new();

    if model.username.is_unknown() {
        diags.add_attribute_error(
            AttributePath::root("username"),
            "Unknown Loopia API Username",
            unknown_detail("username", USERNAME_ENV),
        );
    }

    if model.password.is_unknown() {
        diags.add_attribute_error(
            AttributePath::root("password"),
            "Unknown Loopia API Password",
            unknown_detail("password", PASSWORD_ENV),
        );
    }

    if model.endpoint.is_unknown() {
        diags.add_attribute_error(
            AttributePath::root("endpoint"),
            "Unknown Loopia API Endpoint",
            unknown_detail("endpoint", ENDPOINT_ENV),
        );
    }

    if diags.has_error() {
        return Err(diags);
    }

    let username = pick(&model.username, USERNAME_ENV, &env);
    let password = pick(&model.password, PASSWORD_ENV, &env);
    let endpoint = pick(&model.endpoint, ENDPOINT_ENV, &env);

    if username.is_empty() {
        diags.add_attribute_error(
            AttributePath::root("username"),
            "Missing Loopia API Username",
            missing_detail("username", USERNAME_ENV),
        );
    }

    if password.is_empty() {
        diags.add_attribute_error(
            AttributePath::root("password"),
            "Missing Loopia API Password",
            missing_detail("password", PASSWORD_ENV),
        );
    }

    if !endpoint.is_empty()
        && !endpoint.starts_with("https://")
        && !endpoint.starts_with("http://")
    {
        diags.add_attribute_error(
            AttributePath::root("endpoint"),
            "Invalid Loopia API Endpoint",
            format!(
                "The Loopia API endpoint must use the HTTP or HTTPS scheme, got {endpoint:?}. \
                 Check the endpoint value in the configuration or the {ENDPOINT_ENV} environment variable."
            ),
        );
    }

    if diags.has_error() {
        return Err(diags);
    }

    if endpoint.starts_with("http://") {
        tracing::warn!(
            endpoint = %endpoint,
            "Loopia API endpoint uses HTTP (not HTTPS); credentials will be sent in clear text"
        );
    }

    Ok(ProviderSettings {
        credentials: Credentials { username, password },
        endpoint: (!endpoint.is_empty()).then_some(endpoint),
    })
}

/// Explicit value if set, otherwise the environment, otherwise empty
fn pick<F>(configured: &Value<String>, var: &str, env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match configured.value() {
        Some(value) => value.clone(),
        None => env(var).unwrap_or_default(),
    }
}

fn unknown_detail(attribute: &str, var: &str) -> String {
    format!(
        "The provider cannot create the Loopia API client as there is an unknown configuration value for the Loopia API {attribute}. \
         Either target apply the source of the value first, set the value statically in the configuration, or use the {var} environment variable."
    )
}

fn missing_detail(attribute: &str, var: &str) -> String {
    format!(
        "The provider cannot create the Loopia API client as there is a missing or empty value for the Loopia API {attribute}. \
         Set the {attribute} value in the configuration or use the {var} environment variable. \
         If either is already set, ensure the value is not empty."
    )
}

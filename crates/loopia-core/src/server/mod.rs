// # Plugin Server
//
// Dispatches host requests to the provider root and its adapters.
//
// ## Request Flow
//
// 1. `get_metadata` and `get_provider_schema` may arrive at any time;
//    schemas come straight from the registry.
// 2. `configure_provider` resolves credentials and builds the shared
//    client. Until it succeeds, apply and read requests are refused.
// 3. Plan requests only need the schema. Apply and read requests go to
//    the adapter instance bound to the configured client.
//
// Requests are handled one at a time; the server holds no locks.
//
// ## Apply Dispatch
//
// | prior  | planned | operation |
// |--------|---------|-----------|
// | absent | present | create    |
// | present| present | update    |
// | present| absent  | delete    |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::{AttributePath, Diagnostics, Schema, State};
use crate::provider::{ConfiguredProvider, LoopiaProvider, full_type_name};
use crate::traits::{DataSource, Resource};

/// Environment lookup used when configuring the provider
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A request from the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    GetMetadata,
    GetProviderSchema,
    ConfigureProvider {
        #[serde(default)]
        config: State,
    },
    ValidateResourceConfig {
        type_name: String,
        config: State,
    },
    ValidateDataSourceConfig {
        type_name: String,
        config: State,
    },
    PlanResourceChange {
        type_name: String,
        #[serde(default)]
        prior_state: Option<State>,
        #[serde(default)]
        proposed_new_state: Option<State>,
    },
    ApplyResourceChange {
        type_name: String,
        #[serde(default)]
        prior_state: Option<State>,
        #[serde(default)]
        planned_state: Option<State>,
    },
    ReadResource {
        type_name: String,
        current_state: State,
    },
    ReadDataSource {
        type_name: String,
        config: State,
    },
}

impl Request {
    /// Method name as it appears on the wire
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetMetadata => "get_metadata",
            Self::GetProviderSchema => "get_provider_schema",
            Self::ConfigureProvider { .. } => "configure_provider",
            Self::ValidateResourceConfig { .. } => "validate_resource_config",
            Self::ValidateDataSourceConfig { .. } => "validate_data_source_config",
            Self::PlanResourceChange { .. } => "plan_resource_change",
            Self::ApplyResourceChange { .. } => "apply_resource_change",
            Self::ReadResource { .. } => "read_resource",
            Self::ReadDataSource { .. } => "read_data_source",
        }
    }
}

/// Provider type name and version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: String,
    pub version: String,
}

/// Provider, resource and data-source schemas keyed by full type name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resource_schemas: BTreeMap<String, Schema>,
    pub data_source_schemas: BTreeMap<String, Schema>,
}

/// A response to the host
///
/// Only the fields relevant to the request are set. An absent `new_state`
/// on a successful `read_resource` means the object is gone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProviderMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ProviderSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_state: Option<State>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires_replace: Vec<AttributePath>,
    pub new_state: Option<State>,
    pub diagnostics: Diagnostics,
}

impl Response {
    fn diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    fn new_state(state: Option<State>) -> Self {
        Self {
            new_state: state,
            ..Self::default()
        }
    }
}

/// Host request dispatcher
pub struct PluginServer {
    provider: LoopiaProvider,
    configured: Option<ConfiguredProvider>,
    env: EnvLookup,
}

impl PluginServer {
    /// Server reading environment fallbacks from the process environment
    pub fn new(provider: LoopiaProvider) -> Self {
        Self::with_env(provider, Box::new(|name| std::env::var(name).ok()))
    }

    /// Server with an injected environment lookup
    pub fn with_env(provider: LoopiaProvider, env: EnvLookup) -> Self {
        Self {
            provider,
            configured: None,
            env,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    /// Handle one request
    pub async fn handle(&mut self, request: Request) -> Response {
        debug!(method = request.method(), "Handling request");

        match request {
            Request::GetMetadata => Response {
                metadata: Some(ProviderMetadata {
                    type_name: self.provider.type_name().to_string(),
                    version: self.provider.version().to_string(),
                }),
                ..Response::default()
            },
            Request::GetProviderSchema => Response {
                schema: Some(self.provider_schema()),
                ..Response::default()
            },
            Request::ConfigureProvider { config } => self.configure(&config),
            Request::ValidateResourceConfig { type_name, config } => {
                match self.resource_schema(&type_name) {
                    Ok(schema) => Response::diagnostics(schema.validate(config.as_json())),
                    Err(diags) => Response::diagnostics(diags),
                }
            }
            Request::ValidateDataSourceConfig { type_name, config } => {
                match self.data_source_schema(&type_name) {
                    Ok(schema) => Response::diagnostics(schema.validate(config.as_json())),
                    Err(diags) => Response::diagnostics(diags),
                }
            }
            Request::PlanResourceChange {
                type_name,
                prior_state,
                proposed_new_state,
            } => self.plan(&type_name, prior_state.as_ref(), proposed_new_state.as_ref()),
            Request::ApplyResourceChange {
                type_name,
                prior_state,
                planned_state,
            } => match self.resource(&type_name) {
                Ok(resource) => {
                    apply(resource.as_ref(), prior_state.as_ref(), planned_state.as_ref()).await
                }
                Err(diags) => Response::diagnostics(diags),
            },
            Request::ReadResource {
                type_name,
                current_state,
            } => match self.resource(&type_name) {
                Ok(resource) => match resource.read(&current_state).await {
                    Ok(state) => Response::new_state(state),
                    Err(diags) => Response::diagnostics(diags),
                },
                Err(diags) => Response::diagnostics(diags),
            },
            Request::ReadDataSource { type_name, config } => {
                match self.data_source(&type_name) {
                    Ok(data_source) => match data_source.read(&config).await {
                        Ok(state) => Response::new_state(Some(state)),
                        Err(diags) => Response::diagnostics(diags),
                    },
                    Err(diags) => Response::diagnostics(diags),
                }
            }
        }
    }

    fn provider_schema(&self) -> ProviderSchema {
        let registry = self.provider.registry();

        let resource_schemas = registry
            .list_resources()
            .into_iter()
            .filter_map(|name| {
                let schema = registry.resource_schema(&name)?;
                Some((full_type_name(&name), schema))
            })
            .collect();

        let data_source_schemas = registry
            .list_data_sources()
            .into_iter()
            .filter_map(|name| {
                let schema = registry.data_source_schema(&name)?;
                Some((full_type_name(&name), schema))
            })
            .collect();

        ProviderSchema {
            provider: LoopiaProvider::schema(),
            resource_schemas,
            data_source_schemas,
        }
    }

    fn configure(&mut self, config: &State) -> Response {
        let mut diags = LoopiaProvider::schema().validate(config.as_json());
        if diags.has_error() {
            return Response::diagnostics(diags);
        }

        match self.provider.configure(config, |name| (self.env)(name)) {
            Ok(configured) => {
                self.configured = Some(configured);
                Response::default()
            }
            Err(errors) => {
                diags.extend(errors);
                Response::diagnostics(diags)
            }
        }
    }

    fn plan(
        &self,
        type_name: &str,
        prior: Option<&State>,
        proposed: Option<&State>,
    ) -> Response {
        let schema = match self.resource_schema(type_name) {
            Ok(schema) => schema,
            Err(diags) => return Response::diagnostics(diags),
        };

        // Destroy: nothing to plan.
        let Some(proposed) = proposed else {
            return Response::default();
        };

        let change = schema.plan(prior.map(State::as_json), proposed.as_json());
        Response {
            planned_state: Some(State::from_json(change.planned_state)),
            requires_replace: change.requires_replace,
            ..Response::default()
        }
    }

    fn resource_schema(&self, type_name: &str) -> Result<Schema, Diagnostics> {
        crate::provider::type_suffix(type_name)
            .and_then(|suffix| self.provider.registry().resource_schema(suffix))
            .ok_or_else(|| unknown_type("resource", type_name))
    }

    fn data_source_schema(&self, type_name: &str) -> Result<Schema, Diagnostics> {
        crate::provider::type_suffix(type_name)
            .and_then(|suffix| self.provider.registry().data_source_schema(suffix))
            .ok_or_else(|| unknown_type("data source", type_name))
    }

    fn configured(&self) -> Result<&ConfiguredProvider, Diagnostics> {
        self.configured.as_ref().ok_or_else(|| {
            Diagnostics::error(
                "Provider Not Configured",
                "The provider must be configured before resources or data sources can be used.",
            )
        })
    }

    fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, Diagnostics> {
        self.configured()?
            .resource(type_name)
            .ok_or_else(|| unknown_type("resource", type_name))
    }

    fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>, Diagnostics> {
        self.configured()?
            .data_source(type_name)
            .ok_or_else(|| unknown_type("data source", type_name))
    }
}

async fn apply(
    resource: &dyn Resource,
    prior: Option<&State>,
    planned: Option<&State>,
) -> Response {
    let result = match (prior, planned) {
        (None, Some(planned)) => resource.create(planned).await.map(Some),
        (Some(prior), Some(planned)) => resource.update(planned, prior).await.map(Some),
        (Some(prior), None) => resource.delete(prior).await.map(|()| None),
        (None, None) => {
            warn!("Apply request with neither prior nor planned state");
            Ok(None)
        }
    };

    match result {
        Ok(state) => Response::new_state(state),
        Err(diags) => Response::diagnostics(diags),
    }
}

fn unknown_type(kind: &str, type_name: &str) -> Diagnostics {
    Diagnostics::error(
        format!("Unknown {kind} type"),
        format!("The provider does not implement {kind} type {type_name:?}."),
    )
}

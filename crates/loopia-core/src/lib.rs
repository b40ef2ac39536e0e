// # loopia-core
//
// Core library for the Loopia infrastructure-as-code plugin.
//
// ## Architecture Overview
//
// This library turns declarative host requests into Loopia API calls:
// - **host**: Typed attribute values, state payloads, schemas and diagnostics
// - **LoopiaApi**: Trait for the remote registrar/DNS API
// - **Adapters**: One resource or data source per remote concept
// - **AdapterRegistry**: Plugin-based registry of adapter factories
// - **LoopiaProvider**: Credential resolution and client construction
// - **PluginServer**: Dispatches host requests to the adapters
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Adapters never touch the network; the
//    client never sees host state
// 2. **Injected Client**: One client is built at configure time and handed
//    to every adapter
// 3. **Plugin-Based**: Adapters are registered by name, no hard-coded match
// 4. **Library-First**: The binary is only logging, runtime and I/O wiring

pub mod adapters;
pub mod config;
pub mod error;
pub mod host;
pub mod provider;
pub mod registry;
pub mod server;
pub mod traits;

// Re-export core types for convenience
pub use config::{Credentials, ProviderSettings, resolve_settings};
pub use error::{Error, Result};
pub use host::{Diagnostic, Diagnostics, Schema, State, Value};
pub use provider::{ConfiguredProvider, LoopiaProvider, PROVIDER_TYPE_NAME};
pub use registry::AdapterRegistry;
pub use server::{PluginServer, ProviderMetadata, Request, Response};
pub use traits::{ClientFactory, Domain, LoopiaApi, SharedClient, Subdomain, ZoneRecord};

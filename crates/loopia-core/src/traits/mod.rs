//! Core traits for the Loopia plugin
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`LoopiaApi`]: Remote registrar/DNS API client
//! - [`ClientFactory`]: Builds the shared client from credentials
//! - [`Adapter`], [`DataSource`], [`Resource`]: Host-facing adapter capabilities

pub mod adapter;
pub mod loopia_api;

pub use adapter::{Adapter, DataSource, Resource};
pub use loopia_api::{ClientFactory, Domain, LoopiaApi, SharedClient, Subdomain, ZoneRecord};

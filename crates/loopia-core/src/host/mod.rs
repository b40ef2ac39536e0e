//! Host-side typed attribute system
//!
//! - [`Value`] and [`State`]: attribute values and object payloads
//! - [`Schema`]: attribute declarations, validation and planning
//! - [`Diagnostics`]: problems reported back to the host

pub mod diagnostics;
pub mod schema;
pub mod value;

pub use diagnostics::{AttributePath, Diagnostic, Diagnostics, Severity};
pub use schema::{Attribute, AttributeKind, PlannedChange, Schema};
pub use value::{State, UNKNOWN_VALUE, Value, is_unknown_json};

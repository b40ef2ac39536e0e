// # Host Attribute Values
//
// Typed attribute values as exchanged with the plugin host.
//
// Every attribute the host hands us is in one of three states:
//
// - null: not set in configuration (or no value yet)
// - unknown: will only be known after apply (depends on another resource)
// - known: a concrete value
//
// On the wire, null is JSON `null`, unknown is the sentinel string
// `UNKNOWN_VALUE`, and known values are plain JSON.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::diagnostics::Diagnostics;

/// Wire representation of an unknown value
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

static NULL: serde_json::Value = serde_json::Value::Null;

/// A single host attribute value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value<T> {
    /// Not set
    #[default]
    Null,
    /// Not known until apply
    Unknown,
    /// A concrete value
    Known(T),
}

impl<T> Value<T> {
    /// Wrap a concrete value
    pub fn known(value: T) -> Self {
        Self::Known(value)
    }

    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The concrete value, if known
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Default + Clone> Value<T> {
    /// The concrete value, or the zero value when null or unknown
    pub fn value_or_default(&self) -> T {
        self.value().cloned().unwrap_or_default()
    }
}

impl Value<String> {
    /// The string value, or `""` when null or unknown
    pub fn as_str(&self) -> &str {
        self.value().map(String::as_str).unwrap_or_default()
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Unknown => serializer.serialize_str(UNKNOWN_VALUE),
            Self::Known(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::String(ref s) if s == UNKNOWN_VALUE => Ok(Self::Unknown),
            other => serde_json::from_value(other)
                .map(Self::Known)
                .map_err(D::Error::custom),
        }
    }
}

/// Whether a raw JSON value is the unknown sentinel
pub fn is_unknown_json(value: &serde_json::Value) -> bool {
    value.as_str() == Some(UNKNOWN_VALUE)
}

/// An object-typed payload crossing the host boundary
///
/// The same shape carries provider configuration, resource configuration,
/// planned state and prior state. Adapters decode it into their own models
/// with [`State::get`] and encode results with [`State::from_model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(serde_json::Value);

impl State {
    /// An empty object
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Wrap a raw JSON value
    pub fn from_json(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the raw JSON value
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume into the raw JSON value
    pub fn into_json(self) -> serde_json::Value {
        self.0
    }

    /// Look up a top-level attribute; missing attributes read as null
    pub fn attribute(&self, name: &str) -> &serde_json::Value {
        self.0.get(name).unwrap_or(&NULL)
    }

    /// Decode into a typed model
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Diagnostics> {
        serde_json::from_value(self.0.clone()).map_err(|e| {
            Diagnostics::error(
                "Value Conversion Error",
                format!("Could not decode the host payload into the expected model: {e}"),
            )
        })
    }

    /// Encode a typed model
    pub fn from_model<T: Serialize>(model: &T) -> Result<Self, Diagnostics> {
        serde_json::to_value(model).map(Self).map_err(|e| {
            Diagnostics::error(
                "Value Conversion Error",
                format!("Could not encode the model into a host payload: {e}"),
            )
        })
    }
}

impl Default for State {
    fn default() -> Self {
        Self::empty()
    }
}

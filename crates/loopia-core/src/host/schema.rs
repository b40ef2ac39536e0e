// # Schema Declarations
//
// Every resource, data source and the provider itself declares a schema:
// which attributes exist, which the practitioner must set, which are
// computed by the plugin, and which force replacement when changed.
//
// The schema is also what drives planning: `Schema::plan` fills computed
// attributes and reports the attributes that force a destroy-and-recreate.

use serde::Serialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

use super::diagnostics::{AttributePath, Diagnostics};
use super::value::{UNKNOWN_VALUE, is_unknown_json};

/// Attribute type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum AttributeKind {
    String,
    Bool,
    Int32,
    Int64,
    /// List of primitive elements
    List(Box<AttributeKind>),
    /// A single nested object
    Object(BTreeMap<String, Attribute>),
    /// A list of nested objects
    ObjectList(BTreeMap<String, Attribute>),
}

/// A single schema attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub requires_replace: bool,
}

impl Attribute {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            requires_replace: false,
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeKind::String)
    }

    pub fn bool() -> Self {
        Self::new(AttributeKind::Bool)
    }

    pub fn int32() -> Self {
        Self::new(AttributeKind::Int32)
    }

    pub fn int64() -> Self {
        Self::new(AttributeKind::Int64)
    }

    pub fn list(element: AttributeKind) -> Self {
        Self::new(AttributeKind::List(Box::new(element)))
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Attribute)>,
        K: Into<String>,
    {
        Self::new(AttributeKind::Object(collect(attributes)))
    }

    pub fn object_list<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Attribute)>,
        K: Into<String>,
    {
        Self::new(AttributeKind::ObjectList(collect(attributes)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Any change to this attribute forces destroy-and-recreate
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn collect<I, K>(attributes: I) -> BTreeMap<String, Attribute>
where
    I: IntoIterator<Item = (K, Attribute)>,
    K: Into<String>,
{
    attributes
        .into_iter()
        .map(|(name, attr)| (name.into(), attr))
        .collect()
}

/// Schema of a provider, resource or data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

/// Result of planning a resource change
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    /// Proposed state with computed attributes resolved
    pub planned_state: Json,
    /// Attributes whose change forces replacement
    pub requires_replace: Vec<AttributePath>,
}

impl Schema {
    pub fn new<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Attribute)>,
        K: Into<String>,
    {
        Self {
            description: String::new(),
            attributes: collect(attributes),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check that every required attribute is set.
    ///
    /// Unknown values pass: they will be known by apply time.
    pub fn validate(&self, config: &Json) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validate_object(&self.attributes, config, None, &mut diags);
        diags
    }

    /// Plan a change from `prior` to `proposed`.
    ///
    /// `prior` is `None` when the resource is being created.
    pub fn plan(&self, prior: Option<&Json>, proposed: &Json) -> PlannedChange {
        let mut requires_replace = Vec::new();
        if let Some(prior) = prior {
            collect_replacements(&self.attributes, prior, proposed, None, &mut requires_replace);
        }
        let carry_prior = if requires_replace.is_empty() { prior } else { None };
        let planned_state = fill_computed(&self.attributes, carry_prior, proposed);

        PlannedChange {
            planned_state,
            requires_replace,
        }
    }
}

fn child_path(parent: Option<&AttributePath>, name: &str) -> AttributePath {
    match parent {
        Some(p) => p.clone().attribute(name),
        None => AttributePath::root(name),
    }
}

static NULL: Json = Json::Null;

fn field<'a>(object: &'a Json, name: &str) -> &'a Json {
    object.get(name).unwrap_or(&NULL)
}

fn validate_object(
    attributes: &BTreeMap<String, Attribute>,
    value: &Json,
    parent: Option<&AttributePath>,
    diags: &mut Diagnostics,
) {
    for (name, attr) in attributes {
        let path = child_path(parent, name);
        let current = field(value, name);

        if attr.required && current.is_null() {
            diags.add_attribute_error(
                path.clone(),
                "Missing Required Attribute",
                format!("The attribute \"{path}\" is required, but no definition was found."),
            );
            continue;
        }

        if let AttributeKind::Object(nested) = &attr.kind
            && current.is_object()
        {
            validate_object(nested, current, Some(&path), diags);
        }
    }
}

fn collect_replacements(
    attributes: &BTreeMap<String, Attribute>,
    prior: &Json,
    proposed: &Json,
    parent: Option<&AttributePath>,
    out: &mut Vec<AttributePath>,
) {
    for (name, attr) in attributes {
        let path = child_path(parent, name);
        let before = field(prior, name);
        let after = field(proposed, name);

        if attr.requires_replace && before != after {
            out.push(path);
            continue;
        }

        if let AttributeKind::Object(nested) = &attr.kind {
            collect_replacements(nested, before, after, Some(&path), out);
        }
    }
}

fn fill_computed(
    attributes: &BTreeMap<String, Attribute>,
    prior: Option<&Json>,
    proposed: &Json,
) -> Json {
    let mut planned = proposed.as_object().cloned().unwrap_or_default();

    for (name, attr) in attributes {
        let current = field(proposed, name);
        let before = prior.map(|p| field(p, name));

        let value = match &attr.kind {
            AttributeKind::Object(nested) if current.is_object() => {
                fill_computed(nested, before.filter(|b| b.is_object()), current)
            }
            _ if attr.computed && current.is_null() => match before {
                Some(b) if !b.is_null() && !is_unknown_json(b) => b.clone(),
                _ => Json::String(UNKNOWN_VALUE.to_string()),
            },
            _ => current.clone(),
        };
        planned.insert(name.clone(), value);
    }

    Json::Object(planned)
}

//! XML-RPC document encoding and decoding
//!
//! Only the subset Loopia uses: scalar values, arrays, structs and faults.
//! Decoding goes through a small element tree first so that whitespace
//! between elements can be told apart from string content.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

/// An XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(String),
    Nil,
    Array(Vec<XmlValue>),
    /// Struct members in document order
    Struct(Vec<(String, XmlValue)>),
}

impl XmlValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Booleans, also accepting the 0/1 integers some responses use
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[XmlValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a struct member by name
    pub fn member(&self, name: &str) -> Option<&XmlValue> {
        match self {
            Self::Struct(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Decoded `methodResponse`
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Value(XmlValue),
    Fault { code: i64, message: String },
}

/// Errors from encoding or decoding an XML-RPC document
#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("empty document")]
    Empty,

    #[error("unexpected element <{found}>, expected {expected}")]
    Unexpected { expected: &'static str, found: String },

    #[error("missing <{0}> element")]
    Missing(&'static str),

    #[error("invalid {kind} value {text:?}")]
    InvalidScalar { kind: &'static str, text: String },
}

fn xml_err(e: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(e.to_string())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[XmlValue]) -> Result<Vec<u8>, CodecError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    open(&mut writer, "methodCall")?;
    text_element(&mut writer, "methodName", method)?;
    open(&mut writer, "params")?;
    for param in params {
        open(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        close(&mut writer, "param")?;
    }
    close(&mut writer, "params")?;
    close(&mut writer, "methodCall")?;

    Ok(writer.into_inner())
}

fn open(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn close(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), CodecError> {
    open(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    close(writer, name)
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &XmlValue) -> Result<(), CodecError> {
    open(writer, "value")?;
    match value {
        XmlValue::Int(n) => text_element(writer, "int", &n.to_string())?,
        XmlValue::Bool(b) => text_element(writer, "boolean", if *b { "1" } else { "0" })?,
        XmlValue::String(s) => text_element(writer, "string", s)?,
        XmlValue::Double(d) => text_element(writer, "double", &d.to_string())?,
        XmlValue::DateTime(s) => text_element(writer, "dateTime.iso8601", s)?,
        XmlValue::Base64(s) => text_element(writer, "base64", s)?,
        XmlValue::Nil => writer
            .write_event(Event::Empty(BytesStart::new("nil")))
            .map_err(xml_err)?,
        XmlValue::Array(items) => {
            open(writer, "array")?;
            open(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            close(writer, "data")?;
            close(writer, "array")?;
        }
        XmlValue::Struct(members) => {
            open(writer, "struct")?;
            for (name, member) in members {
                open(writer, "member")?;
                text_element(writer, "name", name)?;
                write_value(writer, member)?;
                close(writer, "member")?;
            }
            close(writer, "struct")?;
        }
    }
    close(writer, "value")
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn child(&self, name: &'static str) -> Result<&Element, CodecError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or(CodecError::Missing(name))
    }
}

fn parse_tree(xml: &str) -> Result<Element, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(name));
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| xml_err("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_err("unexpected end of document"));
    }
    root.ok_or(CodecError::Empty)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Decode a `methodResponse` document
pub fn decode_response(xml: &str) -> Result<MethodResponse, CodecError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(CodecError::Unexpected {
            expected: "<methodResponse>",
            found: root.name,
        });
    }

    if let Ok(fault) = root.child("fault") {
        let value = decode_value(fault.child("value")?)?;
        let code = value
            .member("faultCode")
            .and_then(XmlValue::as_i64)
            .ok_or(CodecError::Missing("faultCode"))?;
        let message = value
            .member("faultString")
            .and_then(XmlValue::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(MethodResponse::Fault { code, message });
    }

    let value = root.child("params")?.child("param")?.child("value")?;
    decode_value(value).map(MethodResponse::Value)
}

fn decode_value(value: &Element) -> Result<XmlValue, CodecError> {
    // A value without a type element is a string.
    let Some(typed) = value.children.first() else {
        return Ok(XmlValue::String(value.text.clone()));
    };

    let text = typed.text.as_str();
    match typed.name.as_str() {
        "string" => Ok(XmlValue::String(text.to_string())),
        "int" | "i4" | "i8" => text
            .trim()
            .parse()
            .map(XmlValue::Int)
            .map_err(|_| invalid("int", text)),
        "boolean" => match text.trim() {
            "1" => Ok(XmlValue::Bool(true)),
            "0" => Ok(XmlValue::Bool(false)),
            _ => Err(invalid("boolean", text)),
        },
        "double" => text
            .trim()
            .parse()
            .map(XmlValue::Double)
            .map_err(|_| invalid("double", text)),
        "dateTime.iso8601" => Ok(XmlValue::DateTime(text.trim().to_string())),
        "base64" => Ok(XmlValue::Base64(text.trim().to_string())),
        "nil" => Ok(XmlValue::Nil),
        "array" => typed
            .child("data")?
            .children
            .iter()
            .filter(|c| c.name == "value")
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(XmlValue::Array),
        "struct" => typed
            .children
            .iter()
            .filter(|c| c.name == "member")
            .map(|member| {
                let name = member.child("name")?.text.clone();
                let value = decode_value(member.child("value")?)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, CodecError>>()
            .map(XmlValue::Struct),
        other => Err(CodecError::Unexpected {
            expected: "a value type",
            found: other.to_string(),
        }),
    }
}

fn invalid(kind: &'static str, text: &str) -> CodecError {
    CodecError::InvalidScalar {
        kind,
        text: text.to_string(),
    }
}

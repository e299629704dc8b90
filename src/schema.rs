//! Schema tree used by the compiler.
//!
//! Built from an already-dereferenced OpenAPI Schema Object. Parsing is
//! permissive: anything that does not match a recognized shape becomes
//! [`SchemaKind::Unknown`] or an absent constraint, never an error.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Number, Value};

use crate::types::{json_type_name, CompileOptions, RuleToken};

/// A structural type descriptor with its constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// Author-supplied rules replacing the derived ones for this subtree.
    pub rule_override: Option<Vec<RuleToken>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Integer(NumericSchema),
    Number(NumericSchema),
    Boolean,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, SchemaNode>,
    pub required: IndexSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StringFormat {
    #[default]
    None,
    Email,
    DateTime,
    Other(String),
}

impl StringFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "email" => StringFormat::Email,
            "date-time" => StringFormat::DateTime,
            other => StringFormat::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: StringFormat,
    /// Allowed literals in declaration order.
    pub enum_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSchema {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub enum_values: Option<Vec<Value>>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            rule_override: None,
        }
    }

    /// An `object` node with no properties.
    pub fn empty_object() -> Self {
        Self::new(SchemaKind::Object(ObjectSchema::default()))
    }

    pub fn with_override(mut self, tokens: Vec<RuleToken>) -> Self {
        self.rule_override = Some(tokens);
        self
    }

    /// Build a node from a Schema Object.
    pub fn from_value(value: &Value, options: &CompileOptions) -> Self {
        let Some(map) = value.as_object() else {
            return Self::new(SchemaKind::Unknown);
        };

        let kind = match schema_type(map) {
            Some("object") => SchemaKind::Object(parse_object(map, options)),
            Some("array") => SchemaKind::Array(parse_array(map, options)),
            Some("string") => SchemaKind::String(parse_string(map)),
            Some("integer") => SchemaKind::Integer(parse_numeric(map)),
            Some("number") => SchemaKind::Number(parse_numeric(map)),
            Some("boolean") => SchemaKind::Boolean,
            _ => SchemaKind::Unknown,
        };

        Self {
            kind,
            rule_override: map
                .get(&options.rule_override_key)
                .and_then(parse_override),
        }
    }

    /// Minimum-length-like bound used for the necessity prefix.
    pub fn presence_bound(&self) -> Option<u64> {
        match &self.kind {
            SchemaKind::String(s) => s.min_length,
            SchemaKind::Array(a) => a.min_items,
            _ => None,
        }
    }
}

/// Resolve `type`, accepting the OAS 3.1 list form (`["string", "null"]`).
fn schema_type(map: &Map<String, Value>) -> Option<&str> {
    match map.get("type")? {
        Value::String(t) => Some(t.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn parse_object(map: &Map<String, Value>, options: &CompileOptions) -> ObjectSchema {
    let properties: IndexMap<String, SchemaNode> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), SchemaNode::from_value(prop, options)))
                .collect()
        })
        .unwrap_or_default();

    let required: IndexSet<String> = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    ObjectSchema {
        properties,
        required,
    }
}

fn parse_array(map: &Map<String, Value>, options: &CompileOptions) -> ArraySchema {
    let items = map
        .get("items")
        .map(|items| SchemaNode::from_value(items, options))
        .unwrap_or_else(|| SchemaNode::new(SchemaKind::Unknown));

    ArraySchema {
        items: Box::new(items),
        min_items: count_bound(map, "minItems"),
        max_items: count_bound(map, "maxItems"),
    }
}

fn parse_string(map: &Map<String, Value>) -> StringSchema {
    StringSchema {
        min_length: count_bound(map, "minLength"),
        max_length: count_bound(map, "maxLength"),
        pattern: map.get("pattern").and_then(Value::as_str).map(String::from),
        format: map
            .get("format")
            .and_then(Value::as_str)
            .map(StringFormat::parse)
            .unwrap_or_default(),
        enum_values: parse_enum(map),
    }
}

fn parse_numeric(map: &Map<String, Value>) -> NumericSchema {
    let number = |key: &str| match map.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };

    NumericSchema {
        minimum: number("minimum"),
        maximum: number("maximum"),
        enum_values: parse_enum(map),
    }
}

/// A non-negative whole number; `3.0` counts, `2.5` and `-1` do not.
fn count_bound(map: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = map.get(key)?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => {
            tracing::warn!(
                key,
                value = %value,
                "ignoring bound: expected a non-negative integer"
            );
            None
        }
    }
}

fn parse_enum(map: &Map<String, Value>) -> Option<Vec<Value>> {
    map.get("enum").and_then(Value::as_array).cloned()
}

/// Parse a rule override.
///
/// Accepts a list whose entries are a keyword string, a `[keyword, args...]`
/// list, or `{"raw": "..."}`. A single string is a one-token override.
fn parse_override(value: &Value) -> Option<Vec<RuleToken>> {
    match value {
        Value::String(keyword) => Some(vec![RuleToken::keyword(keyword.as_str())]),
        Value::Array(entries) => Some(entries.iter().filter_map(parse_override_token).collect()),
        other => {
            tracing::warn!(
                actual = json_type_name(other),
                "ignoring rule override: expected string or array"
            );
            None
        }
    }
}

fn parse_override_token(entry: &Value) -> Option<RuleToken> {
    match entry {
        Value::String(keyword) => Some(RuleToken::keyword(keyword.as_str())),
        Value::Array(parts) => {
            let (keyword, args) = parts.split_first()?;
            let keyword = keyword.as_str()?;
            Some(RuleToken::param(keyword, args.iter().map(scalar_text)))
        }
        Value::Object(obj) => obj
            .get("raw")
            .and_then(Value::as_str)
            .map(RuleToken::raw),
        other => {
            tracing::warn!(
                actual = json_type_name(other),
                "ignoring rule override entry"
            );
            None
        }
    }
}

/// Text of a scalar argument; strings lose their JSON quotes.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

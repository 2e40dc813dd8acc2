// schema.rs — Draft-07 JSON Schema subset used to guard the evaluator boundary.
//
// The evaluator's response is untrusted until it passes `JsonSchema::validate`.
// Supported keywords: type, properties, required, additionalProperties, items,
// enum, and $ref into the same document (e.g. "#/definitions/PolicyDecision").
// Unknown keywords are ignored, as draft-07 requires.
//
// Validation never fails with an error: a malformed candidate, a malformed
// keyword value, or a dangling $ref are all reported as violations.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Limit on consecutive `$ref` hops at one instance location.
const MAX_REF_DEPTH: usize = 32;

/// The checked-in decision response schema for the active protocol version.
const DECISION_RESPONSE_SCHEMA: &str = include_str!("../schemas/decision_response.schema.json");

/// Protocol versions the boundary understands.
///
/// Only one version is live. Older shapes (lower-case `allow`/`deny`, a map of
/// named policies instead of a `reasons` array) are migration history and are
/// rejected by the schema like any other non-conforming payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// `reasons` array, `Allow`/`Deny`, `errors` list.
    #[default]
    V2,
}

impl ProtocolVersion {
    /// Raw text of the response schema for this version.
    pub fn response_schema_source(self) -> &'static str {
        match self {
            ProtocolVersion::V2 => DECISION_RESPONSE_SCHEMA,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V2 => write!(f, "v2"),
        }
    }
}

/// The active protocol version.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::V2;

/// One reason a value does not conform to a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value ("" is the document root).
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// A parsed schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    root: Value,
}

impl JsonSchema {
    /// Wrap an already-parsed schema document.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a schema document from text.
    pub fn parse(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source).map(Self::new)
    }

    /// Load a schema document from disk.
    pub fn load(path: &Path) -> Result<Self, ProtocolError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProtocolError::Schema {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| ProtocolError::Schema {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The decision response schema for a protocol version.
    pub fn decision_response(version: ProtocolVersion) -> Result<Self, ProtocolError> {
        Self::parse(version.response_schema_source()).map_err(|e| ProtocolError::Schema {
            path: format!("<embedded {} schema>", version).into(),
            reason: e.to_string(),
        })
    }

    /// The schema document as JSON.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Does `instance` conform to this schema?
    pub fn conforms(&self, instance: &Value) -> bool {
        self.validate(instance).is_empty()
    }

    /// Every violation found in `instance`. Empty means the value conforms.
    ///
    /// The candidate is only borrowed; nothing is coerced or defaulted.
    pub fn validate(&self, instance: &Value) -> Vec<SchemaViolation> {
        let mut out = Vec::new();
        self.check(&self.root, instance, "", 0, &mut out);
        out
    }

    fn check(
        &self,
        schema: &Value,
        instance: &Value,
        path: &str,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        let keywords = match schema {
            // Boolean schemas: `true` accepts anything, `false` nothing.
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(SchemaViolation::new(path, "no value is allowed here"));
                return;
            }
            Value::Object(map) => map,
            other => {
                out.push(SchemaViolation::new(
                    path,
                    format!("schema node must be an object or boolean, found {}", kind_of(other)),
                ));
                return;
            }
        };

        // In draft-07, $ref overrides every sibling keyword.
        if let Some(reference) = keywords.get("$ref") {
            self.check_ref(reference, instance, path, depth, out);
            return;
        }

        if let Some(expected) = keywords.get("type") {
            check_type(expected, instance, path, out);
        }

        if let Some(allowed) = keywords.get("enum") {
            match allowed {
                Value::Array(values) => {
                    if !values.iter().any(|v| v == instance) {
                        out.push(SchemaViolation::new(
                            path,
                            format!("{} is not one of the allowed values", instance),
                        ));
                    }
                }
                _ => out.push(SchemaViolation::new(path, "'enum' must be an array")),
            }
        }

        // Descending into the instance starts a fresh $ref chain: only
        // consecutive $refs with no instance step between them can loop.
        if let Value::Object(object) = instance {
            self.check_object(keywords, object, path, out);
        }

        if let (Some(items), Value::Array(elements)) = (keywords.get("items"), instance) {
            match items {
                // Tuple form: positional schemas.
                Value::Array(schemas) => {
                    for (index, (item_schema, element)) in
                        schemas.iter().zip(elements.iter()).enumerate()
                    {
                        let child = pointer_push(path, &index.to_string());
                        self.check(item_schema, element, &child, 0, out);
                    }
                }
                item_schema => {
                    for (index, element) in elements.iter().enumerate() {
                        let child = pointer_push(path, &index.to_string());
                        self.check(item_schema, element, &child, 0, out);
                    }
                }
            }
        }
    }

    fn check_object(
        &self,
        keywords: &Map<String, Value>,
        object: &Map<String, Value>,
        path: &str,
        out: &mut Vec<SchemaViolation>,
    ) {
        if let Some(required) = keywords.get("required") {
            match required {
                Value::Array(names) => {
                    for name in names {
                        match name.as_str() {
                            Some(name) if !object.contains_key(name) => out.push(
                                SchemaViolation::new(
                                    path,
                                    format!("missing required property '{}'", name),
                                ),
                            ),
                            Some(_) => {}
                            None => out.push(SchemaViolation::new(
                                path,
                                "'required' entries must be strings",
                            )),
                        }
                    }
                }
                _ => out.push(SchemaViolation::new(path, "'required' must be an array")),
            }
        }

        let properties = match keywords.get("properties") {
            Some(Value::Object(props)) => Some(props),
            Some(_) => {
                out.push(SchemaViolation::new(path, "'properties' must be an object"));
                None
            }
            None => None,
        };

        for (key, value) in object {
            let child = pointer_push(path, key);
            if let Some(prop_schema) = properties.and_then(|p| p.get(key)) {
                self.check(prop_schema, value, &child, 0, out);
                continue;
            }
            // Only keys not covered by `properties` fall to additionalProperties.
            match keywords.get("additionalProperties") {
                None | Some(Value::Bool(true)) => {}
                Some(Value::Bool(false)) => out.push(SchemaViolation::new(
                    &child,
                    format!("additional property '{}' is not allowed", key),
                )),
                Some(extra) => self.check(extra, value, &child, 0, out),
            }
        }
    }

    fn check_ref(
        &self,
        reference: &Value,
        instance: &Value,
        path: &str,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        if depth >= MAX_REF_DEPTH {
            out.push(SchemaViolation::new(path, "$ref nesting too deep"));
            return;
        }
        let Some(reference) = reference.as_str() else {
            out.push(SchemaViolation::new(path, "'$ref' must be a string"));
            return;
        };
        match self.resolve(reference) {
            Some(target) => self.check(target, instance, path, depth + 1, out),
            None => out.push(SchemaViolation::new(
                path,
                format!("unresolvable $ref '{}'", reference),
            )),
        }
    }

    /// Resolve a same-document reference such as `#/definitions/Foo`.
    fn resolve(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            return Some(&self.root);
        }
        self.root.pointer(pointer)
    }
}

fn check_type(expected: &Value, instance: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let names: Vec<&str> = match expected {
        Value::String(name) => vec![name.as_str()],
        Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
        _ => {
            out.push(SchemaViolation::new(path, "'type' must be a string or array"));
            return;
        }
    };
    if !names.iter().any(|name| type_matches(name, instance)) {
        out.push(SchemaViolation::new(
            path,
            format!("expected {}, found {}", names.join(" or "), kind_of(instance)),
        ));
    }
}

fn type_matches(name: &str, instance: &Value) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => instance.is_boolean(),
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => match instance {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append one segment to a JSON pointer, escaping `~` and `/` per RFC 6901.
fn pointer_push(path: &str, segment: &str) -> String {
    format!("{}/{}", path, segment.replace('~', "~0").replace('/', "~1"))
}

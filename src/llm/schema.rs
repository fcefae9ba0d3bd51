//! Declarative schema for structured model output.
//!
//! The same value is sent to the backend to constrain generation and used
//! locally to validate whatever comes back before it is accepted.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: SchemaType,
        found: &'static str,
    },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ResponseSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Order in which the model should emit object properties.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
}

impl ResponseSchema {
    fn leaf(schema_type: SchemaType, description: Option<&str>) -> Self {
        Self {
            schema_type,
            description: description.map(String::from),
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    pub fn string(description: &str) -> Self {
        Self::leaf(SchemaType::String, Some(description))
    }

    pub fn integer(description: &str) -> Self {
        Self::leaf(SchemaType::Integer, Some(description))
    }

    pub fn number(description: &str) -> Self {
        Self::leaf(SchemaType::Number, Some(description))
    }

    /// A string with no description, handy for array items.
    pub fn plain_string() -> Self {
        Self::leaf(SchemaType::String, None)
    }

    pub fn array(items: ResponseSchema, description: &str) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array, Some(description))
        }
    }

    /// An object whose properties are emitted in the given order.
    /// `required` lists the property names that must be present.
    pub fn object(properties: Vec<(&str, ResponseSchema)>, required: &[&str]) -> Self {
        let property_ordering = properties.iter().map(|(name, _)| name.to_string()).collect();
        Self {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: required.iter().map(|name| name.to_string()).collect(),
            property_ordering,
            ..Self::leaf(SchemaType::Object, None)
        }
    }

    /// Checks that `value` has the types and required fields this schema
    /// declares. Fields not mentioned in the schema are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        let matches = match self.schema_type {
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Number => value.is_number(),
            SchemaType::Boolean => value.is_boolean(),
        };
        if !matches {
            return Err(SchemaViolation::TypeMismatch {
                path: path.to_string(),
                expected: self.schema_type,
                found: json_type_name(value),
            });
        }

        if let Value::Object(fields) = value {
            for field in &self.required {
                if !fields.contains_key(field) {
                    return Err(SchemaViolation::MissingField {
                        path: path.to_string(),
                        field: field.clone(),
                    });
                }
            }
            for (name, schema) in &self.properties {
                if let Some(field_value) = fields.get(name) {
                    schema.validate_at(&format!("{}.{}", path, name), field_value)?;
                }
            }
        }

        if let (Value::Array(elements), Some(items)) = (value, &self.items) {
            for (i, element) in elements.iter().enumerate() {
                items.validate_at(&format!("{}[{}]", path, i), element)?;
            }
        }

        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::validation::SchemaError;

/// Arguments passed to a tool call (a JSON object).
pub type ToolArguments = Map<String, Value>;

/// JSON type accepted for a single schema property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Number => "number",
            PropertyKind::Integer => "integer",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Object => "object",
            PropertyKind::Array => "array",
        }
    }

    /// Whether `value` is an instance of this kind
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PropertyKind::String => value.is_string(),
            PropertyKind::Number => value.is_number(),
            PropertyKind::Integer => value.is_i64() || value.is_u64(),
            PropertyKind::Boolean => value.is_boolean(),
            PropertyKind::Object => value.is_object(),
            PropertyKind::Array => value.is_array(),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PropertyKind::String),
            "number" => Some(PropertyKind::Number),
            "integer" => Some(PropertyKind::Integer),
            "boolean" => Some(PropertyKind::Boolean),
            "object" => Some(PropertyKind::Object),
            "array" => Some(PropertyKind::Array),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named argument accepted by a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProperty {
    pub name: String,
    pub description: String,
    pub kind: PropertyKind,
    pub required: bool,
}

impl SchemaProperty {
    /// A required string property (the common case)
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: PropertyKind::String,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    pub fn with_kind(mut self, kind: PropertyKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Structural description of the arguments a tool accepts.
///
/// Serialized as a JSON Schema object so descriptors look the same whether
/// they travel in-process or over a wire transport:
///
/// ```json
/// {"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub struct InputSchema {
    properties: Vec<SchemaProperty>,
}

impl InputSchema {
    /// Schema for a tool that takes no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.retain(|p| p.name != property.name);
        self.properties.push(property);
        self
    }

    pub fn properties(&self) -> &[SchemaProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &SchemaProperty> {
        self.properties.iter().filter(|p| p.required)
    }

    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({"type": p.kind.as_str(), "description": p.description}),
                )
            })
            .collect();
        let required: Vec<&str> = self.required().map(|p| p.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl From<InputSchema> for Value {
    fn from(schema: InputSchema) -> Self {
        schema.to_json_schema()
    }
}

impl TryFrom<Value> for InputSchema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
        if let Some(ty) = obj.get("type").and_then(|t| t.as_str())
            && ty != "object"
        {
            return Err(SchemaError::UnsupportedRootType(ty.to_string()));
        }

        let required: Vec<&str> = obj
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut schema = InputSchema::empty();
        if let Some(props) = obj.get("properties").and_then(|p| p.as_object()) {
            for (name, spec) in props {
                let kind_str = spec.get("type").and_then(|t| t.as_str()).unwrap_or("string");
                let kind = PropertyKind::parse(kind_str).ok_or_else(|| {
                    SchemaError::UnsupportedPropertyType {
                        property: name.clone(),
                        kind: kind_str.to_string(),
                    }
                })?;
                let description = spec
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default();
                schema = schema.with_property(SchemaProperty {
                    name: name.clone(),
                    description: description.to_string(),
                    kind,
                    required: required.contains(&name.as_str()),
                });
            }
        }
        Ok(schema)
    }
}

/// Descriptor of a tool exposed by a provider.
///
/// The name is unique within one provider, not globally: two providers may
/// both expose `search`, and the registry decides which one is routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::empty(),
        }
    }

    pub fn with_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.input_schema = self.input_schema.with_property(property);
        self
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: ToolArguments::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

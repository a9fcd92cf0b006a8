//! Typed view of the parts of an OpenAPI document the generator consumes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::generation::HttpMethod;

/// Schema object, property schemas included
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Exclusivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Exclusivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl Schema {
    /// First non-null type token
    pub fn primary_type(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(TypeDecl::primary)
    }

    /// `nullable: true`, or an OpenAPI 3.1 type list containing `null`
    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self
                .schema_type
                .as_ref()
                .is_some_and(TypeDecl::includes_null)
    }

    pub fn has_numeric_constraints(&self) -> bool {
        self.minimum.is_some()
            || self.maximum.is_some()
            || self.multiple_of.is_some()
            || matches!(self.exclusive_minimum, Some(Exclusivity::Bound(_)))
            || matches!(self.exclusive_maximum, Some(Exclusivity::Bound(_)))
    }

    pub fn has_length_constraints(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some()
    }

    /// Object schema that declares properties or at least no other shape
    pub fn is_object_model(&self) -> bool {
        match self.primary_type() {
            Some("object") => {
                self.properties.is_some() || self.additional_properties.is_none()
            }
            None => self.properties.is_some() && self.reference.is_none(),
            _ => false,
        }
    }

    /// Top-level string schema with an `enum` list
    pub fn is_string_enum(&self) -> bool {
        self.primary_type() == Some("string")
            && self.enum_values.as_ref().is_some_and(|values| !values.is_empty())
            && !self.has_length_constraints()
            && self.format.is_none()
    }
}

/// `type` is a single token in OpenAPI 3.0 and may be a list in 3.1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(String),
    Many(Vec<String>),
}

impl TypeDecl {
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeDecl::Single(token) => Some(token.as_str()).filter(|token| *token != "null"),
            TypeDecl::Many(tokens) => tokens
                .iter()
                .map(String::as_str)
                .find(|token| *token != "null"),
        }
    }

    pub fn includes_null(&self) -> bool {
        match self {
            TypeDecl::Single(token) => token == "null",
            TypeDecl::Many(tokens) => tokens.iter().any(|token| token == "null"),
        }
    }
}

/// Boolean modifier (3.0) or numeric bound (3.1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Exclusivity {
    Flag(bool),
    Bound(Number),
}

/// Value of `additionalProperties`: a flag or a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Boolean(bool),
    Schema(Box<Schema>),
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Media type entry of a `content` map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RequestBody {
    pub fn json(&self) -> Option<&MediaType> {
        self.content.get(JSON_MEDIA_TYPE)
    }
}

/// Response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    pub fn json(&self) -> Option<&MediaType> {
        self.content.get(JSON_MEDIA_TYPE)
    }
}

/// OpenAPI operation with path-level parameters merged and references resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// Declared `operationId`, if any
    pub id: Option<String>,
    /// The path where this operation is defined (e.g., "/pet/findByStatus")
    pub path: String,
    pub method: HttpMethod,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Status code to response, in document order
    pub responses: IndexMap<String, Response>,
}

impl Operation {
    /// Responses with `2xx` status codes first, each group in document order
    pub fn responses_by_precedence(&self) -> impl Iterator<Item = (&String, &Response)> {
        let is_success = |status: &String| status.starts_with('2');
        self.responses
            .iter()
            .filter(move |(status, _)| is_success(status))
            .chain(
                self.responses
                    .iter()
                    .filter(move |(status, _)| !is_success(status)),
            )
    }
}

/// Server definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// API information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Parsed OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiContext {
    pub version: String,
    pub info: Option<ApiInfo>,
    pub servers: Vec<Server>,
    /// Operations in path order, then in the path item's method order
    pub operations: Vec<Operation>,
    /// `components.schemas` in document order
    pub schemas: IndexMap<String, Schema>,
}

impl OpenApiContext {
    pub fn server_url(&self) -> Option<&str> {
        self.servers.first().map(|server| server.url.as_str())
    }
}

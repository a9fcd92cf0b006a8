//! Intermediate representation handed from the resolvers to the renderers.
//!
//! Every record here is a plain value: the resolvers build them once per run
//! and nothing mutates them afterwards. Renderers only read them.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::generation::{ClientMode, HttpMethod};

/// Target primitive produced by the OpenAPI type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Str,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Bytes,
    Dict,
}

impl PrimitiveType {
    /// Map an OpenAPI `type` token. `None` for tokens outside the table.
    pub fn from_type_token(token: &str) -> Option<Self> {
        match token {
            "string" => Some(PrimitiveType::Str),
            "integer" => Some(PrimitiveType::Int),
            "number" => Some(PrimitiveType::Float),
            "boolean" => Some(PrimitiveType::Bool),
            "object" => Some(PrimitiveType::Dict),
            _ => None,
        }
    }

    /// Map a string `format` through the format table
    pub fn from_string_format(format: &str) -> Self {
        match format {
            "date" => PrimitiveType::Date,
            "date-time" => PrimitiveType::DateTime,
            "byte" => PrimitiveType::Bytes,
            _ => PrimitiveType::Str,
        }
    }
}

/// Comparator tag attached to a numeric bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Gt,
    Ge,
    Lt,
    Le,
}

/// One side of a numeric range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    pub value: serde_json::Number,
    pub comparator: Comparator,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberConstraints {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
    pub multiple_of: Option<serde_json::Number>,
}

/// Classification of a single property schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaTypeKind {
    Primitive {
        primitive: PrimitiveType,
    },
    ConstrainedString {
        constraints: StringConstraints,
    },
    ConstrainedInteger {
        constraints: NumberConstraints,
    },
    ConstrainedNumber {
        constraints: NumberConstraints,
    },
    Array {
        items: Box<SchemaTypeKind>,
    },
    /// Reference to another model. `forward` is set when the target is emitted
    /// after the model holding the reference.
    Reference {
        name: String,
        forward: bool,
    },
    Enum {
        name: String,
    },
    /// Item kind of a generic sequence
    Unknown,
}

impl SchemaTypeKind {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        SchemaTypeKind::Primitive { primitive }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        SchemaTypeKind::Reference {
            name: name.into(),
            forward: false,
        }
    }

    /// Name of the model this kind points at, looking through arrays
    pub fn referenced_model(&self) -> Option<&str> {
        match self {
            SchemaTypeKind::Reference { name, .. } => Some(name),
            SchemaTypeKind::Array { items } => items.referenced_model(),
            _ => None,
        }
    }

    /// Rewrite the referenced model name, looking through arrays
    pub(crate) fn map_reference(&mut self, f: &mut impl FnMut(&str, &mut bool) -> Option<String>) {
        match self {
            SchemaTypeKind::Reference { name, forward } => {
                if let Some(renamed) = f(name, forward) {
                    *name = renamed;
                }
            }
            SchemaTypeKind::Array { items } => items.map_reference(f),
            _ => {}
        }
    }
}

/// Read/write visibility of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Standard,
    ReadOnly,
    WriteOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Identifier used in generated code
    pub name: String,
    /// Property name as it appears on the wire
    pub wire_name: String,
    pub kind: SchemaTypeKind,
    pub optional: bool,
    pub nullable: bool,
    pub visibility: Visibility,
}

impl Field {
    pub fn needs_alias(&self) -> bool {
        self.name != self.wire_name
    }

    /// Required and non-nullable: present on the wire but never null
    pub fn rejects_null(&self) -> bool {
        !self.optional && !self.nullable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    RejectNull,
}

/// Construction-time check attached to a model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validator {
    pub field: String,
    pub function_name: String,
    pub kind: ValidatorKind,
}

impl Validator {
    pub fn reject_null(field: &str) -> Self {
        Self {
            field: field.to_string(),
            function_name: format!("optional_{field}"),
            kind: ValidatorKind::RejectNull,
        }
    }
}

/// Derived request/response variant of a model with visibility-tagged fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    Request,
    Response,
}

impl ModelVariant {
    pub fn suffix(&self) -> &'static str {
        match self {
            ModelVariant::Request => "Request",
            ModelVariant::Response => "Response",
        }
    }

    /// Whether a field of the given visibility belongs to this variant
    pub fn includes(&self, visibility: Visibility) -> bool {
        matches!(
            (self, visibility),
            (_, Visibility::Standard)
                | (ModelVariant::Request, Visibility::WriteOnly)
                | (ModelVariant::Response, Visibility::ReadOnly)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum ModelOrigin {
    Component { schema: String },
    QueryParameters { operation_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDef {
    pub name: String,
    pub fields: Vec<Field>,
    pub validators: Vec<Validator>,
    /// Position in the emitted order; referenced models get lower values
    pub order_index: usize,
    pub variant: Option<ModelVariant>,
    pub origin: ModelOrigin,
}

impl ModelDef {
    /// Whether any field carries read-only or write-only visibility
    pub fn has_split_visibility(&self) -> bool {
        self.fields
            .iter()
            .any(|field| field.visibility != Visibility::Standard)
    }

    /// Names of the models referenced by this model's fields, in field order
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter_map(|field| field.kind.referenced_model())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub identifier: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDef {
    /// Literal values in declaration order
    pub fn values(&self) -> Vec<&serde_json::Value> {
        self.members.iter().map(|member| &member.value).collect()
    }
}

/// Type of a request body, response body, or parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeRef {
    Model { name: String },
    ModelList { name: String },
    Primitive { primitive: PrimitiveType },
    PrimitiveList { primitive: PrimitiveType },
    Map { value: PrimitiveType },
    Any,
}

impl TypeRef {
    /// Model symbol the client artifact must import for this type
    pub fn model_name(&self) -> Option<&str> {
        match self {
            TypeRef::Model { name } | TypeRef::ModelList { name } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn rename_model(&mut self, renamed: String) {
        if let TypeRef::Model { name } | TypeRef::ModelList { name } = self {
            *name = renamed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParam {
    pub name: String,
    pub wire_name: String,
    pub primitive: PrimitiveType,
}

/// The four shapes a generated call can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    Static,
    StaticWithQuery,
    Template,
    TemplateWithQuery,
}

impl CallShape {
    pub fn select(has_path_params: bool, has_query_model: bool) -> Self {
        match (has_path_params, has_query_model) {
            (false, false) => CallShape::Static,
            (false, true) => CallShape::StaticWithQuery,
            (true, false) => CallShape::Template,
            (true, true) => CallShape::TemplateWithQuery,
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self, CallShape::Template | CallShape::TemplateWithQuery)
    }

    pub fn has_query(&self) -> bool {
        matches!(self, CallShape::StaticWithQuery | CallShape::TemplateWithQuery)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDef {
    pub operation_id: String,
    pub tag: String,
    pub function_name: String,
    pub http_method: HttpMethod,
    /// URL path with `{tokens}` already rewritten to parameter names
    pub url_template: String,
    pub path_params: Vec<PathParam>,
    pub query_model: Option<String>,
    pub body: Option<TypeRef>,
    /// `None` means no declared response type
    pub response: Option<TypeRef>,
    pub call_shape: CallShape,
    pub mode: ClientMode,
    pub summary: Option<String>,
    pub deprecated: bool,
}

/// Symbols the models artifact depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelImports {
    pub date: bool,
    pub datetime: bool,
    pub enums: bool,
    pub optional: bool,
    pub list: bool,
    pub any: bool,
    pub field: bool,
    pub validator: bool,
    pub constr: bool,
    pub conint: bool,
    pub confloat: bool,
    pub forward_refs: bool,
}

/// Symbols the client artifact depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientImports {
    /// Model and query-container names imported from the models artifact
    pub models: BTreeSet<String>,
    pub list: bool,
    pub dict: bool,
    pub any: bool,
    pub date: bool,
    pub datetime: bool,
    /// Some body or query container is sent through its JSON form
    pub json: bool,
    /// Some operation takes a query container
    pub query: bool,
}

/// Everything a renderer needs, already ordered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPlan {
    pub base_url: String,
    pub mode: ClientMode,
    pub enums: Vec<EnumDef>,
    pub models: Vec<ModelDef>,
    pub operations: Vec<OperationDef>,
    pub model_imports: ModelImports,
    pub client_imports: ClientImports,
}

impl GenerationPlan {
    pub fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|enum_def| enum_def.name == name)
    }

    pub fn operation(&self, function_name: &str) -> Option<&OperationDef> {
        self.operations
            .iter()
            .find(|operation| operation.function_name == function_name)
    }
}

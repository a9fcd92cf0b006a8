//! Python-specific context builder for code generation
//!
//! Converts a [`GenerationPlan`] into template variables: type annotations,
//! field defaults, validator blocks, import lines and per-operation call
//! arguments. Templates only lay the text out.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use crate::generation::imports::{is_wrapped, uses_field_call};
use crate::generation::{
    CallShape, ClientImports, ClientMode, Comparator, ContextBuilder, EnumDef, Field,
    GenerationContext, GenerationError, GenerationPlan, HttpMethod, ModelDef, ModelImports,
    NumberConstraints, OperationDef, PrimitiveType, RenderContext, SchemaTypeKind,
    StringConstraints, TypeRef, ValidatorKind,
};

/// Serialization flags applied to every model sent over the wire
const JSON_ARGS: &str = "by_alias=True, exclude_none=True";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PythonEnumMember {
    pub identifier: String,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PythonEnum {
    pub name: String,
    /// Base classes, `str, Enum` when every member is a string
    pub bases: String,
    pub members: Vec<PythonEnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PythonValidator {
    pub function_name: String,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PythonModel {
    pub name: String,
    /// Complete field declarations, e.g. `name: Optional[str] = Field(...)`
    pub fields: Vec<String>,
    pub validators: Vec<PythonValidator>,
    /// Emit `allow_population_by_field_name` so aliased fields accept their Python name
    pub has_aliases: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PythonOperation {
    pub function_name: String,
    pub method: String,
    /// `requests`/`aiohttp` expose a shortcut method for every verb but `trace`
    pub has_shortcut: bool,
    pub call_shape: CallShape,
    pub parameters: Vec<String>,
    pub return_annotation: String,
    pub url_expression: String,
    pub params_argument: Option<String>,
    pub json_argument: Option<String>,
    /// `None` when no response type is declared
    pub return_expression: Option<String>,
    pub docstring: Option<String>,
}

/// Python-specific context builder
pub struct PythonContextBuilder;

impl PythonContextBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextBuilder for PythonContextBuilder {
    async fn build(
        &self,
        plan: &GenerationPlan,
        context: &GenerationContext,
    ) -> Result<RenderContext, GenerationError> {
        let mut render_context = RenderContext::new();

        render_context.add_variable(
            "generator",
            json!(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))),
        );
        render_context.add_variable("mode", json!(plan.mode));
        render_context.add_variable("http_library", json!(plan.mode.http_library()));
        render_context.add_variable("schema_module", json!(context.modules.schema));
        render_context.add_variable("client_module", json!(context.modules.client));
        render_context.add_variable("base_url", json!(python_string(&plan.base_url)));

        let (stdlib, third_party) = model_import_lines(&plan.model_imports);
        render_context.add_variable("models_stdlib_imports", json!(stdlib));
        render_context.add_variable("models_third_party_imports", json!(third_party));
        render_context.add_variable(
            "enums",
            serde_json::to_value(plan.enums.iter().map(python_enum).collect::<Vec<_>>())?,
        );
        render_context.add_variable(
            "models",
            serde_json::to_value(plan.models.iter().map(python_model).collect::<Vec<_>>())?,
        );
        render_context.add_variable("forward_models", json!(forward_models(&plan.models)));

        render_context.add_variable(
            "client_stdlib_imports",
            json!(client_import_lines(&plan.client_imports)),
        );
        render_context.add_variable("client_models", json!(plan.client_imports.models));
        render_context.add_variable("has_query", json!(plan.client_imports.query));
        render_context.add_variable("json_args", json!(JSON_ARGS));
        let operations: Vec<PythonOperation> = plan
            .operations
            .iter()
            .map(|operation| python_operation(operation, plan.mode))
            .collect();
        render_context.add_variable("operations", serde_json::to_value(operations)?);

        tracing::debug!(
            enums = plan.enums.len(),
            models = plan.models.len(),
            operations = plan.operations.len(),
            "Built Python render context"
        );

        Ok(render_context)
    }
}

/// Double-quoted Python string literal
pub fn python_string(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

fn python_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::String(value) => python_string(value),
        JsonValue::Number(number) => number.to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Null => "None".to_string(),
        other => python_string(&other.to_string()),
    }
}

pub fn primitive_annotation(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Str => "str",
        PrimitiveType::Int => "int",
        PrimitiveType::Float => "float",
        PrimitiveType::Bool => "bool",
        PrimitiveType::Date => "date",
        PrimitiveType::DateTime => "datetime",
        PrimitiveType::Bytes => "bytes",
        PrimitiveType::Dict => "dict",
    }
}

fn comparator_keyword(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Gt => "gt",
        Comparator::Ge => "ge",
        Comparator::Lt => "lt",
        Comparator::Le => "le",
    }
}

fn string_constraint_args(constraints: &StringConstraints) -> String {
    let mut args = Vec::new();
    if let Some(min_length) = constraints.min_length {
        args.push(format!("min_length={min_length}"));
    }
    if let Some(max_length) = constraints.max_length {
        args.push(format!("max_length={max_length}"));
    }
    args.join(", ")
}

fn number_constraint_args(constraints: &NumberConstraints) -> String {
    let mut args: Vec<String> = [&constraints.lower, &constraints.upper]
        .into_iter()
        .flatten()
        .map(|bound| format!("{}={}", comparator_keyword(bound.comparator), bound.value))
        .collect();
    if let Some(multiple_of) = &constraints.multiple_of {
        args.push(format!("multiple_of={multiple_of}"));
    }
    args.join(", ")
}

/// Annotation of a model field, without the `Optional[...]` wrapper
pub fn kind_annotation(kind: &SchemaTypeKind) -> String {
    match kind {
        SchemaTypeKind::Primitive { primitive } => primitive_annotation(*primitive).to_string(),
        SchemaTypeKind::ConstrainedString { constraints } => {
            format!("constr({})", string_constraint_args(constraints))
        }
        SchemaTypeKind::ConstrainedInteger { constraints } => {
            format!("conint({})", number_constraint_args(constraints))
        }
        SchemaTypeKind::ConstrainedNumber { constraints } => {
            format!("confloat({})", number_constraint_args(constraints))
        }
        SchemaTypeKind::Array { items } => match **items {
            SchemaTypeKind::Unknown => "list".to_string(),
            ref items => format!("List[{}]", kind_annotation(items)),
        },
        SchemaTypeKind::Reference {
            name,
            forward: true,
        } => format!("'{name}'"),
        SchemaTypeKind::Reference { name, .. } | SchemaTypeKind::Enum { name } => name.clone(),
        SchemaTypeKind::Unknown => "Any".to_string(),
    }
}

/// Full declaration line of a field inside its model
pub fn field_declaration(model: &ModelDef, field: &Field) -> String {
    let annotation = kind_annotation(&field.kind);
    let annotation = if is_wrapped(model, field) {
        format!("Optional[{annotation}]")
    } else {
        annotation
    };
    let alias = if field.needs_alias() {
        format!(", alias={}", python_string(&field.wire_name))
    } else {
        String::new()
    };
    let default = match (field.optional, uses_field_call(model, field)) {
        (true, true) => format!(" = Field(None{alias})"),
        (true, false) => " = None".to_string(),
        (false, true) => format!(" = Field(...{alias})"),
        (false, false) => String::new(),
    };
    format!("{}: {annotation}{default}", field.name)
}

fn python_enum(enum_def: &EnumDef) -> PythonEnum {
    let all_strings = enum_def
        .members
        .iter()
        .all(|member| member.value.is_string());
    PythonEnum {
        name: enum_def.name.clone(),
        bases: if all_strings { "str, Enum" } else { "Enum" }.to_string(),
        members: enum_def
            .members
            .iter()
            .map(|member| PythonEnumMember {
                identifier: member.identifier.clone(),
                literal: python_literal(&member.value),
            })
            .collect(),
    }
}

fn python_model(model: &ModelDef) -> PythonModel {
    PythonModel {
        name: model.name.clone(),
        fields: model
            .fields
            .iter()
            .map(|field| field_declaration(model, field))
            .collect(),
        validators: model
            .validators
            .iter()
            .map(|validator| match validator.kind {
                ValidatorKind::RejectNull => PythonValidator {
                    function_name: validator.function_name.clone(),
                    field: validator.field.clone(),
                    message: format!("{} may not be None", validator.field),
                },
            })
            .collect(),
        has_aliases: model.fields.iter().any(Field::needs_alias),
    }
}

fn has_forward_reference(kind: &SchemaTypeKind) -> bool {
    match kind {
        SchemaTypeKind::Reference { forward, .. } => *forward,
        SchemaTypeKind::Array { items } => has_forward_reference(items),
        _ => false,
    }
}

/// Models that need `update_forward_refs()` after every class is defined
fn forward_models(models: &[ModelDef]) -> Vec<String> {
    models
        .iter()
        .filter(|model| model.fields.iter().any(|field| has_forward_reference(&field.kind)))
        .map(|model| model.name.clone())
        .collect()
}

fn from_import(module: &str, names: &[&str]) -> Option<String> {
    (!names.is_empty()).then(|| format!("from {module} import {}", names.join(", ")))
}

/// Standard-library and third-party import lines of the models artifact
pub fn model_import_lines(imports: &ModelImports) -> (Vec<String>, Vec<String>) {
    let mut datetime = Vec::new();
    if imports.date {
        datetime.push("date");
    }
    if imports.datetime {
        datetime.push("datetime");
    }
    let mut typing = Vec::new();
    if imports.any {
        typing.push("Any");
    }
    if imports.list {
        typing.push("List");
    }
    if imports.optional {
        typing.push("Optional");
    }

    let stdlib = [
        from_import("datetime", &datetime),
        imports.enums.then(|| "from enum import Enum".to_string()),
        from_import("typing", &typing),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut pydantic = vec!["BaseModel"];
    for (needed, name) in [
        (imports.field, "Field"),
        (imports.confloat, "confloat"),
        (imports.conint, "conint"),
        (imports.constr, "constr"),
        (imports.validator, "validator"),
    ] {
        if needed {
            pydantic.push(name);
        }
    }

    (stdlib, from_import("pydantic", &pydantic).into_iter().collect())
}

/// Standard-library import lines of the client artifact
pub fn client_import_lines(imports: &ClientImports) -> Vec<String> {
    let mut datetime = Vec::new();
    if imports.date {
        datetime.push("date");
    }
    if imports.datetime {
        datetime.push("datetime");
    }
    let mut typing = Vec::new();
    if imports.any {
        typing.push("Any");
    }
    if imports.dict {
        typing.push("Dict");
    }
    if imports.list {
        typing.push("List");
    }
    typing.push("Optional");

    [
        imports.json.then(|| "import json".to_string()),
        from_import("datetime", &datetime),
        from_import("typing", &typing),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Annotation of a body or response type
pub fn type_ref_annotation(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Model { name } => name.clone(),
        TypeRef::ModelList { name } => format!("List[{name}]"),
        TypeRef::Primitive { primitive } => primitive_annotation(*primitive).to_string(),
        TypeRef::PrimitiveList { primitive } => {
            format!("List[{}]", primitive_annotation(*primitive))
        }
        TypeRef::Map { value } => format!("Dict[str, {}]", primitive_annotation(*value)),
        TypeRef::Any => "Any".to_string(),
    }
}

/// Models go through `.json()` so dates and bytes arrive as JSON strings
fn json_argument(body: &TypeRef) -> String {
    match body {
        TypeRef::Model { .. } => format!("json=json.loads(req_data.json({JSON_ARGS}))"),
        TypeRef::ModelList { .. } => {
            format!("json=[json.loads(item.json({JSON_ARGS})) for item in req_data]")
        }
        _ => "json=req_data".to_string(),
    }
}

fn return_expression(response: &TypeRef, mode: ClientMode) -> String {
    let payload = match mode {
        ClientMode::Sync => "response_obj.json()",
        ClientMode::Async => "await response_obj.json()",
    };
    match response {
        TypeRef::Model { name } => format!("{name}.parse_obj({payload})"),
        TypeRef::ModelList { name } => format!("[{name}.parse_obj(item) for item in {payload}]"),
        _ => payload.to_string(),
    }
}

fn url_expression(operation: &OperationDef) -> String {
    let path = python_string(&operation.url_template);
    if operation.call_shape.is_template() {
        format!("f{}", path.replacen('"', "\"{BASE_URL}", 1))
    } else {
        format!("BASE_URL + {path}")
    }
}

fn python_operation(operation: &OperationDef, mode: ClientMode) -> PythonOperation {
    let mut parameters = Vec::new();
    if let Some(body) = &operation.body {
        parameters.push(format!("req_data: {}", type_ref_annotation(body)));
        parameters.push("/".to_string());
    }
    for param in &operation.path_params {
        parameters.push(format!(
            "{}: {}",
            param.name,
            primitive_annotation(param.primitive)
        ));
    }
    parameters.push("*".to_string());
    if let Some(query_model) = &operation.query_model {
        parameters.push(format!("params: {query_model}"));
    }
    parameters.push("headers: Optional[dict] = None".to_string());
    parameters.push(match mode {
        ClientMode::Sync => "proxies: Optional[dict] = None".to_string(),
        ClientMode::Async => "proxy: Optional[str] = None".to_string(),
    });
    parameters.push("**kwargs".to_string());

    let mut docstring = Vec::new();
    if let Some(summary) = &operation.summary {
        docstring.push(summary.clone());
    }
    if operation.deprecated {
        docstring.push("Deprecated.".to_string());
    }

    PythonOperation {
        function_name: operation.function_name.clone(),
        method: operation.http_method.as_str().to_string(),
        has_shortcut: operation.http_method != HttpMethod::Trace,
        call_shape: operation.call_shape,
        parameters,
        return_annotation: match &operation.response {
            Some(response) => format!("Optional[{}]", type_ref_annotation(response)),
            None => "None".to_string(),
        },
        url_expression: url_expression(operation),
        params_argument: operation
            .call_shape
            .has_query()
            .then(|| "params=_query_params(params)".to_string()),
        json_argument: operation.body.as_ref().map(json_argument),
        return_expression: operation
            .response
            .as_ref()
            .map(|response| return_expression(response, mode)),
        docstring: (!docstring.is_empty()).then(|| {
            let mut docstring = docstring.join("\n\n    ");
            // a trailing quote would merge into the closing delimiter
            if docstring.ends_with('"') {
                docstring.push(' ');
            }
            docstring
        }),
    }
}

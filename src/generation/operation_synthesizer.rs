//! Maps path operations onto callable definitions

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::generation::ir::{
    CallShape, Field, ModelDef, ModelOrigin, OperationDef, PathParam, PrimitiveType,
    SchemaTypeKind, TypeRef, Visibility,
};
use crate::generation::registry::NameRegistry;
use crate::generation::sanitizers::{sanitize_docstring, unique_identifier};
use crate::generation::schema_resolver::{ClassifiedProperty, ResolvedRef, SchemaResolver};
use crate::generation::{ClientMode, GenerationError, naming};
use crate::infrastructure::openapi::{
    AdditionalProperties, Operation, Parameter, ParameterLocation, Schema,
};

/// Tag used for operations that declare none
pub const DEFAULT_TAG: &str = "default";

const MAX_ALIAS_DEPTH: usize = 16;

static PATH_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Restricts which operations are synthesized, by operation id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl OperationFilter {
    pub fn new(
        include: impl IntoIterator<Item = String>,
        exclude: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        }
    }

    /// An empty include list admits every operation not excluded
    pub fn allows(&self, operation_id: &str) -> bool {
        (self.include.is_empty() || self.include.contains(operation_id))
            && !self.exclude.contains(operation_id)
    }
}

/// Output of the synthesizer
#[derive(Debug, Clone, Default)]
pub struct SynthesizedOperations {
    pub operations: Vec<OperationDef>,
    /// Query-parameter containers, to be merged with the component models
    pub query_models: Vec<ModelDef>,
}

/// Shape of a request or response body schema
#[derive(Debug, Clone, PartialEq)]
enum BodyShape {
    Typed(TypeRef),
    /// The schema maps to `null`
    NoContent,
    Unmatched,
}

pub struct OperationSynthesizer<'a> {
    operations: &'a [Operation],
    mode: ClientMode,
    filter: OperationFilter,
}

impl<'a> OperationSynthesizer<'a> {
    pub fn new(operations: &'a [Operation], mode: ClientMode, filter: OperationFilter) -> Self {
        Self {
            operations,
            mode,
            filter,
        }
    }

    /// Synthesize every operation admitted by the filter, in document order
    pub fn synthesize(
        &self,
        resolver: &mut SchemaResolver<'a>,
        names: &mut NameRegistry,
    ) -> Result<SynthesizedOperations, GenerationError> {
        let mut synthesized = SynthesizedOperations::default();
        let operations = self.operations;

        for operation in operations {
            let operation_id = operation
                .id
                .clone()
                .unwrap_or_else(|| naming::fallback_operation_id(operation.method, &operation.path));
            if !self.filter.allows(&operation_id) {
                tracing::debug!(operation = %operation_id, "Operation filtered out");
                continue;
            }

            let (definition, query_model) =
                self.synthesize_operation(operation, operation_id, resolver, names)?;
            tracing::debug!(
                operation = %definition.operation_id,
                function = %definition.function_name,
                shape = ?definition.call_shape,
                "Synthesized operation"
            );
            synthesized.operations.push(definition);
            synthesized.query_models.extend(query_model);
        }

        Ok(synthesized)
    }

    fn synthesize_operation(
        &self,
        operation: &'a Operation,
        operation_id: String,
        resolver: &mut SchemaResolver<'a>,
        names: &mut NameRegistry,
    ) -> Result<(OperationDef, Option<ModelDef>), GenerationError> {
        let origin = format!(
            "{} {}",
            operation.method.as_str().to_uppercase(),
            operation.path
        );
        let tag = operation
            .tags
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_TAG);
        let function_name = naming::build_function_name(tag, operation.method, &operation_id);
        names.claim_function(&function_name, &origin)?;

        let query_name = naming::query_model_name(&function_name);
        let mut url_template = operation.path.clone();
        let mut path_params = Vec::new();
        let mut query_fields = Vec::new();

        for parameter in &operation.parameters {
            match parameter.location {
                ParameterLocation::Path => {
                    let param = path_param(parameter, resolver)?;
                    url_template = url_template.replace(
                        &format!("{{{}}}", param.wire_name),
                        &format!("{{{}}}", param.name),
                    );
                    path_params.push(param);
                }
                ParameterLocation::Query => {
                    query_fields.push(query_field(&query_name, parameter, resolver, names)?);
                }
                ParameterLocation::Header | ParameterLocation::Cookie => {
                    tracing::debug!(
                        operation = %operation_id,
                        parameter = %parameter.name,
                        location = ?parameter.location,
                        "Skipping header/cookie parameter"
                    );
                }
            }
        }

        for token in PATH_TOKEN_RE.captures_iter(&operation.path) {
            let wire_name = &token[1];
            if path_params.iter().any(|param: &PathParam| param.wire_name == wire_name) {
                continue;
            }
            tracing::warn!(
                operation = %operation_id,
                parameter = %wire_name,
                "Path parameter is not declared, typing it as str"
            );
            let param = PathParam {
                name: naming::parameter_name(wire_name),
                wire_name: wire_name.to_string(),
                primitive: PrimitiveType::Str,
            };
            url_template = url_template.replace(
                &format!("{{{}}}", param.wire_name),
                &format!("{{{}}}", param.name),
            );
            path_params.push(param);
        }

        let mut taken = HashSet::new();
        for field in &mut query_fields {
            field.name = unique_identifier(&field.name, &mut taken);
        }

        let query_model = if query_fields.is_empty() {
            None
        } else {
            names.claim_type(&query_name, &format!("query parameters of {operation_id}"))?;
            Some(ModelDef {
                name: query_name,
                fields: query_fields,
                validators: Vec::new(),
                order_index: 0,
                variant: None,
                origin: ModelOrigin::QueryParameters {
                    operation_id: operation_id.clone(),
                },
            })
        };

        let body = match &operation.request_body {
            Some(request_body) => match request_body.json() {
                Some(media) => Some(match &media.schema {
                    Some(schema) => match body_shape(schema, resolver, 0)? {
                        BodyShape::Typed(type_ref) => type_ref,
                        BodyShape::NoContent | BodyShape::Unmatched => TypeRef::Any,
                    },
                    None => TypeRef::Any,
                }),
                None => {
                    tracing::debug!(operation = %operation_id, "Request body has no JSON content");
                    None
                }
            },
            None => None,
        };

        let response = self.response_type(operation, &operation_id, resolver)?;

        let call_shape = CallShape::select(!path_params.is_empty(), query_model.is_some());
        let definition = OperationDef {
            operation_id,
            tag: tag.to_string(),
            function_name,
            http_method: operation.method,
            url_template,
            path_params,
            query_model: query_model.as_ref().map(|model| model.name.clone()),
            body,
            response,
            call_shape,
            mode: self.mode,
            summary: operation
                .summary
                .as_deref()
                .map(sanitize_docstring)
                .filter(|summary| !summary.is_empty()),
            deprecated: operation.deprecated,
        };

        Ok((definition, query_model))
    }

    /// First JSON response by precedence decides the response type
    fn response_type(
        &self,
        operation: &'a Operation,
        operation_id: &str,
        resolver: &SchemaResolver<'a>,
    ) -> Result<Option<TypeRef>, GenerationError> {
        for (status, response) in operation.responses_by_precedence() {
            let Some(schema) = response.json().and_then(|media| media.schema.as_ref()) else {
                continue;
            };
            return Ok(match body_shape(schema, resolver, 0)? {
                BodyShape::Typed(type_ref) => Some(type_ref),
                BodyShape::NoContent => None,
                BodyShape::Unmatched => {
                    tracing::warn!(
                        operation = %operation_id,
                        status = %status,
                        "Response schema matches no known shape, returning Any"
                    );
                    Some(TypeRef::Any)
                }
            });
        }
        Ok(None)
    }
}

fn path_param(
    parameter: &Parameter,
    resolver: &SchemaResolver<'_>,
) -> Result<PathParam, GenerationError> {
    let primitive = match &parameter.schema {
        Some(schema) => scalar_primitive(schema, resolver, 0)?.unwrap_or(PrimitiveType::Str),
        None => PrimitiveType::Str,
    };
    Ok(PathParam {
        name: naming::parameter_name(&parameter.name),
        wire_name: parameter.name.clone(),
        primitive,
    })
}

fn query_field<'a>(
    query_name: &str,
    parameter: &'a Parameter,
    resolver: &mut SchemaResolver<'a>,
    names: &mut NameRegistry,
) -> Result<Field, GenerationError> {
    let classified = match &parameter.schema {
        Some(schema) => resolver.classify_property(query_name, &parameter.name, schema, names)?,
        None => ClassifiedProperty {
            kind: SchemaTypeKind::primitive(PrimitiveType::Str),
            nullable: false,
            visibility: Visibility::Standard,
        },
    };
    Ok(Field {
        name: naming::field_name(&parameter.name),
        wire_name: parameter.name.clone(),
        kind: classified.kind,
        optional: !parameter.required,
        nullable: classified.nullable,
        visibility: Visibility::Standard,
    })
}

/// Primitive of a scalar schema, following aliases
fn scalar_primitive(
    schema: &Schema,
    resolver: &SchemaResolver<'_>,
    depth: usize,
) -> Result<Option<PrimitiveType>, GenerationError> {
    if let Some(reference) = &schema.reference {
        if depth > MAX_ALIAS_DEPTH {
            return Err(GenerationError::UnresolvedReference(reference.clone()));
        }
        return match resolver.dereference(reference)? {
            ResolvedRef::Alias(target) => scalar_primitive(target, resolver, depth + 1),
            ResolvedRef::Enum(_) => Ok(Some(PrimitiveType::Str)),
            ResolvedRef::Model(_) => Ok(None),
        };
    }
    Ok(match schema.primary_type() {
        Some("string") => Some(PrimitiveType::from_string_format(
            schema.format.as_deref().unwrap_or_default(),
        )),
        Some(token) => PrimitiveType::from_type_token(token),
        None => None,
    })
}

/// Resolve a body schema: list of models, model, map, then plain type
fn body_shape(
    schema: &Schema,
    resolver: &SchemaResolver<'_>,
    depth: usize,
) -> Result<BodyShape, GenerationError> {
    if depth > MAX_ALIAS_DEPTH {
        return Err(GenerationError::UnresolvedReference(
            "body schema alias chain too deep".to_string(),
        ));
    }

    if let Some(items) = &schema.items {
        if let Some(reference) = &items.reference
            && let ResolvedRef::Model(name) = resolver.dereference(reference)?
        {
            return Ok(BodyShape::Typed(TypeRef::ModelList { name }));
        }
        return Ok(match scalar_primitive(items, resolver, 0)? {
            Some(primitive) => BodyShape::Typed(TypeRef::PrimitiveList { primitive }),
            None => BodyShape::Unmatched,
        });
    }

    if let Some(reference) = &schema.reference {
        return match resolver.dereference(reference)? {
            ResolvedRef::Model(name) => Ok(BodyShape::Typed(TypeRef::Model { name })),
            ResolvedRef::Enum(_) => Ok(BodyShape::Typed(TypeRef::Primitive {
                primitive: PrimitiveType::Str,
            })),
            ResolvedRef::Alias(target) => body_shape(target, resolver, depth + 1),
        };
    }

    if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties
        && let Some(value) = scalar_primitive(values, resolver, 0)?
    {
        return Ok(BodyShape::Typed(TypeRef::Map { value }));
    }

    match &schema.schema_type {
        Some(decl) if decl.primary().is_none() => Ok(BodyShape::NoContent),
        Some(_) => Ok(match scalar_primitive(schema, resolver, 0)? {
            Some(primitive) => BodyShape::Typed(TypeRef::Primitive { primitive }),
            None => BodyShape::Unmatched,
        }),
        None => Ok(BodyShape::Unmatched),
    }
}

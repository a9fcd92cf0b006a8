//! Minimal symbol sets for the two rendered artifacts

use crate::generation::ir::{
    ClientImports, EnumDef, Field, ModelDef, ModelImports, ModelOrigin, OperationDef,
    PrimitiveType, SchemaTypeKind, TypeRef,
};

/// Whether a field is annotated `Optional[...]` in the models artifact.
///
/// Component fields are always wrapped: required ones get `Field(...)` and,
/// when not nullable, a validator rejecting `None`. Query containers only wrap
/// parameters that may be left out.
pub fn is_wrapped(model: &ModelDef, field: &Field) -> bool {
    field.optional
        || field.nullable
        || matches!(model.origin, ModelOrigin::Component { .. })
}

/// Whether the field's default is spelled with `Field(...)`
pub fn uses_field_call(model: &ModelDef, field: &Field) -> bool {
    field.needs_alias() || (is_wrapped(model, field) && !field.optional)
}

pub fn model_imports(enums: &[EnumDef], models: &[ModelDef]) -> ModelImports {
    let mut imports = ModelImports {
        enums: !enums.is_empty(),
        ..ModelImports::default()
    };

    for model in models {
        imports.validator |= !model.validators.is_empty();
        for field in &model.fields {
            imports.optional |= is_wrapped(model, field);
            imports.field |= uses_field_call(model, field);
            collect_kind(&field.kind, &mut imports, false);
        }
    }

    imports
}

fn collect_kind(kind: &SchemaTypeKind, imports: &mut ModelImports, in_array: bool) {
    match kind {
        SchemaTypeKind::Primitive { primitive } => match primitive {
            PrimitiveType::Date => imports.date = true,
            PrimitiveType::DateTime => imports.datetime = true,
            _ => {}
        },
        SchemaTypeKind::ConstrainedString { .. } => imports.constr = true,
        SchemaTypeKind::ConstrainedInteger { .. } => imports.conint = true,
        SchemaTypeKind::ConstrainedNumber { .. } => imports.confloat = true,
        SchemaTypeKind::Array { items } => {
            // A sequence of unknown items renders as the builtin `list`
            if !matches!(**items, SchemaTypeKind::Unknown) {
                imports.list = true;
            }
            collect_kind(items, imports, true);
        }
        SchemaTypeKind::Reference { forward, .. } => imports.forward_refs |= *forward,
        SchemaTypeKind::Enum { .. } => {}
        SchemaTypeKind::Unknown => imports.any |= !in_array,
    }
}

pub fn client_imports(operations: &[OperationDef]) -> ClientImports {
    let mut imports = ClientImports::default();

    for operation in operations {
        if let Some(query) = &operation.query_model {
            imports.models.insert(query.clone());
            imports.query = true;
            imports.json = true;
        }
        if operation.body.as_ref().is_some_and(|body| body.model_name().is_some()) {
            imports.json = true;
        }
        for type_ref in [&operation.body, &operation.response].into_iter().flatten() {
            if let Some(name) = type_ref.model_name() {
                imports.models.insert(name.to_string());
            }
            match type_ref {
                TypeRef::ModelList { .. } => imports.list = true,
                TypeRef::PrimitiveList { primitive } => {
                    imports.list = true;
                    collect_primitive(*primitive, &mut imports);
                }
                TypeRef::Primitive { primitive } => collect_primitive(*primitive, &mut imports),
                TypeRef::Map { value } => {
                    imports.dict = true;
                    collect_primitive(*value, &mut imports);
                }
                TypeRef::Any => imports.any = true,
                TypeRef::Model { .. } => {}
            }
        }
        for param in &operation.path_params {
            collect_primitive(param.primitive, &mut imports);
        }
    }

    imports
}

fn collect_primitive(primitive: PrimitiveType, imports: &mut ClientImports) {
    match primitive {
        PrimitiveType::Date => imports.date = true,
        PrimitiveType::DateTime => imports.datetime = true,
        _ => {}
    }
}

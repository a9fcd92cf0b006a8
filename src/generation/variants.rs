//! Request/response variants of models with read-only or write-only fields

use std::collections::BTreeSet;

use crate::generation::GenerationError;
use crate::generation::ir::{ModelDef, ModelVariant, OperationDef, TypeRef};
use crate::generation::registry::NameRegistry;

/// Models after the visibility split
#[derive(Debug, Clone, Default)]
pub struct SplitModels {
    pub models: Vec<ModelDef>,
    /// Original names of the models that were split
    pub split: BTreeSet<String>,
}

/// Replace every model carrying read-only or write-only fields with a
/// `{Name}Request` and a `{Name}Response` variant, then point references at
/// the variant matching their context.
pub fn split_visibility(
    models: Vec<ModelDef>,
    names: &mut NameRegistry,
) -> Result<SplitModels, GenerationError> {
    let mut split = BTreeSet::new();
    let mut expanded = Vec::with_capacity(models.len());

    for model in models {
        if !model.has_split_visibility() {
            expanded.push(model);
            continue;
        }

        for variant in [ModelVariant::Request, ModelVariant::Response] {
            let derived = derive_variant(&model, variant);
            names.claim_type(
                &derived.name,
                &format!("{} variant of {}", variant.suffix().to_lowercase(), model.name),
            )?;
            tracing::debug!(model = %model.name, variant = %derived.name, "Derived model variant");
            expanded.push(derived);
        }
        split.insert(model.name);
    }

    for model in &mut expanded {
        let context = model.variant.unwrap_or(ModelVariant::Response);
        for field in &mut model.fields {
            field.kind.map_reference(&mut |name: &str, _: &mut bool| {
                variant_name(&split, name, context)
            });
        }
    }

    Ok(SplitModels {
        models: expanded,
        split,
    })
}

fn derive_variant(model: &ModelDef, variant: ModelVariant) -> ModelDef {
    let fields: Vec<_> = model
        .fields
        .iter()
        .filter(|field| variant.includes(field.visibility))
        .cloned()
        .collect();
    let validators = model
        .validators
        .iter()
        .filter(|validator| fields.iter().any(|field| field.name == validator.field))
        .cloned()
        .collect();

    ModelDef {
        name: format!("{}{}", model.name, variant.suffix()),
        fields,
        validators,
        order_index: model.order_index,
        variant: Some(variant),
        origin: model.origin.clone(),
    }
}

fn variant_name(split: &BTreeSet<String>, name: &str, context: ModelVariant) -> Option<String> {
    split
        .contains(name)
        .then(|| format!("{name}{}", context.suffix()))
}

/// Point an operation's body at request variants and its response at
/// response variants of split models
pub fn rewrite_operation(operation: &mut OperationDef, split: &BTreeSet<String>) {
    rewrite_type_ref(operation.body.as_mut(), split, ModelVariant::Request);
    rewrite_type_ref(operation.response.as_mut(), split, ModelVariant::Response);
}

fn rewrite_type_ref(type_ref: Option<&mut TypeRef>, split: &BTreeSet<String>, context: ModelVariant) {
    if let Some(type_ref) = type_ref {
        let renamed = type_ref
            .model_name()
            .and_then(|name| variant_name(split, name, context));
        if let Some(renamed) = renamed {
            type_ref.rename_model(renamed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ir::{
        Field, ModelOrigin, PrimitiveType, SchemaTypeKind, Validator, Visibility,
    };

    fn field(name: &str, kind: SchemaTypeKind, visibility: Visibility) -> Field {
        Field {
            name: name.to_string(),
            wire_name: name.to_string(),
            kind,
            optional: false,
            nullable: false,
            visibility,
        }
    }

    fn model(name: &str, fields: Vec<Field>) -> ModelDef {
        let validators = fields
            .iter()
            .map(|field| Validator::reject_null(&field.name))
            .collect();
        ModelDef {
            name: name.to_string(),
            fields,
            validators,
            order_index: 0,
            variant: None,
            origin: ModelOrigin::Component {
                schema: name.to_string(),
            },
        }
    }

    fn user() -> ModelDef {
        model(
            "User",
            vec![
                field("id", SchemaTypeKind::primitive(PrimitiveType::Int), Visibility::ReadOnly),
                field("username", SchemaTypeKind::primitive(PrimitiveType::Str), Visibility::Standard),
                field("password", SchemaTypeKind::primitive(PrimitiveType::Str), Visibility::WriteOnly),
            ],
        )
    }

    fn field_names(model: &ModelDef) -> Vec<&str> {
        model.fields.iter().map(|field| field.name.as_str()).collect()
    }

    #[test]
    fn test_split_produces_exactly_two_variants() {
        let mut names = NameRegistry::new();
        let result = split_visibility(vec![user()], &mut names).unwrap();

        assert_eq!(result.models.len(), 2);
        let request = &result.models[0];
        let response = &result.models[1];

        assert_eq!(request.name, "UserRequest");
        assert_eq!(request.variant, Some(ModelVariant::Request));
        assert_eq!(field_names(request), vec!["username", "password"]);
        assert_eq!(request.validators.len(), 2);

        assert_eq!(response.name, "UserResponse");
        assert_eq!(field_names(response), vec!["id", "username"]);
        assert!(result.split.contains("User"));
    }

    #[test]
    fn test_models_without_visibility_are_untouched() {
        let mut names = NameRegistry::new();
        let tag = model(
            "Tag",
            vec![field("name", SchemaTypeKind::primitive(PrimitiveType::Str), Visibility::Standard)],
        );

        let result = split_visibility(vec![tag.clone()], &mut names).unwrap();
        assert_eq!(result.models, vec![tag]);
        assert!(result.split.is_empty());
    }

    #[test]
    fn test_references_follow_variant_context() {
        let mut names = NameRegistry::new();
        let mut account = model(
            "Account",
            vec![
                field("owner", SchemaTypeKind::reference("User"), Visibility::Standard),
                field("token", SchemaTypeKind::primitive(PrimitiveType::Str), Visibility::WriteOnly),
            ],
        );
        account.validators.clear();
        let audit = model(
            "Audit",
            vec![field(
                "users",
                SchemaTypeKind::Array {
                    items: Box::new(SchemaTypeKind::reference("User")),
                },
                Visibility::Standard,
            )],
        );

        let result = split_visibility(vec![user(), account, audit], &mut names).unwrap();

        let account_request = result.models.iter().find(|m| m.name == "AccountRequest").unwrap();
        assert_eq!(
            account_request.field("owner").unwrap().kind,
            SchemaTypeKind::reference("UserRequest")
        );

        let account_response = result.models.iter().find(|m| m.name == "AccountResponse").unwrap();
        assert_eq!(
            account_response.field("owner").unwrap().kind,
            SchemaTypeKind::reference("UserResponse")
        );

        let audit = result.models.iter().find(|m| m.name == "Audit").unwrap();
        assert_eq!(audit.fields[0].kind.referenced_model(), Some("UserResponse"));
    }

    #[test]
    fn test_variant_name_collision() {
        let mut names = NameRegistry::new();
        names
            .claim_type("UserRequest", "components.schemas.UserRequest")
            .unwrap();

        assert!(matches!(
            split_visibility(vec![user()], &mut names),
            Err(GenerationError::ModelNameCollision { .. })
        ));
    }
}

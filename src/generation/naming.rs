//! Identifier transformations used to name generated functions and classes
//!
//! These conversions are deterministic: the same raw identifier always maps to
//! the same target identifier, which keeps generated output stable across runs.

use crate::generation::HttpMethod;
use crate::generation::sanitizers::{
    sanitize_field_identifier, sanitize_identifier, sanitize_parameter_identifier,
};

/// Prefix of component schema references
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Prefix of component parameter references
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Converts a mixed-case identifier into a lower-case, underscore separated one.
///
/// The first upper-case character is replaced by an underscore followed by its
/// lower-case form, and the conversion repeats until no upper-case character
/// remains. Existing underscores are left alone.
///
/// # Examples
/// ```
/// use pyclientgen::generation::naming::to_function_identifier;
///
/// assert_eq!(to_function_identifier("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_function_identifier("petId"), "pet_id");
/// assert_eq!(to_function_identifier("logout"), "logout");
/// ```
pub fn to_function_identifier(raw: &str) -> String {
    match raw.char_indices().find(|(_, c)| c.is_uppercase()) {
        None => raw.to_string(),
        Some((idx, upper)) => {
            let mut next = String::with_capacity(raw.len() + 1);
            next.push_str(&raw[..idx]);
            next.push('_');
            next.extend(upper.to_lowercase());
            next.push_str(&raw[idx + upper.len_utf8()..]);
            to_function_identifier(&next)
        }
    }
}

/// Converts an underscore or space separated identifier into a class name.
///
/// Every segment that already starts with an upper-case letter is kept as is.
/// Other segments are title-cased: the first letter of every alphabetic run is
/// upper-cased and the remaining letters are lower-cased.
///
/// # Examples
/// ```
/// use pyclientgen::generation::naming::to_type_identifier;
///
/// assert_eq!(to_type_identifier("Pet_status"), "PetStatus");
/// assert_eq!(
///     to_type_identifier("pet_get_find_pets_by_status"),
///     "PetGetFindPetsByStatus"
/// );
/// assert_eq!(to_type_identifier("ApiResponse"), "ApiResponse");
/// ```
pub fn to_type_identifier(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.chars().next().is_some_and(char::is_uppercase) {
                segment.to_string()
            } else {
                title_case(segment)
            }
        })
        .collect()
}

fn title_case(segment: &str) -> String {
    let mut result = String::with_capacity(segment.len());
    let mut previous_is_letter = false;
    for c in segment.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }
    result
}

/// Builds the function name of an operation: `{tag}_{method}_{operation}` in
/// lower case, mapped onto a valid Python identifier.
pub fn build_function_name(tag: &str, method: HttpMethod, operation_id: &str) -> String {
    let raw = format!(
        "{tag}_{method}_{}",
        to_function_identifier(operation_id)
    )
    .to_lowercase();
    sanitize_identifier(&raw)
}

/// Name of the synthesized query-parameter container of a function
pub fn query_model_name(function_name: &str) -> String {
    format!("{}Query", to_type_identifier(function_name))
}

/// Name of the enum synthesized for a string field with an `enum` list
pub fn enum_name(owning_model: &str, field: &str) -> String {
    format!("{}Enum", to_type_identifier(&format!("{owning_model}_{field}")))
}

/// Class name of a component schema
pub fn model_name(component: &str) -> String {
    sanitize_identifier(&to_type_identifier(component))
}

/// Generated identifier of a model property or query parameter
pub fn field_name(wire_name: &str) -> String {
    sanitize_field_identifier(wire_name)
}

/// Generated identifier of a path parameter
pub fn parameter_name(wire_name: &str) -> String {
    sanitize_parameter_identifier(&to_function_identifier(wire_name))
}

/// Component name targeted by a schema `$ref`
pub fn schema_ref_target(reference: &str) -> Option<&str> {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Fallback operation id for operations that do not declare one
pub fn fallback_operation_id(method: HttpMethod, path: &str) -> String {
    let raw = format!("{method}_{path}");
    let mut result = String::with_capacity(raw.len());
    for c in raw.chars() {
        let mapped = if matches!(c, '/' | '{' | '}' | '-' | '.') { '_' } else { c };
        if mapped == '_' && result.ends_with('_') {
            continue;
        }
        result.push(mapped);
    }
    result.trim_end_matches('_').to_string()
}

/// Enum member identifier of a literal value
pub fn enum_member_identifier(value: &serde_json::Value) -> String {
    let raw = match value {
        serde_json::Value::String(s) => s.to_uppercase(),
        other => format!("VALUE_{other}").to_uppercase(),
    };
    sanitize_identifier(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_function_identifier() {
        assert_eq!(to_function_identifier("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_function_identifier("getInventory"), "get_inventory");
        assert_eq!(to_function_identifier("already_snake"), "already_snake");
        assert_eq!(to_function_identifier("ID"), "_i_d");
        assert_eq!(to_function_identifier(""), "");
    }

    #[test]
    fn test_to_type_identifier() {
        assert_eq!(to_type_identifier("Pet_status"), "PetStatus");
        assert_eq!(to_type_identifier("pet status"), "PetStatus");
        assert_eq!(to_type_identifier("order_ID"), "OrderID");
        assert_eq!(to_type_identifier("store_get__inventory"), "StoreGetInventory");
        assert_eq!(to_type_identifier("v2beta"), "V2Beta");
    }

    #[test]
    fn test_build_function_name() {
        assert_eq!(
            build_function_name("pet", HttpMethod::Get, "findPetsByStatus"),
            "pet_get_find_pets_by_status"
        );
        assert_eq!(
            build_function_name("Store", HttpMethod::Delete, "deleteOrder"),
            "store_delete_delete_order"
        );
        assert_eq!(
            build_function_name("pet-admin", HttpMethod::Post, "addPet"),
            "pet_admin_post_add_pet"
        );
    }

    #[test]
    fn test_query_model_name() {
        assert_eq!(
            query_model_name("pet_get_find_pets_by_status"),
            "PetGetFindPetsByStatusQuery"
        );
    }

    #[test]
    fn test_field_and_parameter_names() {
        assert_eq!(field_name("photoUrls"), "photoUrls");
        assert_eq!(field_name("x-rate-limit"), "x_rate_limit");
        assert_eq!(field_name("from"), "from_");
        assert_eq!(parameter_name("petId"), "pet_id");
        assert_eq!(parameter_name("order-id"), "order_id");
        assert_eq!(field_name("_links"), "field_links");
        assert_eq!(field_name("schema"), "schema_");
        assert_eq!(parameter_name("headers"), "headers_param");
        assert_eq!(parameter_name("reqData"), "req_data_param");
    }

    #[test]
    fn test_enum_name() {
        assert_eq!(enum_name("Pet", "status"), "PetStatusEnum");
        assert_eq!(enum_name("Order", "status"), "OrderStatusEnum");
    }

    #[test]
    fn test_schema_ref_target() {
        assert_eq!(schema_ref_target("#/components/schemas/Pet"), Some("Pet"));
        assert_eq!(schema_ref_target("#/components/schemas/"), None);
        assert_eq!(schema_ref_target("#/definitions/Pet"), None);
    }

    #[test]
    fn test_fallback_operation_id() {
        assert_eq!(
            fallback_operation_id(HttpMethod::Get, "/pet/{petId}/uploadImage"),
            "get_pet_petId_uploadImage"
        );
        assert_eq!(fallback_operation_id(HttpMethod::Post, "/"), "post");
    }

    #[test]
    fn test_enum_member_identifier() {
        assert_eq!(
            enum_member_identifier(&serde_json::json!("available")),
            "AVAILABLE"
        );
        assert_eq!(
            enum_member_identifier(&serde_json::json!("in-progress")),
            "IN_PROGRESS"
        );
        assert_eq!(enum_member_identifier(&serde_json::json!(1)), "VALUE_1");
    }
}

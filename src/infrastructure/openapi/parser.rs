//! OpenAPI document parser
//!
//! Turns the raw JSON value of a document into an [`OpenApiContext`]:
//! - `paths` and `components.schemas` are required roots
//! - path-level parameters are merged ahead of operation-level ones
//! - `$ref` parameters, request bodies and responses are resolved
//! - operations keep document order (paths first, then methods)

use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::generation::{GenerationError, HttpMethod};
use crate::infrastructure::openapi::{
    ApiInfo, OpenApiContext, Operation, Parameter, RequestBody, Response, Schema, Server,
};

/// Nested `$ref` chains longer than this are rejected
const MAX_REF_DEPTH: usize = 8;

/// OpenAPI document parser
pub struct OpenApiParser {
    /// The raw JSON value of the OpenAPI document
    pub json: JsonValue,
}

impl OpenApiParser {
    /// Create a new parser from JSON content
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Parse the document, failing fast on missing roots
    pub fn parse(&self) -> Result<OpenApiContext, GenerationError> {
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or(GenerationError::MissingRoot("paths"))?;
        let schemas = self
            .json
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object)
            .ok_or(GenerationError::MissingRoot("components.schemas"))?;

        let version = match self.version() {
            Some(version) => version.to_string(),
            None => {
                tracing::warn!("Document declares no 'openapi' version, assuming 3.0");
                "3.0.0".to_string()
            }
        };

        let info = self.json.get("info").and_then(|info| {
            Some(ApiInfo {
                title: info.get("title")?.as_str()?.to_string(),
                version: info
                    .get("version")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: info
                    .get("description")
                    .and_then(JsonValue::as_str)
                    .map(String::from),
            })
        });

        let servers = match self.json.get("servers") {
            Some(servers) => decode::<Vec<Server>>(servers, "servers")?,
            None => Vec::new(),
        };

        let schemas = schemas
            .iter()
            .map(|(name, schema)| {
                decode::<Schema>(schema, &format!("components.schemas.{name}"))
                    .map(|schema| (name.clone(), schema))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        let operations = paths
            .iter()
            .map(|(path, path_item)| self.parse_path_item(path, path_item))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        tracing::debug!(
            operations = operations.len(),
            schemas = schemas.len(),
            "Parsed OpenAPI document"
        );

        Ok(OpenApiContext {
            version,
            info,
            servers,
            operations,
            schemas,
        })
    }

    /// Declared `openapi` version
    pub fn version(&self) -> Option<&str> {
        self.json.get("openapi")?.as_str()
    }

    fn parse_path_item(
        &self,
        path: &str,
        path_item: &JsonValue,
    ) -> Result<Vec<Operation>, GenerationError> {
        let path_item = self.resolve(path_item)?;
        let Some(item) = path_item.as_object() else {
            return Err(GenerationError::ValidationError(format!(
                "Path item '{path}' is not an object"
            )));
        };

        let shared = self.parse_parameters(item.get("parameters"), path)?;

        item.iter()
            .filter_map(|(key, value)| {
                HttpMethod::from_str(key)
                    .ok()
                    .map(|method| (method, value))
            })
            .map(|(method, value)| self.parse_operation(path, method, value, &shared))
            .collect()
    }

    fn parse_operation(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &JsonValue,
        shared: &[Parameter],
    ) -> Result<Operation, GenerationError> {
        let location = format!("{} {path}", method.as_str().to_uppercase());
        let string = |key: &str| {
            operation
                .get(key)
                .and_then(JsonValue::as_str)
                .map(String::from)
        };

        // Operation-level parameters override path-level ones with the same name and location
        let own = self.parse_parameters(operation.get("parameters"), &location)?;
        let mut parameters: Vec<Parameter> = shared
            .iter()
            .filter(|parameter| {
                !own.iter().any(|candidate| {
                    candidate.name == parameter.name && candidate.location == parameter.location
                })
            })
            .cloned()
            .collect();
        parameters.extend(own);

        let request_body = operation
            .get("requestBody")
            .map(|body| {
                self.resolve(body)
                    .and_then(|body| decode::<RequestBody>(body, &format!("{location} requestBody")))
            })
            .transpose()?;

        let responses = match operation.get("responses").and_then(JsonValue::as_object) {
            Some(responses) => responses
                .iter()
                .map(|(status, response)| {
                    self.resolve(response)
                        .and_then(|response| {
                            decode::<Response>(response, &format!("{location} response {status}"))
                        })
                        .map(|response| (status.clone(), response))
                })
                .collect::<Result<IndexMap<_, _>, _>>()?,
            None => IndexMap::new(),
        };

        let tags = operation
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Operation {
            id: string("operationId"),
            path: path.to_string(),
            method,
            tags,
            summary: string("summary"),
            description: string("description"),
            deprecated: operation
                .get("deprecated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            parameters,
            request_body,
            responses,
        })
    }

    /// Parse a `parameters` list, resolving `$ref` entries
    fn parse_parameters(
        &self,
        parameters: Option<&JsonValue>,
        location: &str,
    ) -> Result<Vec<Parameter>, GenerationError> {
        parameters
            .and_then(JsonValue::as_array)
            .map(|parameters| {
                parameters
                    .iter()
                    .map(|parameter| {
                        self.resolve(parameter).and_then(|parameter| {
                            decode::<Parameter>(parameter, &format!("{location} parameter"))
                        })
                    })
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Follow a local `$ref` (e.g. "#/components/parameters/limit") if present
    fn resolve<'a>(&'a self, value: &'a JsonValue) -> Result<&'a JsonValue, GenerationError> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Ok(current);
            };
            let pointer = reference.strip_prefix('#').ok_or_else(|| {
                GenerationError::UnresolvedReference(format!(
                    "{reference} (external references are not supported)"
                ))
            })?;
            current = self
                .json
                .pointer(pointer)
                .ok_or_else(|| GenerationError::UnresolvedReference(reference.to_string()))?;
        }
        Err(GenerationError::UnresolvedReference(format!(
            "reference chain deeper than {MAX_REF_DEPTH} levels"
        )))
    }
}

fn decode<T: DeserializeOwned>(value: &JsonValue, location: &str) -> Result<T, GenerationError> {
    serde_json::from_value(value.clone())
        .map_err(|e| GenerationError::ValidationError(format!("Invalid {location}: {e}")))
}

/// Serialization of a raw document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

impl DocumentFormat {
    /// Guess the format from a file extension or a `Content-Type` value
    pub fn detect(source: &str, content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default();
        if content_type.contains("json") || source.ends_with(".json") {
            DocumentFormat::Json
        } else if content_type.contains("yaml")
            || source.ends_with(".yaml")
            || source.ends_with(".yml")
        {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Decode raw document text into a JSON value, keeping mapping order
pub fn decode_document(content: &str, format: DocumentFormat) -> Result<JsonValue, GenerationError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(GenerationError::SerializationError)
        }
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}"))),
        DocumentFormat::Unknown => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse OpenAPI document: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openapi::ParameterLocation;
    use serde_json::json;

    #[test]
    fn test_missing_paths_is_fatal() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "components": { "schemas": {} }
        }));
        assert!(matches!(
            parser.parse(),
            Err(GenerationError::MissingRoot("paths"))
        ));
    }

    #[test]
    fn test_missing_schemas_is_fatal() {
        let parser = OpenApiParser::new(json!({ "openapi": "3.0.0", "paths": {} }));
        let error = parser.parse().unwrap_err();
        assert!(matches!(error, GenerationError::MissingRoot("components.schemas")));
        assert!(error.to_string().contains("components.schemas"));
    }

    #[test]
    fn test_ref_resolution() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "info": { "title": "Test API", "version": "1.0.0" },
            "paths": {
                "/pets/{petId}": {
                    "get": {
                        "operationId": "getPet",
                        "parameters": [
                            { "$ref": "#/components/parameters/PetId" }
                        ],
                        "requestBody": { "$ref": "#/components/requestBodies/PetBody" },
                        "responses": {
                            "200": { "$ref": "#/components/responses/PetResponse" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                },
                "parameters": {
                    "PetId": {
                        "name": "petId",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "integer", "format": "int64" }
                    }
                },
                "requestBodies": {
                    "PetBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Pet" }
                            }
                        }
                    }
                },
                "responses": {
                    "PetResponse": {
                        "description": "A pet",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Pet" }
                            }
                        }
                    }
                }
            }
        }));

        let spec = parser.parse().unwrap();
        assert_eq!(spec.info.as_ref().unwrap().title, "Test API");
        assert_eq!(spec.operations.len(), 1);

        let operation = &spec.operations[0];
        assert_eq!(operation.id.as_deref(), Some("getPet"));
        assert_eq!(operation.parameters[0].name, "petId");
        assert_eq!(operation.parameters[0].location, ParameterLocation::Path);

        let body = operation.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(
            body.json().unwrap().schema.as_ref().unwrap().reference.as_deref(),
            Some("#/components/schemas/Pet")
        );

        let response = &operation.responses["200"];
        assert_eq!(response.description.as_deref(), Some("A pet"));
        assert!(response.json().is_some());
    }

    #[test]
    fn test_unresolved_parameter_reference() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{ "$ref": "#/components/parameters/Missing" }],
                        "responses": {}
                    }
                }
            },
            "components": { "schemas": {} }
        }));

        assert!(matches!(
            parser.parse(),
            Err(GenerationError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_path_level_parameters_are_merged() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "paths": {
                "/users/{userId}": {
                    "parameters": [
                        { "name": "userId", "in": "path", "required": true, "schema": { "type": "string" } },
                        { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                    ],
                    "get": {
                        "operationId": "getUser",
                        "parameters": [
                            { "name": "userId", "in": "path", "required": true, "schema": { "type": "integer" } }
                        ],
                        "responses": {}
                    }
                }
            },
            "components": { "schemas": {} }
        }));

        let spec = parser.parse().unwrap();
        let parameters = &spec.operations[0].parameters;
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "verbose");
        assert_eq!(parameters[1].name, "userId");
        assert_eq!(
            parameters[1].schema.as_ref().unwrap().primary_type(),
            Some("integer")
        );
    }

    #[test]
    fn test_operations_keep_document_order() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "servers": [{ "url": "https://petstore.example.com/v3/" }],
            "paths": {
                "/pet": {
                    "summary": "Pets",
                    "put": { "operationId": "updatePet", "responses": {} },
                    "post": { "operationId": "addPet", "responses": {} }
                },
                "/pet/findByStatus": {
                    "get": { "operationId": "findPetsByStatus", "responses": {} }
                }
            },
            "components": { "schemas": {} }
        }));

        let spec = parser.parse().unwrap();
        let ids: Vec<&str> = spec
            .operations
            .iter()
            .filter_map(|operation| operation.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["updatePet", "addPet", "findPetsByStatus"]);
        assert_eq!(spec.operations[0].method, HttpMethod::Put);
        assert_eq!(spec.server_url(), Some("https://petstore.example.com/v3/"));
    }

    #[test]
    fn test_invalid_schema_names_its_location() {
        let parser = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "paths": {},
            "components": { "schemas": { "Pet": { "required": "name" } } }
        }));

        let error = parser.parse().unwrap_err();
        assert!(error.to_string().contains("components.schemas.Pet"));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(DocumentFormat::detect("petstore.json", None), DocumentFormat::Json);
        assert_eq!(DocumentFormat::detect("petstore.yml", None), DocumentFormat::Yaml);
        assert_eq!(
            DocumentFormat::detect("https://api.test/spec", Some("application/x-yaml")),
            DocumentFormat::Yaml
        );
        assert_eq!(DocumentFormat::detect("spec", Some("text/plain")), DocumentFormat::Unknown);
    }

    #[test]
    fn test_decode_document_keeps_yaml_mapping_order() {
        let yaml = "paths:\n  /zebra: {}\n  /apple: {}\n";
        let value = decode_document(yaml, DocumentFormat::Unknown).unwrap();
        let keys: Vec<&String> = value["paths"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["/zebra", "/apple"]);

        assert!(decode_document("{ not json", DocumentFormat::Json).is_err());
    }
}

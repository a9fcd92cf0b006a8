//! OpenAPI document model, parser and loaders

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod parser;
pub mod types;

pub use composite_loader::CompositeOpenApiLoader;
pub use file_loader::FileOpenApiLoader;
pub use http_loader::HttpOpenApiLoader;
pub use parser::{DocumentFormat, OpenApiParser, decode_document};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationError, OpenApiLoader};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SPEC_JSON: &str = r#"{
        "openapi": "3.0.0",
        "info": { "title": "Test API", "version": "1.0.0" },
        "paths": {},
        "components": { "schemas": {} }
    }"#;

    fn temp_spec(suffix: &str, content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        temp_file
            .write_all(content.as_bytes())
            .expect("Failed to write temp file");
        temp_file.flush().expect("Failed to flush temp file");
        temp_file
    }

    #[tokio::test]
    async fn test_file_openapi_loader_json() {
        let loader = FileOpenApiLoader::new();
        let temp_file = temp_spec(".json", SPEC_JSON);

        let document = loader.load(temp_file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(document.version, "3.0.0");
        assert_eq!(document.info.unwrap().title, "Test API");
    }

    #[tokio::test]
    async fn test_file_openapi_loader_yaml() {
        let loader = FileOpenApiLoader::new();
        let temp_file = temp_spec(
            ".yaml",
            "openapi: 3.0.0\ninfo:\n  title: Test API\n  version: 1.0.0\npaths: {}\ncomponents:\n  schemas: {}\n",
        );

        let document = loader.load(temp_file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(document.info.unwrap().title, "Test API");
    }

    #[tokio::test]
    async fn test_file_openapi_loader_sniffs_unknown_extension() {
        let loader = FileOpenApiLoader::new();
        let temp_file = temp_spec(".spec", SPEC_JSON);

        assert!(loader.load(temp_file.path().to_str().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_openapi_loader_not_found() {
        let loader = FileOpenApiLoader::new();

        match loader.load("/nonexistent/file.yaml").await.unwrap_err() {
            GenerationError::LoadError(msg) => assert!(msg.contains("/nonexistent/file.yaml")),
            other => panic!("Expected LoadError, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_file_openapi_loader_missing_components() {
        let loader = FileOpenApiLoader::new();
        let temp_file = temp_spec(".json", r#"{ "openapi": "3.0.0", "paths": {} }"#);

        assert!(matches!(
            loader.load(temp_file.path().to_str().unwrap()).await,
            Err(GenerationError::MissingRoot("components.schemas"))
        ));
    }

    #[tokio::test]
    async fn test_composite_loader_file() {
        let loader = CompositeOpenApiLoader::new().unwrap();
        let temp_file = temp_spec(".json", SPEC_JSON);

        assert!(loader.load(temp_file.path().to_str().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn test_composite_loader_http() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-spec.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SPEC_JSON)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let loader = CompositeOpenApiLoader::new().unwrap();
        let url = format!("{}/api-spec.json", mock_server.uri());
        let document = loader.load(&url).await.unwrap();

        assert_eq!(document.info.unwrap().title, "Test API");
    }
}

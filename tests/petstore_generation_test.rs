//! Integration tests generating the Swagger Petstore client end to end

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pyclientgen::application::{
    ApplicationError, GenerateClientRequest, GenerateClientUseCase, InspectPlanUseCase,
    InspectRequest,
};
use pyclientgen::generation::{
    CallShape, ClientMode, GenerationError, GenerationOrchestrator, PrimitiveType, SchemaTypeKind,
    TypeRef,
};
use pyclientgen::infrastructure::generation::{
    FormatterPostProcessor, PythonContextBuilder, TeraTemplateRenderer,
};
use pyclientgen::infrastructure::openapi::CompositeOpenApiLoader;
use pyclientgen::infrastructure::output::FileSystemOutputService;
use pyclientgen::infrastructure::templates::{
    CLIENT_SYNC_TEMPLATE, EmbeddedTemplateRepository, FileSystemTemplateLoader, TemplateLoader,
};
use tempfile::TempDir;

fn fixture() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/openapi/petstore.yaml")
        .to_string_lossy()
        .into_owned()
}

fn use_case(templates: Arc<dyn TemplateLoader>) -> GenerateClientUseCase {
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(PythonContextBuilder::new()),
        Arc::new(TeraTemplateRenderer::new(templates)),
    );
    GenerateClientUseCase::new(
        Arc::new(CompositeOpenApiLoader::new().unwrap()),
        Arc::new(orchestrator),
        Arc::new(FormatterPostProcessor::default()),
        Arc::new(FileSystemOutputService::new()),
    )
}

fn request(output_dir: &Path, mode: ClientMode) -> GenerateClientRequest {
    GenerateClientRequest {
        source: fixture(),
        output_dir: output_dir.to_path_buf(),
        mode,
        base_url: None,
        schema_module: "schema".to_string(),
        client_module: "api".to_string(),
        include_operations: Vec::new(),
        exclude_operations: Vec::new(),
        format: false,
    }
}

async fn generate(output_dir: &Path, request: GenerateClientRequest) -> (String, String) {
    use_case(Arc::new(EmbeddedTemplateRepository::new()))
        .execute(request)
        .await
        .unwrap();
    (
        std::fs::read_to_string(output_dir.join("schema.py")).unwrap(),
        std::fs::read_to_string(output_dir.join("api.py")).unwrap(),
    )
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{haystack}"))
}

#[tokio::test]
async fn test_writes_package_files() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("petstore");

    let response = use_case(Arc::new(EmbeddedTemplateRepository::new()))
        .execute(request(&output, ClientMode::Sync))
        .await
        .unwrap();

    assert_eq!(
        response.files,
        vec![
            output.join("schema.py"),
            output.join("api.py"),
            output.join("__init__.py"),
        ]
    );
    assert_eq!(response.enums, 2);
    assert_eq!(response.operations, 19);
    assert_eq!(std::fs::read_to_string(output.join("__init__.py")).unwrap(), "");
}

#[tokio::test]
async fn test_models_artifact() {
    let dir = TempDir::new().unwrap();
    let (models, _) = generate(dir.path(), request(dir.path(), ClientMode::Sync)).await;

    assert!(models.starts_with(&format!(
        "# Generated by pyclientgen {}. Do not edit by hand.\n\n\
         from datetime import datetime\n\
         from enum import Enum\n\
         from typing import List, Optional\n\
         \n\
         from pydantic import BaseModel, Field, validator\n",
        env!("CARGO_PKG_VERSION")
    )));

    assert!(models.contains(
        "class OrderStatusEnum(str, Enum):\n    \
         PLACED = \"placed\"\n    \
         APPROVED = \"approved\"\n    \
         DELIVERED = \"delivered\"\n"
    ));
    assert_eq!(models.matches("class PetStatusEnum(str, Enum):").count(), 1);

    assert!(models.contains(
        "class Pet(BaseModel):\n    \
         id: Optional[int] = None\n    \
         name: Optional[str] = Field(...)\n    \
         category: Optional[Category] = None\n    \
         photoUrls: Optional[List[str]] = Field(...)\n    \
         tags: Optional[List[Tag]] = None\n    \
         status: Optional[PetStatusEnum] = None\n\
         \n    \
         @validator(\"name\", always=True)\n    \
         def optional_name(cls, v):\n        \
         if v is None:\n            \
         raise ValueError(\"name may not be None\")\n        \
         return v\n"
    ));
    assert!(models.contains("    shipDate: Optional[datetime] = None\n"));

    // query containers reuse the component enum and keep parameters plain
    assert!(models.contains(
        "class PetGetFindPetsByStatusQuery(BaseModel):\n    \
         status: Optional[PetStatusEnum] = None\n"
    ));
    assert!(models.contains(
        "class UserGetLoginUserQuery(BaseModel):\n    \
         username: Optional[str] = None\n    \
         password: Optional[str] = None\n"
    ));

    // referenced models come first
    assert!(position(&models, "class Address(") < position(&models, "class Customer("));
    assert!(position(&models, "class Category(") < position(&models, "class Pet("));
    assert!(position(&models, "class Tag(") < position(&models, "class Pet("));
    assert!(!models.contains("update_forward_refs"));
}

#[tokio::test]
async fn test_sync_client_artifact() {
    let dir = TempDir::new().unwrap();
    let (_, client) = generate(dir.path(), request(dir.path(), ClientMode::Sync)).await;

    assert!(client.contains(
        "import json\n\
         from typing import Dict, List, Optional\n\
         \n\
         import requests\n\
         \n\
         from .schema import (\n    \
         ApiResponse,\n    \
         Order,\n    \
         Pet,\n    \
         PetGetFindPetsByStatusQuery,\n    \
         PetGetFindPetsByTagsQuery,\n    \
         PetPostUpdatePetWithFormQuery,\n    \
         PetPostUploadFileQuery,\n    \
         User,\n    \
         UserGetLoginUserQuery,\n\
         )\n\
         \n\
         \n\
         BASE_URL = \"https://petstore3.swagger.io/api/v3\"\n\
         \n\
         \n\
         def _query_params(params) -> dict:\n"
    ));
    assert!(client.contains(
        "    for key, value in json.loads(params.json(by_alias=True, exclude_none=True)).items():\n"
    ));
    assert!(client.contains("        return \"true\" if value else \"false\"\n"));

    assert!(client.contains(
        "def pet_get_get_pet_by_id(\n    \
         pet_id: int,\n    \
         *,\n    \
         headers: Optional[dict] = None,\n    \
         proxies: Optional[dict] = None,\n    \
         **kwargs,\n\
         ) -> Optional[Pet]:\n    \
         \"\"\"Find pet by ID\"\"\"\n    \
         url = f\"{BASE_URL}/pet/{pet_id}\"\n    \
         headers_ = headers if headers is not None else {}\n    \
         proxies_ = proxies if proxies is not None else {}\n\
         \n    \
         response_obj = requests.get(\n        \
         url,\n        \
         headers=headers_,\n        \
         proxies=proxies_,\n        \
         **kwargs,\n    \
         )\n\
         \n    \
         if response_obj.ok:\n        \
         return Pet.parse_obj(response_obj.json())\n    \
         return None\n"
    ));

    assert!(client.contains(
        "def pet_get_find_pets_by_status(\n    \
         *,\n    \
         params: PetGetFindPetsByStatusQuery,\n"
    ));
    assert!(client.contains("    url = BASE_URL + \"/pet/findByStatus\"\n"));
    assert!(client.contains("        params=_query_params(params),\n"));
    assert!(client.contains(
        "        return [Pet.parse_obj(item) for item in response_obj.json()]\n"
    ));

    assert!(client.contains(
        "def user_post_create_users_with_list_input(\n    \
         req_data: List[User],\n    \
         /,\n    \
         *,\n"
    ));
    assert!(client.contains(
        "        json=[json.loads(item.json(by_alias=True, exclude_none=True)) for item in req_data],\n"
    ));
    assert!(!client.contains(".dict("));

    let place_order = &client[position(&client, "def store_post_place_order(")..];
    assert!(place_order.starts_with(
        "def store_post_place_order(\n    \
         req_data: Order,\n    \
         /,\n"
    ));
    assert!(place_order.contains(
        "        json=json.loads(req_data.json(by_alias=True, exclude_none=True)),\n"
    ));

    assert!(client.contains(") -> Optional[Dict[str, int]]:\n"));
    assert!(client.contains(") -> Optional[str]:\n"));
    assert!(client.contains(
        "    url = f\"{BASE_URL}/pet/{pet_id}/uploadImage\"\n"
    ));
    assert!(client.contains("    \"\"\"Delete user\n\n    Deprecated.\"\"\"\n"));

    let logout = &client[position(&client, "def user_get_logout_user(")..];
    let logout = &logout[..position(logout, "\n\n\ndef ")];
    assert!(logout.contains(") -> None:\n"));
    assert!(logout.ends_with("    response_obj.raise_for_status()"));
}

#[tokio::test]
async fn test_async_client_artifact() {
    let dir = TempDir::new().unwrap();
    let (_, client) = generate(dir.path(), request(dir.path(), ClientMode::Async)).await;

    assert!(client.contains("\nimport aiohttp\n"));
    assert!(!client.contains("import requests"));
    assert!(client.contains(
        "async def pet_get_get_pet_by_id(\n    \
         pet_id: int,\n    \
         *,\n    \
         headers: Optional[dict] = None,\n    \
         proxy: Optional[str] = None,\n    \
         **kwargs,\n\
         ) -> Optional[Pet]:\n    \
         \"\"\"Find pet by ID\"\"\"\n    \
         url = f\"{BASE_URL}/pet/{pet_id}\"\n    \
         headers_ = headers if headers is not None else {}\n\
         \n    \
         async with aiohttp.ClientSession(headers=headers_) as session:\n        \
         async with session.get(\n            \
         url,\n            \
         proxy=proxy,\n            \
         **kwargs,\n        \
         ) as response_obj:\n            \
         if response_obj.ok:\n                \
         return Pet.parse_obj(await response_obj.json())\n            \
         return None\n"
    ));
    assert!(client.contains(
        "                return [Pet.parse_obj(item) for item in await response_obj.json()]\n"
    ));
    assert!(!client.contains("proxies"));
}

#[tokio::test]
async fn test_base_url_override_and_operation_filter() {
    let dir = TempDir::new().unwrap();
    let mut request = request(dir.path(), ClientMode::Sync);
    request.base_url = Some("http://localhost:8080/".to_string());
    request.include_operations = vec!["getPetById".to_string(), "loginUser".to_string()];

    let (models, client) = generate(dir.path(), request).await;

    assert!(client.contains("BASE_URL = \"http://localhost:8080\"\n"));
    assert!(client.contains("\ndef pet_get_get_pet_by_id("));
    assert!(client.contains("\ndef user_get_login_user("));
    assert_eq!(client.matches("\ndef _query_").count(), 2);
    assert_eq!(client.matches("\ndef ").count(), 4);
    assert!(client.contains("    Pet,\n    UserGetLoginUserQuery,\n)"));
    assert!(!models.contains("PetGetFindPetsByStatusQuery"));
    assert!(models.contains("class Order(BaseModel):"));
}

#[tokio::test]
async fn test_custom_template_directory() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join(CLIENT_SYNC_TEMPLATE),
        "BASE_URL = {{ base_url }}\n# {{ operations | length }} operations\n",
    )
    .unwrap();
    let output = dir.path().join("out");

    use_case(Arc::new(FileSystemTemplateLoader::new(&templates)))
        .execute(request(&output, ClientMode::Sync))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(output.join("api.py")).unwrap(),
        "BASE_URL = \"https://petstore3.swagger.io/api/v3\"\n# 19 operations\n"
    );
    assert!(
        std::fs::read_to_string(output.join("schema.py"))
            .unwrap()
            .contains("class Pet(BaseModel):")
    );
}

#[tokio::test]
async fn test_generation_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let one = generate(first.path(), request(first.path(), ClientMode::Async)).await;
    let two = generate(second.path(), request(second.path(), ClientMode::Async)).await;

    assert_eq!(one, two);
}

#[tokio::test]
async fn test_missing_document_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let mut request = request(&output, ClientMode::Sync);
    request.source = dir.path().join("missing.yaml").to_string_lossy().into_owned();

    let result = use_case(Arc::new(EmbeddedTemplateRepository::new()))
        .execute(request)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::GenerationError(GenerationError::LoadError(_)))
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_inspect_petstore_plan() {
    let plan = InspectPlanUseCase::new(Arc::new(CompositeOpenApiLoader::new().unwrap()))
        .execute(InspectRequest {
            source: fixture(),
            ..InspectRequest::default()
        })
        .await
        .unwrap();

    let pet = plan.model("Pet").unwrap();
    let fields: Vec<(&str, bool)> = pet
        .fields
        .iter()
        .map(|field| (field.name.as_str(), field.optional))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("id", true),
            ("name", false),
            ("category", true),
            ("photoUrls", false),
            ("tags", true),
            ("status", true),
        ]
    );
    assert_eq!(
        pet.field("photoUrls").unwrap().kind,
        SchemaTypeKind::Array {
            items: Box::new(SchemaTypeKind::primitive(PrimitiveType::Str)),
        }
    );

    let find = plan.operation("pet_get_find_pets_by_status").unwrap();
    assert_eq!(find.query_model.as_deref(), Some("PetGetFindPetsByStatusQuery"));
    assert_eq!(find.call_shape, CallShape::StaticWithQuery);
    assert_eq!(
        find.response,
        Some(TypeRef::ModelList {
            name: "Pet".to_string()
        })
    );

    let upload = plan.operation("pet_post_upload_file").unwrap();
    assert_eq!(upload.call_shape, CallShape::TemplateWithQuery);
    assert_eq!(upload.body, None);

    let delete = plan.operation("pet_delete_delete_pet").unwrap();
    assert_eq!(delete.path_params.len(), 1);
    assert_eq!(delete.response, None);

    assert_eq!(plan.base_url, "https://petstore3.swagger.io/api/v3");
    let order = plan.enum_def("OrderStatusEnum").unwrap();
    assert_eq!(order.members.len(), 3);
}

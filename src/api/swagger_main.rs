use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Todo API",
    description = "Create, read, update and delete short todo records"
))]
struct TodoRestApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from the [dto] package and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    let mut api_docs = TodoRestApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::todo::TodoApi::openapi());

    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_docs)
}

use crate::routing_utils::{BasicErrorResponse, ExtraInfo, ValidationErrorSchema};
use utoipa::OpenApi;

pub mod todo;

pub use todo::TodoDto;

/// Collects the schemas of the API's data structures for the OpenAPI documentation
#[derive(OpenApi)]
#[openapi(components(
    schemas(TodoDto, ExtraInfo, ValidationErrorSchema),
    responses(BasicErrorResponse)
))]
pub struct OpenApiSchemas;

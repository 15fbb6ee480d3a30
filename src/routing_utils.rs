use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;

use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToResponse, ToSchema, openapi};

use validator::ValidationErrors;

use crate::domain::todo::driving_ports::TodoError;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Not Found" = (
        summary = "Todo could not be found (404)",
        value = json!({
            "error_code": "not_found",
            "error_description": "The requested todo could not be found.",
            "extra_info": null
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )),

    ("Invalid Input" = (
        summary = "Invalid todo was passed (400)",
        value = json!({
            "error_code": "invalid_input",
            "error_description": "Submitted data was invalid.",
            "extra_info": {
                "title": [
                    {
                        "code": "length",
                        "message": null,
                        "params": {
                            "value": "",
                            "min": 1,
                            "max": 100
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error_description": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    error_code: String,
    error_description: String,
    extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(BasicErrorResponse {
            error_code: "not_found".into(),
            error_description: "The requested todo could not be found.".into(),
            extra_info: None,
        }),
    )
        .into_response()
}

fn invalid_input_response(extra_info: ExtraInfo) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(BasicErrorResponse {
            error_code: "invalid_input".into(),
            error_description: "Submitted data was invalid.".into(),
            extra_info: Some(extra_info),
        }),
    )
        .into_response()
}

/// Response type for failures nobody on the client side can fix. The cause is logged, not returned.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Unexpected failure while handling request: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that turns errors from the todo service into [BasicErrorResponse]s
pub struct TodoErrorResponse(TodoError);

impl IntoResponse for TodoErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            TodoError::NotFound(_) => not_found_response(),
            TodoError::Invalid(reason) => {
                invalid_input_response(ExtraInfo::Message(reason.to_string()))
            }
            TodoError::PortError(cause) => GenericErrorResponse(cause).into_response(),
        }
    }
}

impl From<TodoError> for TodoErrorResponse {
    fn from(value: TodoError) -> Self {
        Self(value)
    }
}

/// Response type for an update whose body names a different todo than its path
pub struct MismatchedIdResponse {
    pub path_id: String,
    pub body_id: String,
}

impl IntoResponse for MismatchedIdResponse {
    fn into_response(self) -> Response {
        invalid_input_response(ExtraInfo::Message(format!(
            "body ID {} does not match the todo ID {} in the path",
            self.body_id, self.path_id
        )))
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        invalid_input_response(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0)))
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}

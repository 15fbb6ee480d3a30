use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Wire representation of a todo, both accepted and returned by the API.
/// Absent fields are left out of responses instead of being sent as null.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct TodoDto {
    /// Assigned by the server. Ignored on create and update requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "5b0f7c3e-6a8e-4c4e-9d62-0d3c1f1b7a2e")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(required, length(min = 1, max = 100), custom = "reject_nul")]
    #[schema(example = "Buy milk")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500), custom = "reject_nul")]
    #[schema(example = "2%")]
    pub description: Option<String>,
}

/// The store cannot hold NUL characters, so they are refused along with the other field rules
fn reject_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_character"));
    }

    Ok(())
}

impl From<domain::todo::Todo> for TodoDto {
    fn from(value: domain::todo::Todo) -> Self {
        TodoDto {
            id: value.id().map(|id| id.0.clone()),
            title: Some(value.title().to_owned()),
            description: value.description().map(str::to_owned),
        }
    }
}

impl From<TodoDto> for domain::todo::TodoInput {
    fn from(value: TodoDto) -> Self {
        domain::todo::TodoInput {
            title: value.title,
            description: value.description,
        }
    }
}

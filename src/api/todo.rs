use crate::domain::todo::driven_ports::TodoRepository;
use crate::domain::todo::driving_ports::TodoPort;
use crate::domain::todo::{LoggedTodoService, TodoId, TodoInput, TodoService};
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_todo_driven_ports::DbTodoRepository;
use crate::routing_utils::{
    BasicErrorResponse, Json, MismatchedIdResponse, TodoErrorResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, dto};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(create_todo, find_all_todos, find_todo, update_todo, delete_todo))]
/// Defines the OpenAPI documentation for the todo API
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Builds a router for all the todo routes. Meant to be nested under "/api/todo".
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = LoggedTodoService(TodoService);
                let todo_repo = DbTodoRepository;

                find_all_todos(&mut ext_cxn, &todo_service, &todo_repo).await
            })
            .post(
                |State(app_state): AppState, Json(new_todo): Json<dto::TodoDto>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = LoggedTodoService(TodoService);
                    let todo_repo = DbTodoRepository;

                    create_todo(new_todo, &mut ext_cxn, &todo_service, &todo_repo).await
                },
            ),
        )
        .route(
            "/:todo_id",
            get(
                |State(app_state): AppState, Path(todo_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = LoggedTodoService(TodoService);
                    let todo_repo = DbTodoRepository;

                    find_todo(TodoId(todo_id), &mut ext_cxn, &todo_service, &todo_repo).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(todo_id): Path<String>,
                 Json(update): Json<dto::TodoDto>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = LoggedTodoService(TodoService);
                    let todo_repo = DbTodoRepository;

                    update_todo(
                        TodoId(todo_id),
                        update,
                        &mut ext_cxn,
                        &todo_service,
                        &todo_repo,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState, Path(todo_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = LoggedTodoService(TodoService);
                    let todo_repo = DbTodoRepository;

                    delete_todo(TodoId(todo_id), &mut ext_cxn, &todo_service, &todo_repo).await
                },
            ),
        )
}

#[utoipa::path(
    post,
    path = "/api/todo",
    tag = TODO_API_GROUP,
    request_body = dto::TodoDto,
    responses(
        (status = 201, description = "Todo was created", body = dto::TodoDto),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a todo. Any ID in the request body is ignored.
async fn create_todo(
    new_todo: dto::TodoDto,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_repo: &impl TodoRepository,
) -> Result<(StatusCode, Json<dto::TodoDto>), ErrorResponse> {
    new_todo
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let created = todo_service
        .create(TodoInput::from(new_todo), &mut *ext_cxn, todo_repo)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::TodoDto::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/todo",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "All todos", body = Vec<dto::TodoDto>),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves every todo
async fn find_all_todos(
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_repo: &impl TodoRepository,
) -> Result<Json<Vec<dto::TodoDto>>, ErrorResponse> {
    let todos = todo_service
        .find_all(&mut *ext_cxn, todo_repo)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todos.into_iter().map(dto::TodoDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/todo/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The requested todo", body = dto::TodoDto),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves a single todo
async fn find_todo(
    todo_id: TodoId,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_repo: &impl TodoRepository,
) -> Result<Json<dto::TodoDto>, ErrorResponse> {
    let todo = todo_service
        .find_by_id(&todo_id, &mut *ext_cxn, todo_repo)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::TodoDto::from(todo)))
}

#[utoipa::path(
    put,
    path = "/api/todo/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    request_body = dto::TodoDto,
    responses(
        (status = 200, description = "The updated todo", body = dto::TodoDto),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Replaces the title and description of a todo. The todo is identified by the path.
/// The request body may repeat that ID but cannot name a different one.
async fn update_todo(
    todo_id: TodoId,
    update: dto::TodoDto,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_repo: &impl TodoRepository,
) -> Result<Json<dto::TodoDto>, ErrorResponse> {
    if let Some(body_id) = update.id.as_ref().filter(|body_id| **body_id != todo_id.0) {
        return Err(MismatchedIdResponse {
            path_id: todo_id.0,
            body_id: body_id.clone(),
        }
        .into());
    }
    update.validate().map_err(ValidationErrorResponse::from)?;

    let updated = todo_service
        .update(&todo_id, TodoInput::from(update), &mut *ext_cxn, todo_repo)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::TodoDto::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/todo/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The todo as it was before deletion", body = dto::TodoDto),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a todo
async fn delete_todo(
    todo_id: TodoId,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_repo: &impl TodoRepository,
) -> Result<Json<dto::TodoDto>, ErrorResponse> {
    let deleted = todo_service
        .delete(&todo_id, &mut *ext_cxn, todo_repo)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::TodoDto::from(deleted)))
}

use super::test_util;
use crate::api::test_util::deserialize_body;
use crate::build_router;
use crate::domain::todo::driven_ports::TodoRepository;
use crate::domain::todo::{Todo, TodoId};
use crate::dto::TodoDto;
use crate::persistence;
use crate::persistence::db_todo_driven_ports::DbTodoRepository;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use speculoos::prelude::*;
use tower::ServiceExt;

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json_body) => Body::from(json_body.to_string()),
            None => Body::empty(),
        })
        .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

#[tokio::test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
async fn todo_lifecycle() {
    test_util::prepare_db_and_test(|db| async move {
        let router = build_router(test_util::shared_data(db));

        let new_todo = json!({ "title": "Buy milk" });
        let response = send(&router, "POST", "/api/todo", Some(new_todo)).await;
        assert_eq!(StatusCode::CREATED, response.status());
        let created: TodoDto = deserialize_body(response.into_body()).await;
        assert_eq!(Some("Buy milk"), created.title.as_deref());
        assert_eq!(None, created.description);
        let todo_id = created.id.expect("created todo should have an ID");
        let todo_uri = format!("/api/todo/{todo_id}");

        let response = send(&router, "GET", &todo_uri, None).await;
        assert_eq!(StatusCode::OK, response.status());
        let fetched: Value = deserialize_body(response.into_body()).await;
        assert_eq!(json!({ "id": todo_id, "title": "Buy milk" }), fetched);

        let response = send(
            &router,
            "PUT",
            &todo_uri,
            Some(json!({ "id": todo_id, "title": "Buy milk", "description": "2%" })),
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated: Value = deserialize_body(response.into_body()).await;
        assert_eq!(
            json!({ "id": todo_id, "title": "Buy milk", "description": "2%" }),
            updated
        );

        let response = send(&router, "GET", "/api/todo", None).await;
        assert_eq!(StatusCode::OK, response.status());
        let all_todos: Value = deserialize_body(response.into_body()).await;
        assert_eq!(json!([updated.clone()]), all_todos);

        let response = send(&router, "DELETE", &todo_uri, None).await;
        assert_eq!(StatusCode::OK, response.status());
        let deleted: Value = deserialize_body(response.into_body()).await;
        assert_eq!(updated, deleted);

        let response = send(&router, "GET", &todo_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
        let response = send(&router, "DELETE", &todo_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    })
    .await;
}

#[tokio::test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
async fn rejects_invalid_updates_and_keeps_stored_todo() {
    test_util::prepare_db_and_test(|db| async move {
        let router = build_router(test_util::shared_data(db));

        let response = send(
            &router,
            "POST",
            "/api/todo",
            Some(json!({ "title": "Walk dog", "description": "around the block" })),
        )
        .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let created: TodoDto = deserialize_body(response.into_body()).await;
        let todo_uri = format!("/api/todo/{}", created.id.as_deref().unwrap_or_default());

        let too_long = json!({ "title": "a".repeat(101) });
        let response = send(&router, "PUT", &todo_uri, Some(too_long)).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = send(&router, "GET", &todo_uri, None).await;
        let fetched: TodoDto = deserialize_body(response.into_body()).await;
        assert_eq!(created, fetched);

        let response = send(
            &router,
            "PUT",
            "/api/todo/does-not-exist",
            Some(json!({ "title": "anything" })),
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    })
    .await;
}

#[tokio::test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
async fn repository_lists_todos_in_creation_order() {
    test_util::prepare_db_and_test(|db| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(db);
        let todo_repo = DbTodoRepository;

        let first = todo_repo
            .save(
                Todo::build(Some("first".to_owned()), None).expect("todo should be valid"),
                &mut ext_cxn,
            )
            .await
            .expect("first save should succeed");
        let second = todo_repo
            .save(
                Todo::build(Some("second".to_owned()), Some("two".to_owned()))
                    .expect("todo should be valid"),
                &mut ext_cxn,
            )
            .await
            .expect("second save should succeed");

        let all_todos = todo_repo
            .find_all(&mut ext_cxn)
            .await
            .expect("listing should succeed");
        assert_eq!(vec![first.clone(), second], all_todos);

        todo_repo
            .delete(&first, &mut ext_cxn)
            .await
            .expect("delete should succeed");
        let first_id = first.id().cloned().unwrap_or_else(|| TodoId(String::new()));
        let lookup = todo_repo.find_one(&first_id, &mut ext_cxn).await;
        assert_that!(lookup).is_ok().is_none();
    })
    .await;
}

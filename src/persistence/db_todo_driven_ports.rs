use crate::domain;
use crate::domain::todo::{InvalidTodo, Todo, TodoId};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error, anyhow};
use sqlx::{FromRow, query, query_as};

pub struct DbTodoRepository;

#[derive(FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: Option<String>,
}

impl TryFrom<TodoRow> for domain::todo::Todo {
    type Error = InvalidTodo;

    fn try_from(value: TodoRow) -> Result<Self, Self::Error> {
        let todo = Todo::build(Some(value.title), value.description)?;

        Ok(todo.with_id(TodoId(value.id)))
    }
}

impl domain::todo::driven_ports::TodoRepository for DbTodoRepository {
    async fn save(
        &self,
        todo: Todo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let saved_row = match todo.id() {
            None => query_as::<_, TodoRow>(
                "INSERT INTO todo(title, description) VALUES ($1, $2) \
                 RETURNING id, title, description",
            )
            .bind(todo.title())
            .bind(todo.description())
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to insert a new todo into the database")?,

            Some(id) => query_as::<_, TodoRow>(
                "INSERT INTO todo(id, title, description) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE \
                 SET title = EXCLUDED.title, description = EXCLUDED.description \
                 RETURNING id, title, description",
            )
            .bind(&id.0)
            .bind(todo.title())
            .bind(todo.description())
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to upsert a todo in the database")?,
        };

        Todo::try_from(saved_row).context("reading back a saved todo")
    }

    async fn delete(
        &self,
        todo: &Todo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let id = todo
            .id()
            .ok_or_else(|| anyhow!("cannot delete a todo which was never persisted"))?;
        let mut cxn = ext_cxn.database_cxn().await?;

        query("DELETE FROM todo WHERE id = $1")
            .bind(&id.0)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        Ok(())
    }

    async fn find_one(
        &self,
        id: &TodoId,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo_row =
            query_as::<_, TodoRow>("SELECT id, title, description FROM todo WHERE id = $1")
                .bind(&id.0)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("trying to fetch a todo by ID")?;

        todo_row
            .map(Todo::try_from)
            .transpose()
            .context("a stored todo was invalid")
    }

    async fn find_all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos = query_as::<_, TodoRow>(
            "SELECT id, title, description FROM todo ORDER BY created_at, id",
        )
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch all todos")?
        .into_iter()
        .map(Todo::try_from)
        .collect::<Result<Vec<Todo>, InvalidTodo>>()
        .context("a stored todo was invalid")?;

        Ok(todos)
    }
}

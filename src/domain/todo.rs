use crate::domain::todo::driven_ports::TodoRepository;
use crate::domain::todo::driving_ports::{TodoError, TodoPort};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest title a todo may have, in characters
pub const MAX_TITLE_LENGTH: usize = 100;
/// Longest description a todo may have, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Opaque identifier for a todo. Only the store a todo is persisted to hands these out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct TodoId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTodo {
    #[error("a todo must have a title")]
    MissingTitle,
    #[error("a todo's title cannot be empty")]
    EmptyTitle,
    #[error("a todo's title can be at most 100 characters long, got {length}")]
    TitleTooLong { length: usize },
    #[error("a todo's description can be at most 500 characters long, got {length}")]
    DescriptionTooLong { length: usize },
    #[error("a todo's title cannot contain NUL characters")]
    NulInTitle,
    #[error("a todo's description cannot contain NUL characters")]
    NulInDescription,
}

/// A single todo record. Every reachable value satisfies the title and description rules,
/// which is why the fields are only reachable through [Todo::build] and [Todo::update].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id: Option<TodoId>,
    title: String,
    description: Option<String>,
}

fn check_invariants(
    title: Option<String>,
    description: Option<String>,
) -> Result<(String, Option<String>), InvalidTodo> {
    let title = title.ok_or(InvalidTodo::MissingTitle)?;
    if title.is_empty() {
        return Err(InvalidTodo::EmptyTitle);
    }
    if title.contains('\0') {
        return Err(InvalidTodo::NulInTitle);
    }

    let title_length = title.chars().count();
    if title_length > MAX_TITLE_LENGTH {
        return Err(InvalidTodo::TitleTooLong {
            length: title_length,
        });
    }

    if let Some(ref desc) = description {
        if desc.contains('\0') {
            return Err(InvalidTodo::NulInDescription);
        }
        let description_length = desc.chars().count();
        if description_length > MAX_DESCRIPTION_LENGTH {
            return Err(InvalidTodo::DescriptionTooLong {
                length: description_length,
            });
        }
    }

    Ok((title, description))
}

impl Todo {
    /// Constructs a not-yet-persisted todo, failing if the title or description break the rules
    pub fn build(title: Option<String>, description: Option<String>) -> Result<Todo, InvalidTodo> {
        let (title, description) = check_invariants(title, description)?;

        Ok(Todo {
            id: None,
            title,
            description,
        })
    }

    /// Replaces both the title and description. Nothing changes if the new values are invalid.
    pub fn update(
        &mut self,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<(), InvalidTodo> {
        let (title, description) = check_invariants(title, description)?;
        self.title = title;
        self.description = description;

        Ok(())
    }

    /// Applies the content of [input] to this todo, following the same rules as [Todo::update]
    pub fn apply(&mut self, input: TodoInput) -> Result<(), InvalidTodo> {
        self.update(input.title, input.description)
    }

    /// Returns this todo as it was persisted under [id]. Meant for driven ports.
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<&TodoId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Todo content supplied by a caller, used both for creating and updating todos
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<TodoInput> for Todo {
    type Error = InvalidTodo;

    fn try_from(value: TodoInput) -> Result<Self, Self::Error> {
        Todo::build(value.title, value.description)
    }
}

pub mod driven_ports {
    use super::*;

    /// Storage for todos. Implementations own id assignment.
    pub trait TodoRepository: Sync {
        /// Inserts [todo] if it has no id yet (assigning one), otherwise overwrites the stored copy.
        /// Returns the todo as it was persisted.
        async fn save(
            &self,
            todo: Todo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        async fn delete(
            &self,
            todo: &Todo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn find_one(
            &self,
            id: &TodoId,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        async fn find_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("no todo exists with ID {0}")]
        NotFound(TodoId),
        #[error(transparent)]
        Invalid(#[from] InvalidTodo),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TodoPort {
        async fn create(
            &self,
            new_todo: TodoInput,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_repo: &impl driven_ports::TodoRepository,
        ) -> Result<Todo, TodoError>;
        async fn find_by_id(
            &self,
            id: &TodoId,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_repo: &impl driven_ports::TodoRepository,
        ) -> Result<Todo, TodoError>;
        async fn find_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_repo: &impl driven_ports::TodoRepository,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn update(
            &self,
            id: &TodoId,
            update: TodoInput,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_repo: &impl driven_ports::TodoRepository,
        ) -> Result<Todo, TodoError>;
        async fn delete(
            &self,
            id: &TodoId,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_repo: &impl driven_ports::TodoRepository,
        ) -> Result<Todo, TodoError>;
    }
}

/// Looks up a todo, turning its absence into [TodoError::NotFound]
async fn find_todo_by_id(
    id: &TodoId,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_repo: &impl TodoRepository,
) -> Result<Todo, TodoError> {
    todo_repo
        .find_one(id, &mut *ext_cxn)
        .await
        .context("looking up a todo by ID")?
        .ok_or_else(|| TodoError::NotFound(id.clone()))
}

pub struct TodoService;

impl TodoPort for TodoService {
    async fn create(
        &self,
        new_todo: TodoInput,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        let todo = Todo::try_from(new_todo)?;
        let persisted = todo_repo
            .save(todo, &mut *ext_cxn)
            .await
            .context("saving a new todo")?;

        Ok(persisted)
    }

    async fn find_by_id(
        &self,
        id: &TodoId,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        find_todo_by_id(id, &mut *ext_cxn, todo_repo).await
    }

    async fn find_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_repo
            .find_all(&mut *ext_cxn)
            .await
            .context("fetching all todos")?;

        Ok(todos)
    }

    async fn update(
        &self,
        id: &TodoId,
        update: TodoInput,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        let mut existing = find_todo_by_id(id, &mut *ext_cxn, todo_repo).await?;
        existing.apply(update)?;
        let updated = todo_repo
            .save(existing, &mut *ext_cxn)
            .await
            .context("saving an updated todo")?;

        Ok(updated)
    }

    async fn delete(
        &self,
        id: &TodoId,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        let deleted = find_todo_by_id(id, &mut *ext_cxn, todo_repo).await?;
        todo_repo
            .delete(&deleted, &mut *ext_cxn)
            .await
            .context("deleting a todo")?;

        Ok(deleted)
    }
}

/// Wraps a [TodoPort] and logs every operation going through it
pub struct LoggedTodoService<S>(pub S);

/// Port errors are reported by the HTTP layer when it turns them into a 500,
/// so the service only traces them.
fn log_failure(action: &str, err: &TodoError) {
    match err {
        TodoError::NotFound(id) => warn!(todo_id = %id, "Failed {action}: todo does not exist"),
        TodoError::Invalid(reason) => warn!(%reason, "Failed {action}: todo was invalid"),
        TodoError::PortError(cause) => debug!("Failed {action}: {cause:#}"),
    }
}

impl<S: TodoPort + Sync> TodoPort for LoggedTodoService<S> {
    async fn create(
        &self,
        new_todo: TodoInput,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        info!(?new_todo, "Creating a new todo");
        let result = self.0.create(new_todo, &mut *ext_cxn, todo_repo).await;
        match result {
            Ok(ref created) => info!(todo = ?created, "Created a new todo"),
            Err(ref err) => log_failure("creating a todo", err),
        }

        result
    }

    async fn find_by_id(
        &self,
        id: &TodoId,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        info!(todo_id = %id, "Finding todo");
        let result = self.0.find_by_id(id, &mut *ext_cxn, todo_repo).await;
        match result {
            Ok(ref found) => info!(todo = ?found, "Found todo"),
            Err(ref err) => log_failure("finding a todo", err),
        }

        result
    }

    async fn find_all(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Vec<Todo>, TodoError> {
        info!("Finding all todos");
        let result = self.0.find_all(&mut *ext_cxn, todo_repo).await;
        match result {
            Ok(ref todos) => info!(count = todos.len(), "Found todos"),
            Err(ref err) => log_failure("finding all todos", err),
        }

        result
    }

    async fn update(
        &self,
        id: &TodoId,
        update: TodoInput,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        info!(todo_id = %id, ?update, "Updating todo");
        let result = self.0.update(id, update, &mut *ext_cxn, todo_repo).await;
        match result {
            Ok(ref updated) => info!(todo = ?updated, "Updated todo"),
            Err(ref err) => log_failure("updating a todo", err),
        }

        result
    }

    async fn delete(
        &self,
        id: &TodoId,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_repo: &impl TodoRepository,
    ) -> Result<Todo, TodoError> {
        info!(todo_id = %id, "Deleting todo");
        let result = self.0.delete(id, &mut *ext_cxn, todo_repo).await;
        match result {
            Ok(ref deleted) => info!(todo = ?deleted, "Deleted todo"),
            Err(ref err) => log_failure("deleting a todo", err),
        }

        result
    }
}

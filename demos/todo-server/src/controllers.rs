use crate::store::{Draft, Todo, TodoStore};
use mvc_binder::prelude::*;

/// Caller identity taken from the `x-user` header
#[derive(Debug, Clone, Default)]
pub struct User {
    pub name: String,
}

impl User {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Clone)]
pub struct TodoController {
    todos: Arc<dyn TodoStore>,
    user: User,
}

impl TodoController {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self {
            todos,
            user: User::default(),
        }
    }
}

#[controller(fields(todos, user))]
impl TodoController {
    pub fn get(&self) -> Json<Vec<Todo>> {
        Json(self.todos.list())
    }

    pub fn get_by(&self, id: u64) -> Option<Json<Todo>> {
        self.todos.find(id).map(Json)
    }

    pub async fn post(self, draft: Draft) -> Result<(StatusCode, Json<Todo>), HttpError> {
        if self.user.is_anonymous() {
            return Err(HttpError::new(StatusCode::UNAUTHORIZED, "x-user header required"));
        }
        if draft.title.trim().is_empty() {
            return Err(HttpError::msg("title must not be empty"));
        }
        let todo = self.todos.insert(draft.title, self.user.name.clone());
        tracing::info!(id = todo.id, owner = %todo.owner, "todo created");
        Ok((StatusCode::CREATED, Json(todo)))
    }

    pub fn put_by_done(&self, id: u64) -> Option<Json<Todo>> {
        self.todos.complete(id).map(Json)
    }

    #[delete("/completed")]
    pub fn clear_completed(&self) -> Json<serde_json::Value> {
        let removed = self.todos.clear_completed();
        Json(serde_json::json!({ "removed": removed }))
    }

    pub fn delete_by(&self, id: u64) -> StatusCode {
        if self.todos.remove(id) {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        }
    }

    fn after_activation(&self, activation: &AfterActivation<'_>) {
        for registered in activation.routes() {
            tracing::info!("{} {}", registered.route.verb, registered.route.path);
        }
    }
}

/// Read-only view mounted in a child scope with its own dependencies
#[derive(Clone)]
pub struct AdminController {
    todos: Arc<dyn TodoStore>,
    banner: String,
}

impl AdminController {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self {
            todos,
            banner: String::new(),
        }
    }
}

#[controller(fields(todos, banner))]
impl AdminController {
    pub fn get_stats(&self) -> serde_json::Value {
        let todos = self.todos.list();
        let done = todos.iter().filter(|t| t.done).count();
        serde_json::json!({
            "banner": self.banner,
            "total": todos.len(),
            "done": done,
        })
    }

    pub fn any_health(&self) -> &'static str {
        "ok"
    }
}

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub owner: String,
    pub done: bool,
}

/// Request body for a new todo
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Draft {
    pub title: String,
}

pub trait TodoStore: Send + Sync {
    fn list(&self) -> Vec<Todo>;
    fn find(&self, id: u64) -> Option<Todo>;
    fn insert(&self, title: String, owner: String) -> Todo;
    fn complete(&self, id: u64) -> Option<Todo>;
    fn remove(&self, id: u64) -> bool;
    fn clear_completed(&self) -> usize;
}

#[derive(Clone, Default)]
pub struct InMemoryTodos {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl TodoStore for InMemoryTodos {
    fn list(&self) -> Vec<Todo> {
        self.todos.read().map(|t| t.clone()).unwrap_or_default()
    }

    fn find(&self, id: u64) -> Option<Todo> {
        self.todos.read().ok()?.iter().find(|t| t.id == id).cloned()
    }

    fn insert(&self, title: String, owner: String) -> Todo {
        let mut todos = self.todos.write().unwrap_or_else(|e| e.into_inner());
        let id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let todo = Todo {
            id,
            title,
            owner,
            done: false,
        };
        todos.push(todo.clone());
        todo
    }

    fn complete(&self, id: u64) -> Option<Todo> {
        let mut todos = self.todos.write().ok()?;
        let todo = todos.iter_mut().find(|t| t.id == id)?;
        todo.done = true;
        Some(todo.clone())
    }

    fn remove(&self, id: u64) -> bool {
        let Ok(mut todos) = self.todos.write() else {
            return false;
        };
        let before = todos.len();
        todos.retain(|t| t.id != id);
        todos.len() != before
    }

    fn clear_completed(&self) -> usize {
        let Ok(mut todos) = self.todos.write() else {
            return 0;
        };
        let before = todos.len();
        todos.retain(|t| !t.done);
        before - todos.len()
    }
}
